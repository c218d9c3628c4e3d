//! Event handler variants.

use std::sync::Arc;

use skillquest_common::{ActionEvent, ProgressSnapshot, Result};
use tracing::{debug, warn};

use crate::engine::ProgressEngine;
use crate::traits::CompletionSource;

/// What a handler needs to do its work.
#[derive(Clone)]
pub struct HandlerContext {
    pub engine: Arc<ProgressEngine>,
    pub completion: Arc<dyn CompletionSource>,
}

/// A handler bound to one action type.
///
/// Every variant ignores events whose action type differs from its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    /// Forwards the event to the engine unchanged.
    DirectForward { action_type: String },
    /// Recomputes profile completion from live state and forwards that
    /// percentage as the count. The incoming count is ignored.
    DerivedMetric { action_type: String },
    /// Accepts the event and does nothing.
    Fallback { action_type: String },
}

impl Handler {
    pub fn direct_forward(action_type: impl Into<String>) -> Self {
        Self::DirectForward {
            action_type: action_type.into(),
        }
    }

    pub fn derived_metric(action_type: impl Into<String>) -> Self {
        Self::DerivedMetric {
            action_type: action_type.into(),
        }
    }

    pub fn fallback(action_type: impl Into<String>) -> Self {
        Self::Fallback {
            action_type: action_type.into(),
        }
    }

    pub fn action_type(&self) -> &str {
        match self {
            Self::DirectForward { action_type }
            | Self::DerivedMetric { action_type }
            | Self::Fallback { action_type } => action_type,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DirectForward { .. } => "direct_forward",
            Self::DerivedMetric { .. } => "derived_metric",
            Self::Fallback { .. } => "fallback",
        }
    }

    /// Handle one event. Returns the assignments the engine updated.
    pub async fn handle(
        &self,
        event: &ActionEvent,
        ctx: &HandlerContext,
    ) -> Result<Vec<ProgressSnapshot>> {
        if event.action_type != self.action_type() {
            debug!(
                handler = self.kind(),
                bound = self.action_type(),
                received = %event.action_type,
                "Ignoring event for a different action type"
            );
            return Ok(Vec::new());
        }

        match self {
            Self::DirectForward { .. } => ctx.engine.handle_event(event).await,
            Self::DerivedMetric { action_type } => {
                let percentage = ctx
                    .completion
                    .completion_percentage(event.employee_id)
                    .await?;
                let derived = ActionEvent::new(
                    event.employee_id,
                    action_type.clone(),
                    percentage.clamp(0.0, 100.0).round() as i32,
                );
                debug!(
                    employee_id = event.employee_id,
                    percentage,
                    count = derived.count,
                    "Derived completion event"
                );
                ctx.engine.handle_event(&derived).await
            }
            Self::Fallback { action_type } => {
                warn!(
                    employee_id = event.employee_id,
                    action_type = %action_type,
                    "Fallback handler received event; no progress applied"
                );
                Ok(Vec::new())
            }
        }
    }
}
