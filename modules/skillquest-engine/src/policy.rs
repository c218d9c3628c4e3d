//! Aggregation policies: how an incoming count combines with stored progress.

use std::collections::HashMap;

use serde::Serialize;
use skillquest_common::actions::{COMPLETE_PROJECT, PROFILE_COMPLETION, PROFILE_UPDATE, SKILL_ADD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Counts accumulate: `current + incoming`.
    Incremental,
    /// Progress only ever rises to the best value seen: `max(current, incoming)`.
    HighWaterMark,
}

impl AggregationPolicy {
    /// Combine stored progress with an incoming value. Clamping to the
    /// quest's required count happens in the store.
    pub fn apply(self, current: i32, incoming: i32) -> i32 {
        match self {
            Self::Incremental => current.saturating_add(incoming),
            Self::HighWaterMark => current.max(incoming),
        }
    }
}

/// Action type -> aggregation policy. Declared up front, never inferred.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<String, AggregationPolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in action types.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.declare(SKILL_ADD, AggregationPolicy::Incremental);
        table.declare(PROFILE_UPDATE, AggregationPolicy::Incremental);
        table.declare(COMPLETE_PROJECT, AggregationPolicy::Incremental);
        table.declare(PROFILE_COMPLETION, AggregationPolicy::HighWaterMark);
        table
    }

    /// Declare (or redeclare) the policy for an action type.
    /// Returns the previous policy, if any.
    pub fn declare(
        &mut self,
        action_type: impl Into<String>,
        policy: AggregationPolicy,
    ) -> Option<AggregationPolicy> {
        self.policies.insert(action_type.into(), policy)
    }

    pub fn get(&self, action_type: &str) -> Option<AggregationPolicy> {
        self.policies.get(action_type).copied()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
