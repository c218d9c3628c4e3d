use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use skillquest_common::ActionEvent;
use tracing::{error, info, warn};

use crate::handlers::{Handler, HandlerContext};
use crate::registry::HandlerRegistry;

/// Routes action events to their registered handler.
///
/// `dispatch` never fails: an unregistered action type is logged as a
/// warning, and a failing (or panicking) handler is logged as an error.
/// Progress tracking must not break the operation that emitted the event.
pub struct EventDispatcher {
    registry: HandlerRegistry,
    ctx: HandlerContext,
}

impl EventDispatcher {
    pub fn new(registry: HandlerRegistry, ctx: HandlerContext) -> Self {
        Self { registry, ctx }
    }

    pub async fn dispatch(&self, event: &ActionEvent) {
        let handler = match self.registry.get_handler(&event.action_type) {
            Ok(handler) => handler,
            Err(e) => {
                warn!(
                    employee_id = event.employee_id,
                    action_type = %event.action_type,
                    "{e}"
                );
                return;
            }
        };

        match run(handler, event, &self.ctx).await {
            Ok(updated) => info!(
                employee_id = event.employee_id,
                action_type = %event.action_type,
                updated,
                "Dispatched action event"
            ),
            Err(reason) => error!(
                employee_id = event.employee_id,
                action_type = %event.action_type,
                handler = handler.kind(),
                error = %reason,
                "Event handler failed"
            ),
        }
    }
}

async fn run(handler: &Handler, event: &ActionEvent, ctx: &HandlerContext) -> Result<usize, String> {
    match AssertUnwindSafe(handler.handle(event, ctx)).catch_unwind().await {
        Ok(Ok(updated)) => Ok(updated.len()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => Err(panic_message(&*panic)),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}
