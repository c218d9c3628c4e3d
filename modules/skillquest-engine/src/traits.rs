//! Seams to collaborators outside the engine.

use async_trait::async_trait;
use skillquest_common::Result;

/// Computes an employee's current profile completion from live state.
///
/// Must return a value in `0.0..=100.0`. Implemented by the employee domain.
#[async_trait]
pub trait CompletionSource: Send + Sync {
    async fn completion_percentage(&self, employee_id: i64) -> Result<f64>;
}
