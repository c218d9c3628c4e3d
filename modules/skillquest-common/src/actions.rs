//! Action Events and the action-type vocabulary consumed across the system.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillQuestError};

pub const SKILL_ADD: &str = "skill_add";
pub const PROFILE_UPDATE: &str = "profile_update";
pub const PROFILE_COMPLETION: &str = "profile_completion";
pub const COMPLETE_PROJECT: &str = "complete_project";

/// Something an employee did. Ephemeral, never persisted.
///
/// For percentage-style action types `count` is an absolute value, not a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub employee_id: i64,
    pub action_type: String,
    pub count: i32,
}

impl ActionEvent {
    pub fn new(employee_id: i64, action_type: impl Into<String>, count: i32) -> Self {
        Self {
            employee_id,
            action_type: action_type.into(),
            count,
        }
    }

    /// Boundary validation for events arriving from outside the process.
    pub fn validate(&self) -> Result<()> {
        if self.action_type.trim().is_empty() {
            return Err(SkillQuestError::Validation(
                "action_type must not be empty".into(),
            ));
        }
        if self.count < 1 {
            return Err(SkillQuestError::Validation(format!(
                "count must be at least 1, got {}",
                self.count
            )));
        }
        Ok(())
    }
}
