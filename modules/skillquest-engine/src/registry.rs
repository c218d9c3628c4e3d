use std::collections::HashMap;

use skillquest_common::actions::{COMPLETE_PROJECT, PROFILE_COMPLETION, PROFILE_UPDATE, SKILL_ADD};
use skillquest_common::{Result, SkillQuestError};

use crate::handlers::Handler;

/// Action type -> handler. One handler per action type; registering again
/// replaces the previous binding.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for the built-in action types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for action_type in [SKILL_ADD, PROFILE_UPDATE, COMPLETE_PROJECT] {
            registry.register(action_type, Handler::direct_forward(action_type));
        }
        registry.register(PROFILE_COMPLETION, Handler::derived_metric(PROFILE_COMPLETION));
        registry
    }

    /// Bind `handler` to `action_type`, returning the handler it replaced.
    pub fn register(&mut self, action_type: impl Into<String>, handler: Handler) -> Option<Handler> {
        let action_type = action_type.into();
        tracing::debug!(
            action_type = %action_type,
            handler = handler.kind(),
            "Registering event handler"
        );
        self.handlers.insert(action_type, handler)
    }

    pub fn get_handler(&self, action_type: &str) -> Result<&Handler> {
        self.handlers
            .get(action_type)
            .ok_or_else(|| SkillQuestError::UnregisteredActionType(action_type.to_string()))
    }

    pub fn action_types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}
