pub mod actions;
pub mod config;
pub mod error;
pub mod types;

pub use actions::ActionEvent;
pub use config::AppConfig;
pub use error::{Result, SkillQuestError};
pub use types::*;
