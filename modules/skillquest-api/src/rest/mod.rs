pub mod employees;
pub mod quests;
pub mod skills;

use crate::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;
