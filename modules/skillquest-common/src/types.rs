use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillQuestError};

// =============================================================================
// Quests
// =============================================================================

/// A trackable achievement: reach `required_count` on `action_type` to earn `xp_reward`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quest {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub xp_reward: i32,
    pub action_type: String,
    pub required_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub xp_reward: i32,
    pub action_type: String,
    pub required_count: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl QuestDefinition {
    pub fn validate(&self) -> Result<()> {
        check_len("name", &self.name, 1, 100)?;
        if let Some(description) = &self.description {
            check_len("description", description, 0, 500)?;
        }
        check_len("action_type", &self.action_type, 1, 50)?;
        if self.xp_reward <= 0 {
            return Err(SkillQuestError::Validation(
                "xp_reward must be positive".into(),
            ));
        }
        if self.required_count < 1 {
            return Err(SkillQuestError::Validation(
                "required_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// One employee's progress against one quest.
///
/// `current_count` stays within `[0, required_count]` and `is_completed`
/// mirrors `current_count >= required_count` after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeQuest {
    pub id: i64,
    pub employee_id: i64,
    pub quest_id: i64,
    pub current_count: i32,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// An assignment joined with its quest definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeQuestDetail {
    pub progress: EmployeeQuest,
    pub quest: Quest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignQuest {
    pub employee_id: i64,
    pub quest_id: i64,
}

/// Read model returned to callers for a single assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub quest_id: i64,
    pub quest_name: String,
    pub current_count: i32,
    pub required_count: i32,
    pub is_completed: bool,
    pub progress_percentage: f64,
    pub xp_reward: i32,
}

impl ProgressSnapshot {
    pub fn from_detail(detail: &EmployeeQuestDetail) -> Self {
        Self {
            quest_id: detail.quest.id,
            quest_name: detail.quest.name.clone(),
            current_count: detail.progress.current_count,
            required_count: detail.quest.required_count,
            is_completed: detail.progress.is_completed,
            progress_percentage: progress_percentage(
                detail.progress.current_count,
                detail.quest.required_count,
            ),
            xp_reward: detail.quest.xp_reward,
        }
    }
}

/// Percentage rounded to one decimal, halves to even. Zero when the target is zero.
pub fn progress_percentage(current_count: i32, required_count: i32) -> f64 {
    if required_count <= 0 {
        return 0.0;
    }
    let raw = f64::from(current_count) * 100.0 / f64::from(required_count);
    (raw * 10.0).round_ties_even() / 10.0
}

// =============================================================================
// Employees
// =============================================================================

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub rating: f64,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<()> {
        if !RE_EMAIL.is_match(&self.email) {
            return Err(SkillQuestError::Validation(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        check_len("first_name", &self.first_name, 1, 50)?;
        check_len("last_name", &self.last_name, 1, 50)?;
        if let Some(department) = &self.department {
            check_len("department", department, 0, 100)?;
        }
        check_rating(self.rating)
    }
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub rating: Option<f64>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.department.is_none()
            && self.rating.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(SkillQuestError::Validation(
                "No data provided for update".into(),
            ));
        }
        if let Some(first_name) = &self.first_name {
            check_len("first_name", first_name, 1, 50)?;
        }
        if let Some(last_name) = &self.last_name {
            check_len("last_name", last_name, 1, 50)?;
        }
        if let Some(department) = &self.department {
            check_len("department", department, 0, 100)?;
        }
        match self.rating {
            Some(rating) => check_rating(rating),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeWithSkills {
    #[serde(flatten)]
    pub employee: Employee,
    pub skills: Vec<EmployeeSkill>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCompletion {
    pub completion_percentage: i32,
}

// =============================================================================
// Skills
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSkill {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewSkill {
    pub fn validate(&self) -> Result<()> {
        check_len("name", &self.name, 1, 60)?;
        if let Some(description) = &self.description {
            check_len("description", description, 0, 500)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeSkill {
    pub employee_id: i64,
    pub skill_id: i64,
    pub proficiency_level: i32,
    pub created_at: DateTime<Utc>,
}

/// An employee's skill joined with the skill's name and description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeSkillDetail {
    pub skill_id: i64,
    pub proficiency_level: i32,
    pub skill_name: String,
    pub skill_description: Option<String>,
}

pub const MIN_PROFICIENCY: i32 = 1;
pub const MAX_PROFICIENCY: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddEmployeeSkill {
    pub skill_id: i64,
    pub proficiency_level: i32,
}

impl AddEmployeeSkill {
    pub fn validate(&self) -> Result<()> {
        check_proficiency(self.proficiency_level)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEmployeeSkill {
    pub proficiency_level: i32,
}

impl UpdateEmployeeSkill {
    pub fn validate(&self) -> Result<()> {
        check_proficiency(self.proficiency_level)
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.trim().chars().count();
    if len < min || value.chars().count() > max {
        return Err(SkillQuestError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn check_rating(rating: f64) -> Result<()> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(SkillQuestError::Validation(
            "rating must be between 0.0 and 5.0".into(),
        ));
    }
    Ok(())
}

fn check_proficiency(level: i32) -> Result<()> {
    if !(MIN_PROFICIENCY..=MAX_PROFICIENCY).contains(&level) {
        return Err(SkillQuestError::Validation(format!(
            "proficiency_level must be between {MIN_PROFICIENCY} and {MAX_PROFICIENCY}"
        )));
    }
    Ok(())
}
