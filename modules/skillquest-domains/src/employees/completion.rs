//! Profile completion: how much of an employee's profile is filled in.
//!
//! Each populated field contributes a fixed weight; skills contribute
//! proportionally up to `max_skills`. The score is an integer in `0..=100`.

use std::sync::Arc;

use async_trait::async_trait;
use skillquest_common::{EmployeeWithSkills, Result};
use skillquest_engine::CompletionSource;
use skillquest_store::EmployeeStore;

// =============================================================================
// Weights
// =============================================================================

const FIRST_NAME_WEIGHT: f64 = 15.0;
const LAST_NAME_WEIGHT: f64 = 15.0;
const EMAIL_WEIGHT: f64 = 20.0;
const DEPARTMENT_WEIGHT: f64 = 15.0;
const RATING_WEIGHT: f64 = 15.0;
const SKILLS_WEIGHT: f64 = 20.0;

// =============================================================================
// Calculator
// =============================================================================

pub struct ProfileCompletionCalculator {
    store: Arc<dyn EmployeeStore>,
    max_skills: u32,
}

impl ProfileCompletionCalculator {
    /// `max_skills` is clamped to at least 1.
    pub fn new(store: Arc<dyn EmployeeStore>, max_skills: u32) -> Self {
        Self {
            store,
            max_skills: max_skills.max(1),
        }
    }

    /// Load the employee with skills and score the profile.
    pub async fn profile_completion(&self, employee_id: i64) -> Result<i32> {
        let profile = self.store.get_employee_with_skills(employee_id).await?;
        Ok(score(&profile, self.max_skills))
    }
}

#[async_trait]
impl CompletionSource for ProfileCompletionCalculator {
    async fn completion_percentage(&self, employee_id: i64) -> Result<f64> {
        Ok(f64::from(self.profile_completion(employee_id).await?))
    }
}

/// Score a loaded profile.
pub fn score(profile: &EmployeeWithSkills, max_skills: u32) -> i32 {
    let employee = &profile.employee;
    let filled = |value: &str| !value.trim().is_empty();

    let mut total = 0.0;
    if filled(&employee.first_name) {
        total += FIRST_NAME_WEIGHT;
    }
    if filled(&employee.last_name) {
        total += LAST_NAME_WEIGHT;
    }
    if filled(&employee.email) {
        total += EMAIL_WEIGHT;
    }
    if employee.department.as_deref().is_some_and(filled) {
        total += DEPARTMENT_WEIGHT;
    }
    if employee.rating >= 0.0 {
        total += RATING_WEIGHT;
    }

    let max_skills = max_skills.max(1) as usize;
    let skills = profile.skills.len().min(max_skills);
    total += SKILLS_WEIGHT * skills as f64 / max_skills as f64;

    (total.round() as i32).min(100)
}
