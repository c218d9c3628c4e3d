use std::sync::Arc;

use skillquest_common::actions::{PROFILE_COMPLETION, SKILL_ADD};
use skillquest_common::{
    ActionEvent, AddEmployeeSkill, EmployeeSkillDetail, Result, UpdateEmployeeSkill,
};
use skillquest_engine::EventDispatcher;
use skillquest_store::EmployeeStore;
use tracing::info;

/// Skills held by an employee.
///
/// Adding a skill advances `skill_add` quests. Adding or removing one
/// re-evaluates profile completion; completion quests use a high-water
/// mark, so removal never lowers progress.
pub struct EmployeeSkillService {
    store: Arc<dyn EmployeeStore>,
    dispatcher: Arc<EventDispatcher>,
}

impl EmployeeSkillService {
    pub fn new(store: Arc<dyn EmployeeStore>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub async fn add_skill(
        &self,
        employee_id: i64,
        request: &AddEmployeeSkill,
    ) -> Result<EmployeeSkillDetail> {
        request.validate()?;
        let detail = self
            .store
            .add_skill_to_employee(employee_id, request.skill_id, request.proficiency_level)
            .await?;
        info!(employee_id, skill_id = request.skill_id, "Skill added to employee");

        self.dispatcher
            .dispatch(&ActionEvent::new(employee_id, SKILL_ADD, 1))
            .await;
        self.completion_changed(employee_id).await;

        Ok(detail)
    }

    pub async fn get_employee_skills(&self, employee_id: i64) -> Result<Vec<EmployeeSkillDetail>> {
        // 404 for unknown employees rather than an empty list.
        self.store.get_employee(employee_id).await?;
        self.store.get_employee_skills(employee_id).await
    }

    pub async fn update_skill(
        &self,
        employee_id: i64,
        skill_id: i64,
        request: &UpdateEmployeeSkill,
    ) -> Result<EmployeeSkillDetail> {
        request.validate()?;
        self.store
            .update_employee_skill(employee_id, skill_id, request.proficiency_level)
            .await
    }

    pub async fn remove_skill(&self, employee_id: i64, skill_id: i64) -> Result<()> {
        self.store
            .remove_skill_from_employee(employee_id, skill_id)
            .await?;
        info!(employee_id, skill_id, "Skill removed from employee");
        self.completion_changed(employee_id).await;
        Ok(())
    }

    async fn completion_changed(&self, employee_id: i64) {
        self.dispatcher
            .dispatch(&ActionEvent::new(employee_id, PROFILE_COMPLETION, 0))
            .await;
    }
}
