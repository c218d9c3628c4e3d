use std::sync::Arc;

use skillquest_common::{NewSkill, Result, Skill};
use skillquest_store::EmployeeStore;
use tracing::info;

/// Skill catalogue.
pub struct SkillService {
    store: Arc<dyn EmployeeStore>,
}

impl SkillService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    pub async fn create_skill(&self, new: &NewSkill) -> Result<Skill> {
        new.validate()?;
        let skill = self.store.create_skill(new).await?;
        info!(skill_id = skill.id, name = %skill.name, "Skill created");
        Ok(skill)
    }

    pub async fn get_all_skills(&self) -> Result<Vec<Skill>> {
        self.store.get_all_skills().await
    }
}
