//! Store contracts.

use async_trait::async_trait;
use skillquest_common::{
    Employee, EmployeeQuest, EmployeeQuestDetail, EmployeeSkillDetail,
    EmployeeUpdate, EmployeeWithSkills, NewEmployee, NewSkill, Quest, QuestDefinition, Result,
    Skill,
};

/// Aggregation function applied to each matching row: `(current, incoming) -> new`.
/// The store clamps the result to `[0, required_count]`.
pub type Aggregate = dyn Fn(i32, i32) -> i32 + Send + Sync;

/// Durable CRUD for quests and per-employee quest progress.
#[async_trait]
pub trait QuestStore: Send + Sync {
    /// Insert a quest. Constraint violations surface as `Conflict`.
    async fn create_quest(&self, definition: &QuestDefinition) -> Result<Quest>;

    async fn get_all_quests(&self) -> Result<Vec<Quest>>;

    async fn get_quest_by_id(&self, quest_id: i64) -> Result<Quest>;

    /// Active quests only.
    async fn get_quests_by_action_type(&self, action_type: &str) -> Result<Vec<Quest>>;

    /// Create the (employee, quest) assignment with zero progress.
    ///
    /// `NotFound` for a missing quest or employee, `InvalidState` for an
    /// inactive quest, `Conflict` if the pair is already assigned.
    async fn assign_quest(&self, employee_id: i64, quest_id: i64) -> Result<EmployeeQuest>;

    async fn get_employee_quests(&self, employee_id: i64) -> Result<Vec<EmployeeQuestDetail>>;

    /// `NotFound` if the pair has never been assigned.
    async fn get_quest_progress(&self, employee_id: i64, quest_id: i64)
        -> Result<EmployeeQuestDetail>;

    /// Advance every incomplete assignment of `employee_id` whose active quest
    /// matches `action_type`. All rows are updated together or none are.
    /// Returned order is unspecified.
    async fn apply_progress_delta(
        &self,
        employee_id: i64,
        action_type: &str,
        incoming: i32,
        aggregate: &Aggregate,
    ) -> Result<Vec<EmployeeQuestDetail>>;
}

/// Employees, the skill catalogue and employee skills.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Duplicate email surfaces as `Conflict`.
    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee>;

    async fn get_employee(&self, employee_id: i64) -> Result<Employee>;

    async fn update_employee(&self, employee_id: i64, update: &EmployeeUpdate) -> Result<Employee>;

    async fn get_employee_with_skills(&self, employee_id: i64) -> Result<EmployeeWithSkills>;

    /// Duplicate name surfaces as `Conflict`.
    async fn create_skill(&self, skill: &NewSkill) -> Result<Skill>;

    async fn get_all_skills(&self) -> Result<Vec<Skill>>;

    async fn add_skill_to_employee(
        &self,
        employee_id: i64,
        skill_id: i64,
        proficiency_level: i32,
    ) -> Result<EmployeeSkillDetail>;

    async fn get_employee_skills(&self, employee_id: i64) -> Result<Vec<EmployeeSkillDetail>>;

    async fn update_employee_skill(
        &self,
        employee_id: i64,
        skill_id: i64,
        proficiency_level: i32,
    ) -> Result<EmployeeSkillDetail>;

    async fn remove_skill_from_employee(&self, employee_id: i64, skill_id: i64) -> Result<()>;
}

/// Clamp an aggregated value into the legal range of a quest.
pub fn clamp_progress(value: i32, required_count: i32) -> i32 {
    value.clamp(0, required_count.max(0))
}
