//! In-memory store for tests and database-less runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use skillquest_common::{
    Employee, EmployeeQuest, EmployeeQuestDetail, EmployeeSkill, EmployeeSkillDetail,
    EmployeeUpdate, EmployeeWithSkills, NewEmployee, NewSkill, Quest, QuestDefinition, Result,
    Skill, SkillQuestError,
};

use crate::traits::{clamp_progress, Aggregate, EmployeeStore, QuestStore};

#[derive(Default)]
struct State {
    last_id: i64,
    quests: BTreeMap<i64, Quest>,
    assignments: BTreeMap<i64, EmployeeQuest>,
    employees: BTreeMap<i64, Employee>,
    skills: BTreeMap<i64, Skill>,
    employee_skills: BTreeMap<(i64, i64), EmployeeSkill>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn detail(&self, assignment: &EmployeeQuest) -> Result<EmployeeQuestDetail> {
        let quest = self
            .quests
            .get(&assignment.quest_id)
            .cloned()
            .ok_or_else(|| SkillQuestError::not_found("Quest", assignment.quest_id))?;
        Ok(EmployeeQuestDetail {
            progress: assignment.clone(),
            quest,
        })
    }

    fn skill_detail(&self, employee_skill: &EmployeeSkill) -> Result<EmployeeSkillDetail> {
        let skill = self
            .skills
            .get(&employee_skill.skill_id)
            .ok_or_else(|| SkillQuestError::not_found("Skill", employee_skill.skill_id))?;
        Ok(EmployeeSkillDetail {
            skill_id: skill.id,
            proficiency_level: employee_skill.proficiency_level,
            skill_name: skill.name.clone(),
            skill_description: skill.description.clone(),
        })
    }
}

/// Mutex-guarded store with the same contracts as `PgStore`. Thread-safe;
/// share it through an `Arc` to use it as both `QuestStore` and `EmployeeStore`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panic while the lock is held (e.g. inside an aggregate) happens
    /// before any write, so the state behind a poisoned lock is still whole.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Flip a quest to inactive, the way an administrator would with a direct
    /// update. Not part of the store contracts.
    pub fn deactivate_quest(&self, quest_id: i64) -> Result<()> {
        let mut state = self.state();
        let quest = state
            .quests
            .get_mut(&quest_id)
            .ok_or_else(|| SkillQuestError::not_found("Quest", quest_id))?;
        quest.is_active = false;
        Ok(())
    }

    /// Every assignment currently held (for test assertions).
    pub fn assignments(&self) -> Result<Vec<EmployeeQuest>> {
        Ok(self.state().assignments.values().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

#[async_trait]
impl QuestStore for MemoryStore {
    async fn create_quest(&self, definition: &QuestDefinition) -> Result<Quest> {
        let mut state = self.state();
        let quest = Quest {
            id: state.next_id(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            xp_reward: definition.xp_reward,
            action_type: definition.action_type.clone(),
            required_count: definition.required_count,
            is_active: definition.is_active,
            created_at: Utc::now(),
        };
        state.quests.insert(quest.id, quest.clone());
        Ok(quest)
    }

    async fn get_all_quests(&self) -> Result<Vec<Quest>> {
        Ok(self.state().quests.values().cloned().collect())
    }

    async fn get_quest_by_id(&self, quest_id: i64) -> Result<Quest> {
        self.state()
            .quests
            .get(&quest_id)
            .cloned()
            .ok_or_else(|| SkillQuestError::not_found("Quest", quest_id))
    }

    async fn get_quests_by_action_type(&self, action_type: &str) -> Result<Vec<Quest>> {
        Ok(self
            .state()
            .quests
            .values()
            .filter(|q| q.is_active && q.action_type == action_type)
            .cloned()
            .collect())
    }

    async fn assign_quest(&self, employee_id: i64, quest_id: i64) -> Result<EmployeeQuest> {
        let mut state = self.state();

        let quest = state
            .quests
            .get(&quest_id)
            .ok_or_else(|| SkillQuestError::not_found("Quest", quest_id))?;
        if !quest.is_active {
            return Err(SkillQuestError::InvalidState(format!(
                "Cannot assign inactive quest {quest_id}"
            )));
        }
        if !state.employees.contains_key(&employee_id) {
            return Err(SkillQuestError::not_found("Employee", employee_id));
        }
        if state
            .assignments
            .values()
            .any(|a| a.employee_id == employee_id && a.quest_id == quest_id)
        {
            return Err(SkillQuestError::Conflict(format!(
                "Quest {quest_id} already assigned to employee {employee_id}"
            )));
        }

        let assignment = EmployeeQuest {
            id: state.next_id(),
            employee_id,
            quest_id,
            current_count: 0,
            is_completed: false,
            created_at: Utc::now(),
        };
        state.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn get_employee_quests(&self, employee_id: i64) -> Result<Vec<EmployeeQuestDetail>> {
        let state = self.state();
        state
            .assignments
            .values()
            .filter(|a| a.employee_id == employee_id)
            .map(|a| state.detail(a))
            .collect()
    }

    async fn get_quest_progress(
        &self,
        employee_id: i64,
        quest_id: i64,
    ) -> Result<EmployeeQuestDetail> {
        let state = self.state();
        let assignment = state
            .assignments
            .values()
            .find(|a| a.employee_id == employee_id && a.quest_id == quest_id)
            .ok_or_else(|| {
                SkillQuestError::not_found(
                    "Quest progress",
                    format!("employee_{employee_id}_quest_{quest_id}"),
                )
            })?;
        state.detail(assignment)
    }

    async fn apply_progress_delta(
        &self,
        employee_id: i64,
        action_type: &str,
        incoming: i32,
        aggregate: &Aggregate,
    ) -> Result<Vec<EmployeeQuestDetail>> {
        let mut state = self.state();

        // Compute every new row first, then write them all at once.
        let mut updated = Vec::new();
        for assignment in state.assignments.values() {
            if assignment.employee_id != employee_id || assignment.is_completed {
                continue;
            }
            let mut detail = state.detail(assignment)?;
            if !detail.quest.is_active || detail.quest.action_type != action_type {
                continue;
            }
            let required = detail.quest.required_count;
            let next = clamp_progress(aggregate(detail.progress.current_count, incoming), required);
            detail.progress.current_count = next;
            detail.progress.is_completed = next >= required;
            updated.push(detail);
        }

        for detail in &updated {
            state
                .assignments
                .insert(detail.progress.id, detail.progress.clone());
        }
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Employees and skills
// ---------------------------------------------------------------------------

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let mut state = self.state();
        if state.employees.values().any(|e| e.email == employee.email) {
            return Err(SkillQuestError::Conflict(format!(
                "Employee '{}' already exists",
                employee.email
            )));
        }
        let now = Utc::now();
        let created = Employee {
            id: state.next_id(),
            email: employee.email.clone(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            department: employee.department.clone(),
            rating: employee.rating,
            created_at: now,
            updated_at: now,
        };
        state.employees.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_employee(&self, employee_id: i64) -> Result<Employee> {
        self.state()
            .employees
            .get(&employee_id)
            .cloned()
            .ok_or_else(|| SkillQuestError::not_found("Employee", employee_id))
    }

    async fn update_employee(&self, employee_id: i64, update: &EmployeeUpdate) -> Result<Employee> {
        let mut state = self.state();
        let employee = state
            .employees
            .get_mut(&employee_id)
            .ok_or_else(|| SkillQuestError::not_found("Employee", employee_id))?;

        if let Some(first_name) = &update.first_name {
            employee.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            employee.last_name = last_name.clone();
        }
        if let Some(department) = &update.department {
            employee.department = Some(department.clone());
        }
        if let Some(rating) = update.rating {
            employee.rating = rating;
        }
        employee.updated_at = Utc::now();
        Ok(employee.clone())
    }

    async fn get_employee_with_skills(&self, employee_id: i64) -> Result<EmployeeWithSkills> {
        let state = self.state();
        let employee = state
            .employees
            .get(&employee_id)
            .cloned()
            .ok_or_else(|| SkillQuestError::not_found("Employee", employee_id))?;
        let skills = state
            .employee_skills
            .range((employee_id, i64::MIN)..=(employee_id, i64::MAX))
            .map(|(_, es)| es.clone())
            .collect();
        Ok(EmployeeWithSkills { employee, skills })
    }

    async fn create_skill(&self, skill: &NewSkill) -> Result<Skill> {
        let mut state = self.state();
        if state.skills.values().any(|s| s.name == skill.name) {
            return Err(SkillQuestError::Conflict(format!(
                "Skill '{}' already exists",
                skill.name
            )));
        }
        let created = Skill {
            id: state.next_id(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            created_at: Utc::now(),
        };
        state.skills.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_all_skills(&self) -> Result<Vec<Skill>> {
        let mut skills: Vec<Skill> = self.state().skills.values().cloned().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn add_skill_to_employee(
        &self,
        employee_id: i64,
        skill_id: i64,
        proficiency_level: i32,
    ) -> Result<EmployeeSkillDetail> {
        let mut state = self.state();
        if !state.employees.contains_key(&employee_id) {
            return Err(SkillQuestError::not_found("Employee", employee_id));
        }
        if !state.skills.contains_key(&skill_id) {
            return Err(SkillQuestError::not_found("Skill", skill_id));
        }
        if state.employee_skills.contains_key(&(employee_id, skill_id)) {
            return Err(SkillQuestError::Conflict(format!(
                "Employee {employee_id} already has skill {skill_id}"
            )));
        }

        let employee_skill = EmployeeSkill {
            employee_id,
            skill_id,
            proficiency_level,
            created_at: Utc::now(),
        };
        let detail = state.skill_detail(&employee_skill)?;
        state
            .employee_skills
            .insert((employee_id, skill_id), employee_skill);
        Ok(detail)
    }

    async fn get_employee_skills(&self, employee_id: i64) -> Result<Vec<EmployeeSkillDetail>> {
        let state = self.state();
        let mut details = state
            .employee_skills
            .range((employee_id, i64::MIN)..=(employee_id, i64::MAX))
            .map(|(_, es)| state.skill_detail(es))
            .collect::<Result<Vec<_>>>()?;
        details.sort_by(|a, b| a.skill_name.cmp(&b.skill_name));
        Ok(details)
    }

    async fn update_employee_skill(
        &self,
        employee_id: i64,
        skill_id: i64,
        proficiency_level: i32,
    ) -> Result<EmployeeSkillDetail> {
        let mut state = self.state();
        let employee_skill = state
            .employee_skills
            .get_mut(&(employee_id, skill_id))
            .ok_or_else(|| {
                SkillQuestError::not_found(
                    "Employee skill",
                    format!("employee_{employee_id}_skill_{skill_id}"),
                )
            })?;
        employee_skill.proficiency_level = proficiency_level;
        let employee_skill = employee_skill.clone();
        state.skill_detail(&employee_skill)
    }

    async fn remove_skill_from_employee(&self, employee_id: i64, skill_id: i64) -> Result<()> {
        let mut state = self.state();
        state
            .employee_skills
            .remove(&(employee_id, skill_id))
            .map(|_| ())
            .ok_or_else(|| {
                SkillQuestError::not_found(
                    "Employee skill",
                    format!("employee_{employee_id}_skill_{skill_id}"),
                )
            })
    }
}
