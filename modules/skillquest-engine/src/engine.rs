use std::sync::Arc;

use skillquest_common::{
    ActionEvent, AssignQuest, EmployeeQuest, ProgressSnapshot, Quest,
    QuestDefinition, Result, SkillQuestError,
};
use skillquest_store::QuestStore;
use tracing::{debug, info};

use crate::policy::PolicyTable;

/// Applies action events to quest progress.
///
/// For an event, every assignment of the employee whose quest is active,
/// matches the action type and is not yet completed gets
/// `clamp(policy(current, count), 0, required)`. The whole batch is applied
/// atomically by the store; completed assignments are never re-evaluated.
pub struct ProgressEngine {
    store: Arc<dyn QuestStore>,
    policies: PolicyTable,
}

impl ProgressEngine {
    pub fn new(store: Arc<dyn QuestStore>) -> Self {
        Self::with_policies(store, PolicyTable::with_defaults())
    }

    pub fn with_policies(store: Arc<dyn QuestStore>, policies: PolicyTable) -> Self {
        Self { store, policies }
    }

    /// Apply one event. Returns a snapshot of each updated assignment;
    /// empty when the employee has nothing open for this action type.
    pub async fn handle_event(&self, event: &ActionEvent) -> Result<Vec<ProgressSnapshot>> {
        let policy = self.policies.get(&event.action_type).ok_or_else(|| {
            SkillQuestError::InvalidState(format!(
                "No aggregation policy declared for action type '{}'",
                event.action_type
            ))
        })?;

        let aggregate = move |current: i32, incoming: i32| policy.apply(current, incoming);
        let updated = self
            .store
            .apply_progress_delta(
                event.employee_id,
                &event.action_type,
                event.count,
                &aggregate,
            )
            .await?;

        debug!(
            employee_id = event.employee_id,
            action_type = %event.action_type,
            count = event.count,
            ?policy,
            updated = updated.len(),
            "Applied action event"
        );

        for detail in updated.iter().filter(|d| d.progress.is_completed) {
            info!(
                employee_id = event.employee_id,
                quest_id = detail.quest.id,
                quest = %detail.quest.name,
                xp_reward = detail.quest.xp_reward,
                "Quest completed"
            );
        }

        Ok(updated.iter().map(ProgressSnapshot::from_detail).collect())
    }

    /// Validate and persist a quest definition.
    pub async fn create_quest(&self, definition: &QuestDefinition) -> Result<Quest> {
        definition.validate()?;
        if self.policies.get(&definition.action_type).is_none() {
            debug!(
                action_type = %definition.action_type,
                "Quest created for action type without a declared policy"
            );
        }
        let quest = self.store.create_quest(definition).await?;
        info!(quest_id = quest.id, action_type = %quest.action_type, "Quest created");
        Ok(quest)
    }

    pub async fn get_all_quests(&self) -> Result<Vec<Quest>> {
        self.store.get_all_quests().await
    }

    pub async fn assign_quest(&self, request: &AssignQuest) -> Result<EmployeeQuest> {
        let assignment = self
            .store
            .assign_quest(request.employee_id, request.quest_id)
            .await?;
        info!(
            employee_id = request.employee_id,
            quest_id = request.quest_id,
            "Quest assigned"
        );
        Ok(assignment)
    }

    /// Snapshot of every assignment the employee holds, completed or not.
    pub async fn get_employee_quests(&self, employee_id: i64) -> Result<Vec<ProgressSnapshot>> {
        let details = self.store.get_employee_quests(employee_id).await?;
        Ok(details.iter().map(ProgressSnapshot::from_detail).collect())
    }

    pub async fn get_quest_progress(
        &self,
        employee_id: i64,
        quest_id: i64,
    ) -> Result<ProgressSnapshot> {
        let detail = self.store.get_quest_progress(employee_id, quest_id).await?;
        Ok(ProgressSnapshot::from_detail(&detail))
    }
}
