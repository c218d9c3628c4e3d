//! Contract tests for MemoryStore. No database required.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use skillquest_common::{
    EmployeeUpdate, NewEmployee, NewSkill, QuestDefinition, SkillQuestError,
};
use skillquest_store::{EmployeeStore, MemoryStore, QuestStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn quest(action_type: &str, required_count: i32) -> QuestDefinition {
    QuestDefinition {
        name: format!("{action_type} x{required_count}"),
        description: None,
        xp_reward: 100,
        action_type: action_type.into(),
        required_count,
        is_active: true,
    }
}

fn employee(email: &str) -> NewEmployee {
    NewEmployee {
        email: email.into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        department: None,
        rating: 0.0,
    }
}

fn add(current: i32, incoming: i32) -> i32 {
    current.saturating_add(incoming)
}

// =========================================================================
// Quests
// =========================================================================

#[tokio::test]
async fn quests_by_action_type_skips_inactive() {
    let store = MemoryStore::new();
    let active = store.create_quest(&quest("skill_add", 5)).await.unwrap();
    let mut inactive = quest("skill_add", 3);
    inactive.is_active = false;
    store.create_quest(&inactive).await.unwrap();
    store.create_quest(&quest("complete_project", 1)).await.unwrap();

    let found = store.get_quests_by_action_type("skill_add").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, active.id);

    assert!(store
        .get_quests_by_action_type("unknown")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn missing_quest_is_not_found() {
    let store = MemoryStore::new();
    let err = store.get_quest_by_id(99).await.unwrap_err();
    assert!(matches!(err, SkillQuestError::NotFound { entity: "Quest", .. }));
}

#[tokio::test]
async fn assignment_starts_at_zero() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let q = store.create_quest(&quest("skill_add", 5)).await.unwrap();

    let assignment = store.assign_quest(e.id, q.id).await.unwrap();
    assert_eq!(assignment.current_count, 0);
    assert!(!assignment.is_completed);
}

#[tokio::test]
async fn assigning_twice_conflicts() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let q = store.create_quest(&quest("skill_add", 5)).await.unwrap();

    store.assign_quest(e.id, q.id).await.unwrap();
    let err = store.assign_quest(e.id, q.id).await.unwrap_err();
    assert!(matches!(err, SkillQuestError::Conflict(_)));
}

#[tokio::test]
async fn assigning_inactive_quest_is_invalid_state() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let mut def = quest("skill_add", 5);
    def.is_active = false;
    let q = store.create_quest(&def).await.unwrap();

    let err = store.assign_quest(e.id, q.id).await.unwrap_err();
    assert!(matches!(err, SkillQuestError::InvalidState(_)));
}

#[tokio::test]
async fn assigning_to_unknown_employee_is_not_found() {
    let store = MemoryStore::new();
    let q = store.create_quest(&quest("skill_add", 5)).await.unwrap();

    let err = store.assign_quest(404, q.id).await.unwrap_err();
    assert!(matches!(err, SkillQuestError::NotFound { entity: "Employee", .. }));
}

#[tokio::test]
async fn unassigned_progress_is_not_found() {
    let store = MemoryStore::new();
    let err = store.get_quest_progress(1, 2).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Quest progress with identifier 'employee_1_quest_2' not found"
    );
}

#[tokio::test]
async fn delta_clamps_and_completes() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let q = store.create_quest(&quest("skill_add", 5)).await.unwrap();
    store.assign_quest(e.id, q.id).await.unwrap();

    let updated = store
        .apply_progress_delta(e.id, "skill_add", 1000, &add)
        .await
        .unwrap();

    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].progress.current_count, 5);
    assert!(updated[0].progress.is_completed);
}

#[tokio::test]
async fn delta_skips_completed_inactive_and_other_types() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let done = store.create_quest(&quest("skill_add", 1)).await.unwrap();
    let retired = store.create_quest(&quest("skill_add", 10)).await.unwrap();
    let open = store.create_quest(&quest("skill_add", 10)).await.unwrap();
    let other = store.create_quest(&quest("complete_project", 10)).await.unwrap();
    for q in [&done, &retired, &open, &other] {
        store.assign_quest(e.id, q.id).await.unwrap();
    }

    store
        .apply_progress_delta(e.id, "skill_add", 1, &add)
        .await
        .unwrap();
    store.deactivate_quest(retired.id).unwrap();

    let updated = store
        .apply_progress_delta(e.id, "skill_add", 1, &add)
        .await
        .unwrap();

    let ids: Vec<i64> = updated.iter().map(|d| d.quest.id).collect();
    assert_eq!(ids, vec![open.id]);
    assert_eq!(updated[0].progress.current_count, 2);

    let untouched = store.get_quest_progress(e.id, other.id).await.unwrap();
    assert_eq!(untouched.progress.current_count, 0);
    let frozen = store.get_quest_progress(e.id, retired.id).await.unwrap();
    assert_eq!(frozen.progress.current_count, 1);
}

#[tokio::test]
async fn delta_never_goes_negative() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let q = store.create_quest(&quest("skill_add", 5)).await.unwrap();
    store.assign_quest(e.id, q.id).await.unwrap();

    let updated = store
        .apply_progress_delta(e.id, "skill_add", -7, &add)
        .await
        .unwrap();
    assert_eq!(updated[0].progress.current_count, 0);
    assert!(!updated[0].progress.is_completed);
}

#[tokio::test]
async fn delta_failing_mid_batch_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let first = store.create_quest(&quest("skill_add", 10)).await.unwrap();
    let second = store.create_quest(&quest("skill_add", 10)).await.unwrap();
    store.assign_quest(e.id, first.id).await.unwrap();
    store.assign_quest(e.id, second.id).await.unwrap();
    store
        .apply_progress_delta(e.id, "skill_add", 1, &add)
        .await
        .unwrap();

    // The aggregate blows up on the second row.
    let task_store = store.clone();
    let employee_id = e.id;
    let outcome = tokio::spawn(async move {
        let calls = AtomicUsize::new(0);
        let aggregate = move |current: i32, incoming: i32| {
            if calls.fetch_add(1, Ordering::SeqCst) == 1 {
                panic!("aggregate failed on second row");
            }
            current + incoming
        };
        task_store
            .apply_progress_delta(employee_id, "skill_add", 3, &aggregate)
            .await
    })
    .await;
    assert!(outcome.unwrap_err().is_panic());

    for q in [&first, &second] {
        let progress = store.get_quest_progress(e.id, q.id).await.unwrap();
        assert_eq!(progress.progress.current_count, 1);
    }

    // Still usable afterwards.
    let updated = store
        .apply_progress_delta(e.id, "skill_add", 1, &add)
        .await
        .unwrap();
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|d| d.progress.current_count == 2));
}

// =========================================================================
// Employees and skills
// =========================================================================

#[tokio::test]
async fn duplicate_email_conflicts() {
    let store = MemoryStore::new();
    store.create_employee(&employee("a@example.com")).await.unwrap();
    let err = store
        .create_employee(&employee("a@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, SkillQuestError::Conflict(_)));
}

#[tokio::test]
async fn update_only_touches_given_fields() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();

    let updated = store
        .update_employee(
            e.id,
            &EmployeeUpdate {
                department: Some("R&D".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.department.as_deref(), Some("R&D"));
    assert_eq!(updated.first_name, "Ada");
    assert!(updated.updated_at >= e.updated_at);
}

#[tokio::test]
async fn employee_skill_lifecycle() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let rust = store
        .create_skill(&NewSkill {
            name: "Rust".into(),
            description: Some("Systems language".into()),
        })
        .await
        .unwrap();

    let added = store.add_skill_to_employee(e.id, rust.id, 3).await.unwrap();
    assert_eq!(added.skill_name, "Rust");
    assert_eq!(added.proficiency_level, 3);

    let dup = store
        .add_skill_to_employee(e.id, rust.id, 4)
        .await
        .unwrap_err();
    assert!(matches!(dup, SkillQuestError::Conflict(_)));

    let updated = store.update_employee_skill(e.id, rust.id, 5).await.unwrap();
    assert_eq!(updated.proficiency_level, 5);

    let profile = store.get_employee_with_skills(e.id).await.unwrap();
    assert_eq!(profile.skills.len(), 1);

    store.remove_skill_from_employee(e.id, rust.id).await.unwrap();
    let err = store
        .remove_skill_from_employee(e.id, rust.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SkillQuestError::NotFound { .. }));
    assert!(store.get_employee_skills(e.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn adding_unknown_skill_is_not_found() {
    let store = MemoryStore::new();
    let e = store.create_employee(&employee("a@example.com")).await.unwrap();
    let err = store.add_skill_to_employee(e.id, 77, 1).await.unwrap_err();
    assert!(matches!(err, SkillQuestError::NotFound { entity: "Skill", .. }));
}

#[tokio::test]
async fn duplicate_skill_name_conflicts() {
    let store = MemoryStore::new();
    let skill = NewSkill {
        name: "Docker".into(),
        description: None,
    };
    store.create_skill(&skill).await.unwrap();
    assert!(matches!(
        store.create_skill(&skill).await.unwrap_err(),
        SkillQuestError::Conflict(_)
    ));
}
