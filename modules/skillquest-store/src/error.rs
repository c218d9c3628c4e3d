//! Translation of `sqlx` failures into the shared error taxonomy.

use skillquest_common::SkillQuestError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map a database error for an operation on `entity` identified by `id`.
///
/// Recognised conditions become `NotFound` / `Conflict`; everything else is
/// wrapped as `Store` with the original cause attached.
pub fn map_db_error(err: sqlx::Error, entity: &'static str, id: impl ToString) -> SkillQuestError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return SkillQuestError::not_found(entity, id);
    }

    let (code, constraint) = match &err {
        sqlx::Error::Database(db) => (
            db.code().map(|c| c.into_owned()),
            db.constraint().map(str::to_owned),
        ),
        _ => (None, None),
    };

    match code.as_deref() {
        Some(UNIQUE_VIOLATION) => {
            SkillQuestError::Conflict(format!("{entity} '{}' already exists", id.to_string()))
        }
        Some(FOREIGN_KEY_VIOLATION) => SkillQuestError::NotFound {
            entity: referenced_entity(constraint.as_deref()),
            id: id.to_string(),
        },
        _ => SkillQuestError::store(err),
    }
}

/// Wrap without recognising anything more specific.
pub fn store_error(err: sqlx::Error) -> SkillQuestError {
    SkillQuestError::store(err)
}

fn referenced_entity(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(c) if c.contains("employee_id") => "Employee",
        Some(c) if c.contains("skill_id") => "Skill",
        Some(c) if c.contains("quest_id") => "Quest",
        _ => "Referenced entity",
    }
}
