//! Postgres-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skillquest_common::{
    Employee, EmployeeQuest, EmployeeQuestDetail, EmployeeSkill, EmployeeSkillDetail,
    EmployeeUpdate, EmployeeWithSkills, NewEmployee, NewSkill, Quest, QuestDefinition, Result,
    Skill, SkillQuestError,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::error::{map_db_error, store_error};
use crate::traits::{clamp_progress, Aggregate, EmployeeStore, QuestStore};

/// Assignment columns plus the joined quest, prefixed `q_`.
const PROGRESS_SELECT: &str = r#"
    SELECT eq.id, eq.employee_id, eq.quest_id, eq.current_count, eq.is_completed, eq.created_at,
           q.name AS q_name, q.description AS q_description, q.xp_reward AS q_xp_reward,
           q.action_type AS q_action_type, q.required_count AS q_required_count,
           q.is_active AS q_is_active, q.created_at AS q_created_at
    FROM employee_quests eq
    JOIN quests q ON q.id = eq.quest_id
"#;

#[derive(sqlx::FromRow)]
struct ProgressRow {
    id: i64,
    employee_id: i64,
    quest_id: i64,
    current_count: i32,
    is_completed: bool,
    created_at: DateTime<Utc>,
    q_name: String,
    q_description: Option<String>,
    q_xp_reward: i32,
    q_action_type: String,
    q_required_count: i32,
    q_is_active: bool,
    q_created_at: DateTime<Utc>,
}

impl From<ProgressRow> for EmployeeQuestDetail {
    fn from(row: ProgressRow) -> Self {
        EmployeeQuestDetail {
            progress: EmployeeQuest {
                id: row.id,
                employee_id: row.employee_id,
                quest_id: row.quest_id,
                current_count: row.current_count,
                is_completed: row.is_completed,
                created_at: row.created_at,
            },
            quest: Quest {
                id: row.quest_id,
                name: row.q_name,
                description: row.q_description,
                xp_reward: row.q_xp_reward,
                action_type: row.q_action_type,
                required_count: row.q_required_count,
                is_active: row.q_is_active,
                created_at: row.q_created_at,
            },
        }
    }
}

/// Store backed by Postgres. Every mutating call that touches more than one
/// row runs inside its own transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(store_error)
    }
}

async fn employee_exists(tx: &mut Transaction<'_, Postgres>, employee_id: i64) -> Result<bool> {
    let row = sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
        .bind(employee_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(store_error)?;
    Ok(row.0)
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

#[async_trait]
impl QuestStore for PgStore {
    async fn create_quest(&self, definition: &QuestDefinition) -> Result<Quest> {
        sqlx::query_as::<_, Quest>(
            r#"
            INSERT INTO quests (name, description, xp_reward, action_type, required_count, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&definition.name)
        .bind(&definition.description)
        .bind(definition.xp_reward)
        .bind(&definition.action_type)
        .bind(definition.required_count)
        .bind(definition.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Quest", &definition.name))
    }

    async fn get_all_quests(&self) -> Result<Vec<Quest>> {
        sqlx::query_as::<_, Quest>("SELECT * FROM quests ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn get_quest_by_id(&self, quest_id: i64) -> Result<Quest> {
        sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = $1")
            .bind(quest_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Quest", quest_id))
    }

    async fn get_quests_by_action_type(&self, action_type: &str) -> Result<Vec<Quest>> {
        sqlx::query_as::<_, Quest>(
            "SELECT * FROM quests WHERE action_type = $1 AND is_active ORDER BY id ASC",
        )
        .bind(action_type)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn assign_quest(&self, employee_id: i64, quest_id: i64) -> Result<EmployeeQuest> {
        let mut tx = self.begin().await?;

        let quest = sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = $1")
            .bind(quest_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error)?
            .ok_or_else(|| SkillQuestError::not_found("Quest", quest_id))?;

        if !quest.is_active {
            return Err(SkillQuestError::InvalidState(format!(
                "Cannot assign inactive quest {quest_id}"
            )));
        }

        if !employee_exists(&mut tx, employee_id).await? {
            return Err(SkillQuestError::not_found("Employee", employee_id));
        }

        let already = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(SELECT 1 FROM employee_quests WHERE employee_id = $1 AND quest_id = $2)",
        )
        .bind(employee_id)
        .bind(quest_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error)?;

        if already.0 {
            return Err(SkillQuestError::Conflict(format!(
                "Quest {quest_id} already assigned to employee {employee_id}"
            )));
        }

        let assignment = sqlx::query_as::<_, EmployeeQuest>(
            r#"
            INSERT INTO employee_quests (employee_id, quest_id, current_count, is_completed)
            VALUES ($1, $2, 0, FALSE)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(quest_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Quest assignment", format!("employee_{employee_id}_quest_{quest_id}")))?;

        tx.commit().await.map_err(store_error)?;
        Ok(assignment)
    }

    async fn get_employee_quests(&self, employee_id: i64) -> Result<Vec<EmployeeQuestDetail>> {
        let rows = sqlx::query_as::<_, ProgressRow>(&format!(
            "{PROGRESS_SELECT} WHERE eq.employee_id = $1 ORDER BY eq.id ASC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_quest_progress(
        &self,
        employee_id: i64,
        quest_id: i64,
    ) -> Result<EmployeeQuestDetail> {
        sqlx::query_as::<_, ProgressRow>(&format!(
            "{PROGRESS_SELECT} WHERE eq.employee_id = $1 AND eq.quest_id = $2"
        ))
        .bind(employee_id)
        .bind(quest_id)
        .fetch_one(&self.pool)
        .await
        .map(Into::into)
        .map_err(|e| {
            map_db_error(
                e,
                "Quest progress",
                format!("employee_{employee_id}_quest_{quest_id}"),
            )
        })
    }

    async fn apply_progress_delta(
        &self,
        employee_id: i64,
        action_type: &str,
        incoming: i32,
        aggregate: &Aggregate,
    ) -> Result<Vec<EmployeeQuestDetail>> {
        let mut tx = self.begin().await?;

        let rows = sqlx::query_as::<_, ProgressRow>(&format!(
            r#"{PROGRESS_SELECT}
            WHERE eq.employee_id = $1
              AND q.action_type = $2
              AND q.is_active
              AND NOT eq.is_completed
            ORDER BY eq.id ASC
            FOR UPDATE OF eq"#
        ))
        .bind(employee_id)
        .bind(action_type)
        .fetch_all(&mut *tx)
        .await
        .map_err(store_error)?;

        let mut updated = Vec::with_capacity(rows.len());
        for row in rows {
            let mut detail = EmployeeQuestDetail::from(row);
            let required = detail.quest.required_count;
            let next = clamp_progress(aggregate(detail.progress.current_count, incoming), required);

            detail.progress = sqlx::query_as::<_, EmployeeQuest>(
                r#"
                UPDATE employee_quests
                SET current_count = $1, is_completed = $2
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(next)
            .bind(next >= required)
            .bind(detail.progress.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_error)?;

            updated.push(detail);
        }

        // Dropping `tx` on any earlier `?` rolls every row back.
        tx.commit().await.map_err(store_error)?;

        debug!(employee_id, action_type, rows = updated.len(), "Applied progress delta");
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Employees and skills
// ---------------------------------------------------------------------------

const SKILL_DETAIL_SELECT: &str = r#"
    SELECT es.skill_id, es.proficiency_level, s.name AS skill_name, s.description AS skill_description
    FROM employee_skills es
    JOIN skills s ON s.id = es.skill_id
"#;

#[async_trait]
impl EmployeeStore for PgStore {
    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (email, first_name, last_name, department, rating)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&employee.email)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.department)
        .bind(employee.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Employee", &employee.email))
    }

    async fn get_employee(&self, employee_id: i64) -> Result<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(employee_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Employee", employee_id))
    }

    async fn update_employee(&self, employee_id: i64, update: &EmployeeUpdate) -> Result<Employee> {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                department = COALESCE($4, department),
                rating = COALESCE($5, rating),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.department)
        .bind(update.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Employee", employee_id))
    }

    async fn get_employee_with_skills(&self, employee_id: i64) -> Result<EmployeeWithSkills> {
        let employee = self.get_employee(employee_id).await?;
        let skills = sqlx::query_as::<_, EmployeeSkill>(
            "SELECT * FROM employee_skills WHERE employee_id = $1 ORDER BY created_at ASC, skill_id ASC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(EmployeeWithSkills { employee, skills })
    }

    async fn create_skill(&self, skill: &NewSkill) -> Result<Skill> {
        sqlx::query_as::<_, Skill>(
            "INSERT INTO skills (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&skill.name)
        .bind(&skill.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Skill", &skill.name))
    }

    async fn get_all_skills(&self) -> Result<Vec<Skill>> {
        sqlx::query_as::<_, Skill>("SELECT * FROM skills ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn add_skill_to_employee(
        &self,
        employee_id: i64,
        skill_id: i64,
        proficiency_level: i32,
    ) -> Result<EmployeeSkillDetail> {
        let mut tx = self.begin().await?;

        if !employee_exists(&mut tx, employee_id).await? {
            return Err(SkillQuestError::not_found("Employee", employee_id));
        }

        let skill_exists =
            sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM skills WHERE id = $1)")
                .bind(skill_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_error)?;
        if !skill_exists.0 {
            return Err(SkillQuestError::not_found("Skill", skill_id));
        }

        let detail = sqlx::query_as::<_, EmployeeSkillDetail>(
            r#"
            WITH inserted AS (
                INSERT INTO employee_skills (employee_id, skill_id, proficiency_level)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.skill_id, i.proficiency_level, s.name AS skill_name, s.description AS skill_description
            FROM inserted i
            JOIN skills s ON s.id = i.skill_id
            "#,
        )
        .bind(employee_id)
        .bind(skill_id)
        .bind(proficiency_level)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match map_db_error(e, "Employee skill", skill_id) {
            SkillQuestError::Conflict(_) => SkillQuestError::Conflict(format!(
                "Employee {employee_id} already has skill {skill_id}"
            )),
            other => other,
        })?;

        tx.commit().await.map_err(store_error)?;
        Ok(detail)
    }

    async fn get_employee_skills(&self, employee_id: i64) -> Result<Vec<EmployeeSkillDetail>> {
        sqlx::query_as::<_, EmployeeSkillDetail>(&format!(
            "{SKILL_DETAIL_SELECT} WHERE es.employee_id = $1 ORDER BY s.name ASC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn update_employee_skill(
        &self,
        employee_id: i64,
        skill_id: i64,
        proficiency_level: i32,
    ) -> Result<EmployeeSkillDetail> {
        sqlx::query_as::<_, EmployeeSkillDetail>(
            r#"
            WITH updated AS (
                UPDATE employee_skills SET proficiency_level = $3
                WHERE employee_id = $1 AND skill_id = $2
                RETURNING *
            )
            SELECT u.skill_id, u.proficiency_level, s.name AS skill_name, s.description AS skill_description
            FROM updated u
            JOIN skills s ON s.id = u.skill_id
            "#,
        )
        .bind(employee_id)
        .bind(skill_id)
        .bind(proficiency_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_db_error(
                e,
                "Employee skill",
                format!("employee_{employee_id}_skill_{skill_id}"),
            )
        })
    }

    async fn remove_skill_from_employee(&self, employee_id: i64, skill_id: i64) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM employee_skills WHERE employee_id = $1 AND skill_id = $2")
                .bind(employee_id)
                .bind(skill_id)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(SkillQuestError::not_found(
                "Employee skill",
                format!("employee_{employee_id}_skill_{skill_id}"),
            ));
        }
        Ok(())
    }
}
