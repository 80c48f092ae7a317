use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{
    CreateGoalRequest, Goal, GoalProgress, GoalProgressHistory, GoalQuery, GoalStatus, GoalType,
    GoalView, GoalsSummary, NewNotification, RecordProgressRequest, UpdateGoalRequest,
};
use crate::services::notification_service::insert_notification;

#[derive(Clone)]
pub struct GoalService {
    db: PgPool,
}

impl GoalService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // Goal CRUD operations
    pub async fn create_goal(&self, user_id: Uuid, request: CreateGoalRequest) -> Result<Goal> {
        let start_date = request.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let unit = request
            .unit
            .or_else(|| request.goal_type.default_unit().map(str::to_string));

        let goal = sqlx::query_as::<_, Goal>(
            r#"
            INSERT INTO goals (
                id, user_id, title, description, goal_type,
                target_value, unit, start_date, end_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.title.trim())
        .bind(request.description)
        .bind(request.goal_type)
        .bind(request.target_value)
        .bind(unit)
        .bind(start_date)
        .bind(request.end_date)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!("Created goal {} for user {}", goal.id, user_id);
        Ok(goal)
    }

    pub async fn get_goal(&self, goal_id: Uuid, user_id: Uuid) -> Result<Option<Goal>> {
        let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(goal)
    }

    pub async fn list_goals(&self, user_id: Uuid, query: GoalQuery) -> Result<Vec<Goal>> {
        let mut sql = "SELECT * FROM goals WHERE user_id = $1".to_string();
        let mut param_count = 2;

        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", param_count));
            param_count += 1;
        }
        if query.goal_type.is_some() {
            sql.push_str(&format!(" AND goal_type = ${}", param_count));
        }

        sql.push_str(" ORDER BY end_date ASC NULLS LAST, created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Goal>(&sql).bind(user_id);
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(goal_type) = query.goal_type {
            query_builder = query_builder.bind(goal_type);
        }

        let goals = query_builder.fetch_all(&self.db).await?;
        Ok(goals)
    }

    /// A target lowered to the current value or below completes the goal
    pub async fn update_goal(
        &self,
        goal_id: Uuid,
        user_id: Uuid,
        request: UpdateGoalRequest,
    ) -> Result<Option<Goal>> {
        let mut tx = self.db.begin().await?;
        let Some(before) = lock_goal(&mut tx, goal_id, user_id).await? else {
            return Ok(None);
        };

        let after = sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                target_value = COALESCE($5, target_value),
                unit = COALESCE($6, unit),
                end_date = COALESCE($7, end_date),
                status = CASE
                    WHEN COALESCE($8, status) = 'active' AND current_value >= COALESCE($5, target_value)
                        THEN 'completed'::goal_status
                    ELSE COALESCE($8, status)
                END,
                achieved_at = CASE
                    WHEN achieved_at IS NULL AND COALESCE($8, status) = 'active'
                        AND current_value >= COALESCE($5, target_value) THEN NOW()
                    ELSE achieved_at
                END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(goal_id)
        .bind(user_id)
        .bind(request.title.as_deref().map(str::trim))
        .bind(request.description)
        .bind(request.target_value)
        .bind(request.unit)
        .bind(request.end_date)
        .bind(request.status)
        .fetch_one(&mut *tx)
        .await?;

        announce_if_achieved(&mut tx, &before, &after).await?;
        tx.commit().await?;

        Ok(Some(after))
    }

    pub async fn delete_goal(&self, goal_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Appends a progress entry and makes its value the goal's current value
    pub async fn record_progress(
        &self,
        goal_id: Uuid,
        user_id: Uuid,
        request: RecordProgressRequest,
    ) -> Result<Option<Goal>> {
        let mut tx = self.db.begin().await?;
        let Some(before) = lock_goal(&mut tx, goal_id, user_id).await? else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO goal_progress (id, goal_id, value, recorded_on, note)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(goal_id)
        .bind(request.value)
        .bind(request.recorded_on.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(request.note)
        .execute(&mut *tx)
        .await?;

        let after = set_current_value(&mut tx, goal_id, request.value).await?;
        announce_if_achieved(&mut tx, &before, &after).await?;
        tx.commit().await?;

        Ok(Some(after))
    }

    pub async fn progress_history(&self, goal_id: Uuid, user_id: Uuid) -> Result<Option<GoalProgressHistory>> {
        let Some(goal) = self.get_goal(goal_id, user_id).await? else {
            return Ok(None);
        };

        let entries = sqlx::query_as::<_, GoalProgress>(
            "SELECT * FROM goal_progress WHERE goal_id = $1 ORDER BY recorded_on DESC, created_at DESC",
        )
        .bind(goal_id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(GoalProgressHistory {
            goal: GoalView::new(goal, Utc::now().date_naive()),
            entries,
        }))
    }

    /// Recompute a tracked goal from logged activity over [start_date, min(end_date, today)].
    /// Manually tracked goals are returned unchanged.
    pub async fn sync_progress(&self, goal: Goal, today: NaiveDate) -> Result<Goal> {
        if !goal.goal_type.is_tracked() {
            return Ok(goal);
        }

        let value = self
            .tracked_value(goal.user_id, goal.goal_type, goal.start_date, goal.window_end(today))
            .await?;
        if value == goal.current_value {
            return Ok(goal);
        }

        let mut tx = self.db.begin().await?;
        let Some(before) = lock_goal(&mut tx, goal.id, goal.user_id).await? else {
            return Ok(goal);
        };
        if value == before.current_value {
            return Ok(before);
        }

        let after = set_current_value(&mut tx, goal.id, value).await?;
        announce_if_achieved(&mut tx, &before, &after).await?;
        tx.commit().await?;

        Ok(after)
    }

    /// Active goals for a user, with tracked ones brought up to date
    pub async fn active_goal_views(&self, user_id: Uuid, today: NaiveDate) -> Result<Vec<GoalView>> {
        let goals = self
            .list_goals(
                user_id,
                GoalQuery {
                    status: Some(GoalStatus::Active),
                    goal_type: None,
                },
            )
            .await?;

        let mut views = Vec::with_capacity(goals.len());
        for goal in goals {
            let goal = self.sync_progress(goal, today).await?;
            views.push(GoalView::new(goal, today));
        }

        Ok(views)
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<GoalsSummary> {
        let goals = self.list_goals(user_id, GoalQuery::default()).await?;
        Ok(GoalsSummary::from_goals(&goals))
    }

    async fn tracked_value(
        &self,
        user_id: Uuid,
        goal_type: GoalType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<f64> {
        if to < from {
            return Ok(0.0);
        }

        let sql = match goal_type {
            GoalType::Steps => {
                "SELECT COALESCE(SUM(steps), 0)::FLOAT8 FROM step_entries
                 WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3"
            }
            GoalType::CaloriesBurned => {
                "SELECT COALESCE(SUM(calories_burned), 0)::FLOAT8 FROM workouts
                 WHERE user_id = $1 AND performed_on BETWEEN $2 AND $3"
            }
            GoalType::Workouts => {
                "SELECT COUNT(*)::FLOAT8 FROM workouts
                 WHERE user_id = $1 AND performed_on BETWEEN $2 AND $3"
            }
            GoalType::Distance => {
                "SELECT COALESCE(SUM(distance_km), 0)::FLOAT8 FROM workouts
                 WHERE user_id = $1 AND performed_on BETWEEN $2 AND $3"
            }
            GoalType::ActiveMinutes => {
                "SELECT COALESCE(SUM(duration_minutes), 0)::FLOAT8 FROM workouts
                 WHERE user_id = $1 AND performed_on BETWEEN $2 AND $3"
            }
            GoalType::Weight | GoalType::Custom => return Ok(0.0),
        };

        let value = sqlx::query_scalar::<_, f64>(sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_one(&self.db)
            .await?;

        Ok(value)
    }
}

/// Row lock held until the caller's transaction ends, so concurrent writers
/// see each other's `achieved_at`
async fn lock_goal(conn: &mut PgConnection, goal_id: Uuid, user_id: Uuid) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(goal)
}

/// Logs `goal_achieved` when this write is the one that set `achieved_at`
async fn announce_if_achieved(conn: &mut PgConnection, before: &Goal, after: &Goal) -> Result<()> {
    if before.achieved_at.is_none() && after.achieved_at.is_some() {
        insert_notification(conn, NewNotification::goal_achieved(after.user_id, &after.title)).await?;
        tracing::info!("Goal {} achieved by user {}", after.id, after.user_id);
    }
    Ok(())
}

/// Active goals reaching their target become completed; `achieved_at` is set once
async fn set_current_value(conn: &mut PgConnection, goal_id: Uuid, value: f64) -> Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>(
        r#"
        UPDATE goals SET
            current_value = $2,
            status = CASE
                WHEN status = 'active' AND $2 >= target_value THEN 'completed'::goal_status
                ELSE status
            END,
            achieved_at = CASE
                WHEN achieved_at IS NULL AND status = 'active' AND $2 >= target_value THEN NOW()
                ELSE achieved_at
            END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(goal_id)
    .bind(value)
    .fetch_one(conn)
    .await?;

    Ok(goal)
}
