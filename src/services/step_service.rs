use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::calculator::StepConversion;
use crate::models::{
    DailyStepSummary, NewNotification, RecordStepsRequest, StepEntry, StepRecordMode, StepStats,
    DEFAULT_DAILY_STEP_TARGET,
};
use crate::services::notification_service::insert_notification;
use crate::services::UserService;

#[derive(Clone)]
pub struct StepService {
    db: PgPool,
    users: UserService,
}

impl StepService {
    pub fn new(db: PgPool) -> Self {
        Self {
            users: UserService::new(db.clone()),
            db,
        }
    }

    /// Upsert the day's count; `add` increments, `set` replaces
    pub async fn record_steps(&self, user_id: Uuid, request: RecordStepsRequest) -> Result<DailyStepSummary> {
        let date = request.date.unwrap_or_else(|| Utc::now().date_naive());

        let sql = match request.mode {
            StepRecordMode::Set => {
                r#"
                INSERT INTO step_entries (user_id, entry_date, steps)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, entry_date) DO UPDATE SET
                    steps = EXCLUDED.steps,
                    updated_at = NOW()
                RETURNING *
                "#
            }
            StepRecordMode::Add => {
                r#"
                INSERT INTO step_entries (user_id, entry_date, steps)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, entry_date) DO UPDATE SET
                    steps = LEAST(step_entries.steps::BIGINT + EXCLUDED.steps, 2147483647)::INTEGER,
                    updated_at = NOW()
                RETURNING *
                "#
            }
        };

        let entry = sqlx::query_as::<_, StepEntry>(sql)
            .bind(user_id)
            .bind(date)
            .bind(request.steps)
            .fetch_one(&self.db)
            .await?;

        let (conversion, target) = self.profile(user_id).await?;
        let summary = DailyStepSummary::new(date, i64::from(entry.steps), target, &conversion);

        if summary.target_reached && !entry.target_notified {
            self.notify_target_reached(user_id, date, summary.steps, target).await?;
        }

        Ok(summary)
    }

    /// A day without an entry reads as zero steps
    pub async fn get_day(&self, user_id: Uuid, date: NaiveDate) -> Result<DailyStepSummary> {
        let steps = sqlx::query_scalar::<_, i32>(
            "SELECT steps FROM step_entries WHERE user_id = $1 AND entry_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?
        .unwrap_or(0);

        let (conversion, target) = self.profile(user_id).await?;
        Ok(DailyStepSummary::new(date, i64::from(steps), target, &conversion))
    }

    /// Recorded days in the inclusive range, oldest first
    pub async fn history(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> Result<Vec<StepEntry>> {
        let entries = sqlx::query_as::<_, StepEntry>(
            r#"
            SELECT * FROM step_entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            ORDER BY entry_date
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    pub async fn stats(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> Result<StepStats> {
        let entries = self.history(user_id, from, to).await?;
        let (conversion, _) = self.profile(user_id).await?;

        Ok(StepStats::from_entries(from, to, entries, &conversion))
    }

    pub async fn delete_day(&self, user_id: Uuid, date: NaiveDate) -> Result<bool> {
        let result = sqlx::query("DELETE FROM step_entries WHERE user_id = $1 AND entry_date = $2")
            .bind(user_id)
            .bind(date)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn total_steps(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(steps), 0)::BIGINT FROM step_entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    async fn profile(&self, user_id: Uuid) -> Result<(StepConversion, i32)> {
        Ok(match self.users.get_user_by_id(user_id).await? {
            Some(user) => (user.step_conversion(), user.daily_step_target),
            None => (StepConversion::default(), DEFAULT_DAILY_STEP_TARGET),
        })
    }

    async fn notify_target_reached(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        steps: i64,
        target: i32,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        // Only the request that flips the flag notifies
        let claimed = sqlx::query(
            r#"
            UPDATE step_entries SET target_notified = TRUE
            WHERE user_id = $1 AND entry_date = $2 AND NOT target_notified
            "#,
        )
        .bind(user_id)
        .bind(date)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if claimed {
            insert_notification(
                &mut tx,
                NewNotification::step_target_reached(user_id, date, steps, target),
            )
            .await?;
            tx.commit().await?;
            tracing::info!("User {} reached the step target for {}", user_id, date);
        }

        Ok(())
    }
}
