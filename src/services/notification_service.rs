use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{
    NewNotification, Notification, NotificationQuery, ReminderSettings,
    UpdateReminderSettingsRequest,
};

#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

impl NotificationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Newest first
    pub async fn list(&self, user_id: Uuid, query: NotificationQuery) -> Result<Vec<Notification>> {
        let limit = query.limit.unwrap_or(50).clamp(1, 100);
        let offset = query.offset.unwrap_or(0).max(0);

        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(query.unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Keeps the first read time when called again
    pub async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_emailed(&self, notification_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE notifications SET emailed = TRUE WHERE id = $1")
            .bind(notification_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Creates the default row for accounts that predate reminder settings
    pub async fn get_reminder_settings(&self, user_id: Uuid) -> Result<ReminderSettings> {
        sqlx::query("INSERT INTO reminder_settings (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        let settings = sqlx::query_as::<_, ReminderSettings>(
            "SELECT * FROM reminder_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(settings)
    }

    pub async fn update_reminder_settings(
        &self,
        user_id: Uuid,
        request: UpdateReminderSettingsRequest,
    ) -> Result<ReminderSettings> {
        let reminder_time = request.parsed_time()?;

        let settings = sqlx::query_as::<_, ReminderSettings>(
            r#"
            INSERT INTO reminder_settings (user_id, enabled, reminder_time, message, email_enabled)
            VALUES (
                $1,
                COALESCE($2, FALSE),
                COALESCE($3, TIME '08:00'),
                COALESCE($4, 'Time to move! Log a workout or go for a walk today.'),
                COALESCE($5, FALSE)
            )
            ON CONFLICT (user_id) DO UPDATE SET
                enabled = COALESCE($2, reminder_settings.enabled),
                reminder_time = COALESCE($3, reminder_settings.reminder_time),
                message = COALESCE($4, reminder_settings.message),
                email_enabled = COALESCE($5, reminder_settings.email_enabled),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(request.enabled)
        .bind(reminder_time)
        .bind(request.message.as_deref().map(str::trim))
        .bind(request.email_enabled)
        .fetch_one(&self.db)
        .await?;

        Ok(settings)
    }

    /// Enabled reminders whose time has passed today and that have not fired today
    pub async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<ReminderSettings>> {
        let candidates = sqlx::query_as::<_, ReminderSettings>(
            r#"
            SELECT * FROM reminder_settings
            WHERE enabled AND (last_sent_on IS NULL OR last_sent_on < $1)
            "#,
        )
        .bind(now.date_naive())
        .fetch_all(&self.db)
        .await?;

        Ok(candidates
            .into_iter()
            .filter(|settings| settings.is_due(now))
            .collect())
    }

    /// Claims today's reminder and logs its notification in one transaction.
    /// `None` when another run already claimed the day.
    pub async fn log_daily_reminder(
        &self,
        settings: &ReminderSettings,
        today: NaiveDate,
    ) -> Result<Option<Notification>> {
        let mut tx = self.db.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE reminder_settings SET last_sent_on = $2
            WHERE user_id = $1 AND (last_sent_on IS NULL OR last_sent_on < $2)
            "#,
        )
        .bind(settings.user_id)
        .bind(today)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !claimed {
            return Ok(None);
        }

        let notification = insert_notification(
            &mut tx,
            NewNotification::daily_reminder(settings.user_id, &settings.message),
        )
        .await?;
        tx.commit().await?;

        Ok(Some(notification))
    }
}

/// Runs on the caller's connection so the insert can share its transaction
pub async fn insert_notification(
    conn: &mut PgConnection,
    notification: NewNotification,
) -> Result<Notification> {
    let created = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (id, user_id, kind, title, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(notification.user_id)
    .bind(notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .fetch_one(conn)
    .await?;

    tracing::debug!("Created {:?} notification for user {}", created.kind, created.user_id);
    Ok(created)
}
