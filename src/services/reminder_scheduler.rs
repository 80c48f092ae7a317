use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::models::ReminderSettings;
use crate::services::{Mailer, NotificationService, UserService};

/// Sends each user's daily reminder once their reminder time has passed
#[derive(Clone)]
pub struct ReminderDispatcher {
    notifications: NotificationService,
    users: UserService,
    mailer: Option<Mailer>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReminderRunStats {
    pub sent: usize,
    pub emailed: usize,
    pub failed: usize,
}

impl ReminderDispatcher {
    pub fn new(db: PgPool, mailer: Option<Mailer>) -> Self {
        Self {
            notifications: NotificationService::new(db.clone()),
            users: UserService::new(db),
            mailer,
        }
    }

    /// One pass over due reminders. A tick that was missed is caught up here,
    /// and the per-day claim keeps a reminder from firing twice.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<ReminderRunStats> {
        let due = self.notifications.due_reminders(now).await?;
        let mut stats = ReminderRunStats::default();

        for settings in due {
            match self.send_reminder(&settings, now).await {
                Ok(Some(emailed)) => {
                    stats.sent += 1;
                    if emailed {
                        stats.emailed += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    stats.failed += 1;
                    error!("Failed to send reminder to user {}: {:#}", settings.user_id, err);
                }
            }
        }

        Ok(stats)
    }

    /// `None` when another run already sent today's reminder
    async fn send_reminder(&self, settings: &ReminderSettings, now: DateTime<Utc>) -> Result<Option<bool>> {
        let Some(notification) = self
            .notifications
            .log_daily_reminder(settings, now.date_naive())
            .await?
        else {
            return Ok(None);
        };

        let Some(mailer) = self.mailer.as_ref().filter(|_| settings.email_enabled) else {
            return Ok(Some(false));
        };

        let Some(user) = self.users.get_user_by_id(settings.user_id).await? else {
            return Ok(Some(false));
        };

        mailer
            .send(&user.email, &notification.title, &notification.message)
            .await?;
        self.notifications.mark_emailed(notification.id).await?;

        Ok(Some(true))
    }
}

/// The single background job of the service
pub struct ReminderScheduler {
    scheduler: JobScheduler,
    dispatcher: ReminderDispatcher,
    schedule: String,
}

impl ReminderScheduler {
    pub async fn new(db: PgPool, mailer: Option<Mailer>, schedule: &str) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create job scheduler: {}", e))?;

        Ok(Self {
            scheduler,
            dispatcher: ReminderDispatcher::new(db, mailer),
            schedule: schedule.to_string(),
        })
    }

    pub async fn start(&self) -> Result<()> {
        let dispatcher = self.dispatcher.clone();

        let job = Job::new_async(self.schedule.as_str(), move |_uuid, _l| {
            let dispatcher = dispatcher.clone();

            Box::pin(async move {
                match dispatcher.run_once(Utc::now()).await {
                    Ok(stats) if stats.sent > 0 || stats.failed > 0 => {
                        info!(
                            "Reminder run: {} sent, {} emailed, {} failed",
                            stats.sent, stats.emailed, stats.failed
                        );
                    }
                    Ok(_) => {}
                    Err(err) => error!("Reminder run failed: {:#}", err),
                }
            })
        })
        .map_err(|e| anyhow!("Invalid reminder schedule {:?}: {}", self.schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add reminder job: {}", e))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start job scheduler: {}", e))?;

        info!("Reminder scheduler started with schedule {}", self.schedule);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| anyhow!("Failed to stop job scheduler: {}", e))?;

        info!("Reminder scheduler stopped");
        Ok(())
    }
}
