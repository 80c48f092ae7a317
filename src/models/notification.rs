use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::models::validation::{ensure_not_blank, ValidationError, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DailyReminder,
    GoalAchieved,
    StepTargetReached,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub emailed: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn goal_achieved(user_id: Uuid, goal_title: &str) -> Self {
        Self {
            user_id,
            kind: NotificationKind::GoalAchieved,
            title: "Goal achieved!".to_string(),
            message: format!("Congratulations! You reached your goal \"{}\".", goal_title),
        }
    }

    pub fn step_target_reached(user_id: Uuid, date: NaiveDate, steps: i64, target: i32) -> Self {
        Self {
            user_id,
            kind: NotificationKind::StepTargetReached,
            title: "Daily step target reached".to_string(),
            message: format!(
                "You walked {} steps on {}, beating your target of {}.",
                steps, date, target
            ),
        }
    }

    pub fn daily_reminder(user_id: Uuid, message: &str) -> Self {
        Self {
            user_id,
            kind: NotificationKind::DailyReminder,
            title: "Daily reminder".to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReminderSettings {
    pub user_id: Uuid,
    pub enabled: bool,
    #[serde(serialize_with = "serialize_hhmm")]
    pub reminder_time: NaiveTime,
    pub message: String,
    pub email_enabled: bool,
    pub last_sent_on: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl ReminderSettings {
    /// Due once the reminder time has passed today and nothing was sent yet today
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }

        let today = now.date_naive();
        if self.last_sent_on.map_or(false, |sent| sent >= today) {
            return false;
        }

        now.time() >= self.reminder_time
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReminderSettingsRequest {
    pub enabled: Option<bool>,
    /// `HH:MM`, UTC
    pub reminder_time: Option<String>,
    pub message: Option<String>,
    pub email_enabled: Option<bool>,
}

impl UpdateReminderSettingsRequest {
    pub fn validate(&self) -> ValidationResult {
        if let Some(message) = &self.message {
            ensure_not_blank("message", message, 500)?;
        }
        self.parsed_time().map(|_| ())
    }

    pub fn parsed_time(&self) -> Result<Option<NaiveTime>, ValidationError> {
        self.reminder_time
            .as_deref()
            .map(parse_hhmm)
            .transpose()
    }
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ValidationError::new("reminder_time", "must use the HH:MM format"))
}

fn serialize_hhmm<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings(enabled: bool, last_sent_on: Option<NaiveDate>) -> ReminderSettings {
        ReminderSettings {
            user_id: Uuid::new_v4(),
            enabled,
            reminder_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            message: "Move!".to_string(),
            email_enabled: false,
            last_sent_on,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_reminder_due_after_time() {
        let before = Utc.with_ymd_and_hms(2024, 5, 1, 7, 59, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 15, 30, 0).unwrap();

        let s = settings(true, None);
        assert!(!s.is_due(before));
        assert!(s.is_due(at));
        assert!(s.is_due(later));
    }

    #[test]
    fn test_reminder_fires_once_per_day() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        assert!(settings(true, Some(yesterday)).is_due(now));
        assert!(!settings(true, Some(today)).is_due(now));
    }

    #[test]
    fn test_disabled_reminder_never_due() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
        assert!(!settings(false, None).is_due(now));
    }

    #[test]
    fn test_time_parsing() {
        assert_eq!(
            parse_hhmm("07:45").unwrap(),
            NaiveTime::from_hms_opt(7, 45, 0).unwrap()
        );
        assert!(parse_hhmm("7pm").is_err());
        assert!(parse_hhmm("25:00").is_err());

        let request = UpdateReminderSettingsRequest {
            reminder_time: Some("noon".to_string()),
            ..Default::default()
        };
        assert_eq!(request.validate().unwrap_err().field, "reminder_time");
    }

    #[test]
    fn test_settings_serialize_time_as_hhmm() {
        let json = serde_json::to_value(settings(true, None)).unwrap();
        assert_eq!(json["reminder_time"], "08:00");
    }

    #[test]
    fn test_step_target_message_names_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 28).unwrap();
        let notification = NewNotification::step_target_reached(Uuid::new_v4(), date, 12_345, 10_000);

        assert_eq!(notification.kind, NotificationKind::StepTargetReached);
        assert_eq!(
            notification.message,
            "You walked 12345 steps on 2024-04-28, beating your target of 10000."
        );
    }
}
