use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::calculator::{progress_percentage, StepConversion};
use crate::models::validation::{ensure_not_future, ValidationError, ValidationResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StepEntry {
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub steps: i32,
    #[serde(skip_serializing)]
    pub target_notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRecordMode {
    /// Replace the day's count (a pedometer reading)
    #[default]
    Set,
    /// Add to the day's count
    Add,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordStepsRequest {
    pub steps: i32,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub mode: StepRecordMode,
}

impl RecordStepsRequest {
    pub fn validate(&self, today: NaiveDate) -> ValidationResult {
        if self.steps < 0 {
            return Err(ValidationError::new("steps", "cannot be negative"));
        }
        if self.steps > 200_000 {
            return Err(ValidationError::new("steps", "cannot exceed 200000 per day"));
        }
        ensure_not_future("date", self.date.unwrap_or(today), today)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStepSummary {
    pub date: NaiveDate,
    pub steps: i64,
    pub distance_km: f64,
    pub calories: f64,
    pub target: i32,
    pub progress_percentage: f64,
    pub target_reached: bool,
}

impl DailyStepSummary {
    pub fn new(date: NaiveDate, steps: i64, target: i32, conversion: &StepConversion) -> Self {
        Self {
            date,
            steps,
            distance_km: round2(conversion.distance_km(steps)),
            calories: round2(conversion.calories(steps)),
            target,
            progress_percentage: progress_percentage(steps as f64, target as f64),
            target_reached: target > 0 && steps >= i64::from(target),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepStats {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days_recorded: usize,
    pub total_steps: i64,
    pub daily_average: f64,
    pub total_distance_km: f64,
    pub total_calories: f64,
    pub best_day: Option<StepEntry>,
}

impl StepStats {
    /// Average is taken over every day of the range, not only recorded ones
    pub fn from_entries(
        from: NaiveDate,
        to: NaiveDate,
        entries: Vec<StepEntry>,
        conversion: &StepConversion,
    ) -> Self {
        let total_steps: i64 = entries.iter().map(|e| i64::from(e.steps)).sum();
        let days_in_range = (to - from).num_days() + 1;
        let daily_average = if days_in_range > 0 {
            round2(total_steps as f64 / days_in_range as f64)
        } else {
            0.0
        };
        let days_recorded = entries.len();
        let best_day = entries.into_iter().max_by_key(|e| e.steps);

        Self {
            from,
            to,
            days_recorded,
            total_steps,
            daily_average,
            total_distance_km: round2(conversion.distance_km(total_steps)),
            total_calories: round2(conversion.calories(total_steps)),
            best_day,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u32, steps: i32) -> StepEntry {
        let now = Utc::now();
        StepEntry {
            user_id: Uuid::nil(),
            entry_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            steps,
            target_notified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_daily_summary() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let summary = DailyStepSummary::new(date, 5_000, 10_000, &StepConversion::default());

        assert_eq!(summary.distance_km, 3.81);
        assert_eq!(summary.calories, 200.0);
        assert_eq!(summary.progress_percentage, 50.0);
        assert!(!summary.target_reached);

        let summary = DailyStepSummary::new(date, 12_000, 10_000, &StepConversion::default());
        assert_eq!(summary.progress_percentage, 100.0);
        assert!(summary.target_reached);
    }

    #[test]
    fn test_stats_over_range() {
        let from = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        let stats = StepStats::from_entries(
            from,
            to,
            vec![entry(1, 4_000), entry(2, 9_000), entry(4, 3_000)],
            &StepConversion::default(),
        );

        assert_eq!(stats.total_steps, 16_000);
        assert_eq!(stats.days_recorded, 3);
        assert_eq!(stats.daily_average, 4_000.0);
        assert_eq!(stats.best_day.unwrap().steps, 9_000);
    }

    #[test]
    fn test_record_validation() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut request = RecordStepsRequest {
            steps: 8_000,
            date: None,
            mode: StepRecordMode::Set,
        };
        assert!(request.validate(today).is_ok());

        request.steps = -1;
        assert_eq!(request.validate(today).unwrap_err().field, "steps");

        request.steps = 100;
        request.date = NaiveDate::from_ymd_opt(2024, 5, 11);
        assert_eq!(request.validate(today).unwrap_err().field, "date");
    }

    #[test]
    fn test_mode_defaults_to_set() {
        let request: RecordStepsRequest =
            serde_json::from_value(serde_json::json!({ "steps": 120 })).unwrap();
        assert_eq!(request.mode, StepRecordMode::Set);

        let request: RecordStepsRequest =
            serde_json::from_value(serde_json::json!({ "steps": 120, "mode": "add" })).unwrap();
        assert_eq!(request.mode, StepRecordMode::Add);
    }
}
