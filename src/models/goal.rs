use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::calculator::{days_remaining, is_achieved, progress_percentage};
use crate::models::validation::{
    ensure_date_order, ensure_non_negative, ensure_not_blank, ensure_positive, ValidationResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "goal_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Steps,          // Total steps over the goal window
    CaloriesBurned, // Calories burned by logged workouts
    Workouts,       // Number of logged workouts
    Distance,       // Workout distance in km
    ActiveMinutes,  // Workout duration in minutes
    Weight,         // Manually tracked body weight
    Custom,         // User-defined, manually tracked
}

impl GoalType {
    pub fn default_unit(&self) -> Option<&'static str> {
        match self {
            GoalType::Steps => Some("steps"),
            GoalType::CaloriesBurned => Some("kcal"),
            GoalType::Workouts => Some("workouts"),
            GoalType::Distance => Some("km"),
            GoalType::ActiveMinutes => Some("minutes"),
            GoalType::Weight => Some("kg"),
            GoalType::Custom => None,
        }
    }

    /// Goals whose progress can be derived from logged activity
    pub fn is_tracked(&self) -> bool {
        !matches!(self, GoalType::Weight | GoalType::Custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "goal_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: GoalStatus,
    pub achieved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.current_value, self.target_value)
    }

    pub fn is_achieved(&self) -> bool {
        is_achieved(self.current_value, self.target_value)
    }

    /// Last day counted towards tracked progress
    pub fn window_end(&self, today: NaiveDate) -> NaiveDate {
        match self.end_date {
            Some(end) if end < today => end,
            _ => today,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

const UNIT_MAX_LEN: usize = 32;

impl CreateGoalRequest {
    pub fn validate(&self, today: NaiveDate) -> ValidationResult {
        ensure_not_blank("title", &self.title, 255)?;
        if let Some(unit) = &self.unit {
            ensure_not_blank("unit", unit, UNIT_MAX_LEN)?;
        }
        ensure_positive("target_value", self.target_value)?;
        ensure_date_order(self.start_date.unwrap_or(today), self.end_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_value: Option<f64>,
    pub unit: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<GoalStatus>,
}

impl UpdateGoalRequest {
    pub fn validate(&self, start_date: NaiveDate) -> ValidationResult {
        if let Some(title) = &self.title {
            ensure_not_blank("title", title, 255)?;
        }
        if let Some(unit) = &self.unit {
            ensure_not_blank("unit", unit, UNIT_MAX_LEN)?;
        }
        if let Some(target) = self.target_value {
            ensure_positive("target_value", target)?;
        }
        ensure_date_order(start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GoalProgress {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub value: f64,
    pub recorded_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordProgressRequest {
    /// New absolute value of the goal metric
    pub value: f64,
    pub recorded_on: Option<NaiveDate>,
    pub note: Option<String>,
}

impl RecordProgressRequest {
    pub fn validate(&self) -> ValidationResult {
        ensure_non_negative("value", self.value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalQuery {
    pub status: Option<GoalStatus>,
    pub goal_type: Option<GoalType>,
}

/// Goal with its derived progress figures
#[derive(Debug, Clone, Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress_percentage: f64,
    pub achieved: bool,
    pub days_remaining: Option<i64>,
}

impl GoalView {
    pub fn new(goal: Goal, today: NaiveDate) -> Self {
        let progress_percentage = goal.progress_percentage();
        let achieved = goal.is_achieved();
        let days_remaining = goal.end_date.map(|end| days_remaining(end, today));

        Self {
            goal,
            progress_percentage,
            achieved,
            days_remaining,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GoalProgressHistory {
    pub goal: GoalView,
    pub entries: Vec<GoalProgress>,
}

#[derive(Debug, Serialize)]
pub struct GoalsSummary {
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub paused_goals: usize,
    pub cancelled_goals: usize,
    pub completion_rate: f64,
}

impl GoalsSummary {
    pub fn from_goals(goals: &[Goal]) -> Self {
        let count = |status: GoalStatus| goals.iter().filter(|g| g.status == status).count();

        let total_goals = goals.len();
        let completed_goals = count(GoalStatus::Completed);
        let completion_rate = if total_goals > 0 {
            (completed_goals as f64 / total_goals as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total_goals,
            active_goals: count(GoalStatus::Active),
            completed_goals,
            paused_goals: count(GoalStatus::Paused),
            cancelled_goals: count(GoalStatus::Cancelled),
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(current: f64, target: f64, status: GoalStatus) -> Goal {
        let now = Utc::now();
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Walk more".to_string(),
            description: None,
            goal_type: GoalType::Steps,
            target_value: target,
            current_value: current,
            unit: Some("steps".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()),
            status,
            achieved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_goal_view_progress() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 21).unwrap();
        let view = GoalView::new(goal(50_000.0, 200_000.0, GoalStatus::Active), today);

        assert_eq!(view.progress_percentage, 25.0);
        assert!(!view.achieved);
        assert_eq!(view.days_remaining, Some(10));
    }

    #[test]
    fn test_goal_view_serializes_flat() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 21).unwrap();
        let view = GoalView::new(goal(250.0, 200.0, GoalStatus::Completed), today);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["title"], "Walk more");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["progress_percentage"], 100.0);
        assert_eq!(json["achieved"], true);
    }

    #[test]
    fn test_window_end_caps_at_end_date() {
        let g = goal(0.0, 1.0, GoalStatus::Active);
        let during = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        assert_eq!(g.window_end(during), during);
        assert_eq!(g.window_end(after), NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
    }

    #[test]
    fn test_create_validation() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut request = CreateGoalRequest {
            title: "10k steps".to_string(),
            description: None,
            goal_type: GoalType::Steps,
            target_value: 10_000.0,
            unit: None,
            start_date: None,
            end_date: Some(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()),
        };
        assert!(request.validate(today).is_ok());

        request.target_value = 0.0;
        assert_eq!(request.validate(today).unwrap_err().field, "target_value");

        request.target_value = 10.0;
        request.end_date = Some(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(request.validate(today).unwrap_err().field, "end_date");
    }

    #[test]
    fn test_unit_length_is_bounded() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut request = CreateGoalRequest {
            title: "Swim".to_string(),
            description: None,
            goal_type: GoalType::Custom,
            target_value: 20.0,
            unit: Some("x".repeat(32)),
            start_date: None,
            end_date: None,
        };
        assert!(request.validate(today).is_ok());

        request.unit = Some("x".repeat(40));
        assert_eq!(request.validate(today).unwrap_err().field, "unit");

        let update = UpdateGoalRequest {
            unit: Some("x".repeat(40)),
            ..Default::default()
        };
        assert_eq!(update.validate(today).unwrap_err().field, "unit");

        let blank = UpdateGoalRequest {
            unit: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.validate(today).unwrap_err().field, "unit");
    }

    #[test]
    fn test_summary_completion_rate() {
        let goals = vec![
            goal(1.0, 1.0, GoalStatus::Completed),
            goal(0.0, 1.0, GoalStatus::Active),
            goal(0.0, 1.0, GoalStatus::Active),
            goal(0.0, 1.0, GoalStatus::Cancelled),
        ];
        let summary = GoalsSummary::from_goals(&goals);

        assert_eq!(summary.total_goals, 4);
        assert_eq!(summary.active_goals, 2);
        assert_eq!(summary.completed_goals, 1);
        assert_eq!(summary.cancelled_goals, 1);
        assert_eq!(summary.completion_rate, 25.0);

        assert_eq!(GoalsSummary::from_goals(&[]).completion_rate, 0.0);
    }

    #[test]
    fn test_tracked_goal_types() {
        assert!(GoalType::Steps.is_tracked());
        assert!(GoalType::ActiveMinutes.is_tracked());
        assert!(!GoalType::Weight.is_tracked());
        assert!(!GoalType::Custom.is_tracked());
        assert_eq!(GoalType::Distance.default_unit(), Some("km"));
    }
}
