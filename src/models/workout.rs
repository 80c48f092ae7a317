use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::validation::{ensure_non_negative, ensure_positive, ValidationError, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "workout_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Running,
    Cycling,
    Swimming,
    Walking,
    Hiking,
    StrengthTraining,
    Yoga,
    Hiit,
    Dancing,
    Rowing,
    Other,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 11] = [
        WorkoutType::Running,
        WorkoutType::Cycling,
        WorkoutType::Swimming,
        WorkoutType::Walking,
        WorkoutType::Hiking,
        WorkoutType::StrengthTraining,
        WorkoutType::Yoga,
        WorkoutType::Hiit,
        WorkoutType::Dancing,
        WorkoutType::Rowing,
        WorkoutType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
            WorkoutType::Swimming => "swimming",
            WorkoutType::Walking => "walking",
            WorkoutType::Hiking => "hiking",
            WorkoutType::StrengthTraining => "strength_training",
            WorkoutType::Yoga => "yoga",
            WorkoutType::Hiit => "hiit",
            WorkoutType::Dancing => "dancing",
            WorkoutType::Rowing => "rowing",
            WorkoutType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Type)]
#[sqlx(type_name = "workout_intensity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    #[default]
    Moderate,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_type: WorkoutType,
    pub intensity: Intensity,
    pub duration_minutes: i32,
    pub calories_burned: f64,
    pub distance_km: Option<f64>,
    pub performed_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkoutRequest {
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub intensity: Intensity,
    pub duration_minutes: i32,
    /// Estimated from the MET table when omitted
    pub calories_burned: Option<f64>,
    pub distance_km: Option<f64>,
    pub performed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateWorkoutRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_duration(self.duration_minutes)?;
        validate_measurements(self.calories_burned, self.distance_km)?;
        validate_notes(self.notes.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub workout_type: Option<WorkoutType>,
    pub intensity: Option<Intensity>,
    pub duration_minutes: Option<i32>,
    pub calories_burned: Option<f64>,
    pub distance_km: Option<f64>,
    pub performed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UpdateWorkoutRequest {
    pub fn validate(&self) -> ValidationResult {
        if let Some(duration) = self.duration_minutes {
            validate_duration(duration)?;
        }
        validate_measurements(self.calories_burned, self.distance_km)?;
        validate_notes(self.notes.as_deref())
    }

    /// Whether the change invalidates a previously estimated calorie count
    pub fn affects_calorie_estimate(&self) -> bool {
        self.calories_burned.is_none()
            && (self.workout_type.is_some()
                || self.intensity.is_some()
                || self.duration_minutes.is_some())
    }
}

fn validate_duration(duration_minutes: i32) -> ValidationResult {
    if duration_minutes <= 0 {
        return Err(ValidationError::new(
            "duration_minutes",
            "must be greater than zero",
        ));
    }
    if duration_minutes > 24 * 60 {
        return Err(ValidationError::new(
            "duration_minutes",
            "cannot exceed 24 hours",
        ));
    }
    Ok(())
}

fn validate_measurements(calories: Option<f64>, distance_km: Option<f64>) -> ValidationResult {
    if let Some(calories) = calories {
        ensure_non_negative("calories_burned", calories)?;
    }
    if let Some(distance) = distance_km {
        ensure_non_negative("distance_km", distance)?;
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> ValidationResult {
    match notes {
        Some(notes) if notes.chars().count() > 2000 => Err(ValidationError::new(
            "notes",
            "cannot be longer than 2000 characters",
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutQuery {
    pub workout_type: Option<WorkoutType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRangeQuery {
    pub fn validate(&self) -> ValidationResult {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(ValidationError::new("to", "cannot be before from"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WorkoutTypeBreakdown {
    pub workout_type: WorkoutType,
    pub workouts: i64,
    pub minutes: i64,
    pub calories: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total_workouts: i64,
    pub total_minutes: i64,
    pub total_calories: f64,
    pub total_distance_km: f64,
    pub by_type: Vec<WorkoutTypeBreakdown>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateCaloriesRequest {
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub intensity: Intensity,
    pub duration_minutes: f64,
    /// Falls back to the caller's profile weight, then the reference weight
    pub weight_kg: Option<f64>,
}

impl EstimateCaloriesRequest {
    pub fn validate(&self) -> ValidationResult {
        ensure_positive("duration_minutes", self.duration_minutes)?;
        if let Some(weight) = self.weight_kg {
            ensure_positive("weight_kg", weight)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CalorieEstimate {
    pub workout_type: WorkoutType,
    pub intensity: Intensity,
    pub met: f64,
    pub weight_kg: f64,
    pub duration_minutes: f64,
    pub calories: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            workout_type: WorkoutType::Running,
            intensity: Intensity::Moderate,
            duration_minutes: 30,
            calories_burned: None,
            distance_km: Some(5.0),
            performed_on: None,
            notes: None,
        }
    }

    #[test]
    fn test_create_validation() {
        assert!(create_request().validate().is_ok());

        let mut request = create_request();
        request.duration_minutes = 0;
        assert_eq!(request.validate().unwrap_err().field, "duration_minutes");

        let mut request = create_request();
        request.calories_burned = Some(-5.0);
        assert_eq!(request.validate().unwrap_err().field, "calories_burned");

        let mut request = create_request();
        request.distance_km = Some(-1.0);
        assert_eq!(request.validate().unwrap_err().field, "distance_km");
    }

    #[test]
    fn test_intensity_defaults_to_moderate() {
        let request: CreateWorkoutRequest = serde_json::from_value(serde_json::json!({
            "workout_type": "strength_training",
            "duration_minutes": 45
        }))
        .unwrap();

        assert_eq!(request.workout_type, WorkoutType::StrengthTraining);
        assert_eq!(request.intensity, Intensity::Moderate);
    }

    #[test]
    fn test_update_affects_estimate() {
        let update = UpdateWorkoutRequest {
            duration_minutes: Some(40),
            ..Default::default()
        };
        assert!(update.affects_calorie_estimate());

        let update = UpdateWorkoutRequest {
            duration_minutes: Some(40),
            calories_burned: Some(300.0),
            ..Default::default()
        };
        assert!(!update.affects_calorie_estimate());

        let update = UpdateWorkoutRequest {
            notes: Some("felt good".to_string()),
            ..Default::default()
        };
        assert!(!update.affects_calorie_estimate());
    }

    #[test]
    fn test_workout_type_names_match_serde() {
        for workout_type in WorkoutType::ALL {
            let json = serde_json::to_value(workout_type).unwrap();
            assert_eq!(json, serde_json::Value::String(workout_type.as_str().to_string()));
        }
    }
}
