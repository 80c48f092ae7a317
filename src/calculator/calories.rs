//! MET based calorie estimation.
//!
//! Energy cost is `MET × body weight (kg) × duration (h)`. MET values are
//! taken from the Compendium of Physical Activities, collapsed into three
//! intensity bands per activity.

use thiserror::Error;

use crate::models::{Intensity, WorkoutType};

/// Body weight used when the user has not recorded one
pub const REFERENCE_WEIGHT_KG: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("duration must be a positive number of minutes")]
    InvalidDuration,
    #[error("weight must be a positive number of kilograms")]
    InvalidWeight,
}

/// Tabulated MET constant for an activity at a given intensity
pub fn met_value(workout_type: WorkoutType, intensity: Intensity) -> f64 {
    // (low, moderate, high)
    let (low, moderate, high) = match workout_type {
        WorkoutType::Running => (7.0, 9.8, 11.5),
        WorkoutType::Cycling => (4.0, 8.0, 10.0),
        WorkoutType::Swimming => (6.0, 8.3, 10.0),
        WorkoutType::Walking => (2.8, 3.5, 5.0),
        WorkoutType::Hiking => (5.3, 6.0, 7.8),
        WorkoutType::StrengthTraining => (3.5, 5.0, 6.0),
        WorkoutType::Yoga => (2.5, 3.0, 4.0),
        WorkoutType::Hiit => (6.0, 8.0, 10.0),
        WorkoutType::Dancing => (4.5, 5.5, 7.8),
        WorkoutType::Rowing => (4.8, 7.0, 8.5),
        WorkoutType::Other => (3.0, 4.0, 6.0),
    };

    match intensity {
        Intensity::Low => low,
        Intensity::Moderate => moderate,
        Intensity::High => high,
    }
}

/// Estimated kilocalories, rounded to one decimal
pub fn estimate_calories(
    workout_type: WorkoutType,
    intensity: Intensity,
    duration_minutes: f64,
    weight_kg: f64,
) -> Result<f64, CalculationError> {
    if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
        return Err(CalculationError::InvalidDuration);
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(CalculationError::InvalidWeight);
    }

    let met = met_value(workout_type, intensity);
    let calories = met * weight_kg * (duration_minutes / 60.0);

    Ok((calories * 10.0).round() / 10.0)
}
