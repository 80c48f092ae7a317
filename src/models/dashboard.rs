use chrono::NaiveDate;
use serde::Serialize;

use super::{DailyNutritionSummary, DailyStepSummary, GoalView};

#[derive(Debug, Clone, Serialize)]
pub struct DailyWorkoutTotals {
    pub workouts: i64,
    pub minutes: i64,
    pub calories: f64,
}

/// Everything the home screen shows for one day
#[derive(Debug, Serialize)]
pub struct DailyOverview {
    pub date: NaiveDate,
    pub steps: DailyStepSummary,
    pub workouts: DailyWorkoutTotals,
    pub nutrition: DailyNutritionSummary,
    pub calories_burned: f64,
    pub net_calories: f64,
    pub active_goals: Vec<GoalView>,
    pub unread_notifications: i64,
}

impl DailyOverview {
    pub fn new(
        date: NaiveDate,
        steps: DailyStepSummary,
        workouts: DailyWorkoutTotals,
        nutrition: DailyNutritionSummary,
        active_goals: Vec<GoalView>,
        unread_notifications: i64,
    ) -> Self {
        let calories_burned = round1(workouts.calories + steps.calories);
        let net_calories = round1(nutrition.total_calories - calories_burned);

        Self {
            date,
            steps,
            workouts,
            nutrition,
            calories_burned,
            net_calories,
            active_goals,
            unread_notifications,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
