use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::validation::{ensure_non_negative, ensure_not_blank, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "meal_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub consumed_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFoodEntryRequest {
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub consumed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateFoodEntryRequest {
    pub fn validate(&self) -> ValidationResult {
        ensure_not_blank("name", &self.name, 255)?;
        ensure_non_negative("calories", self.calories)?;
        validate_macros(self.protein_g, self.carbs_g, self.fat_g)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFoodEntryRequest {
    pub name: Option<String>,
    pub meal_type: Option<MealType>,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub consumed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UpdateFoodEntryRequest {
    pub fn validate(&self) -> ValidationResult {
        if let Some(name) = &self.name {
            ensure_not_blank("name", name, 255)?;
        }
        if let Some(calories) = self.calories {
            ensure_non_negative("calories", calories)?;
        }
        validate_macros(self.protein_g, self.carbs_g, self.fat_g)
    }
}

fn validate_macros(protein: Option<f64>, carbs: Option<f64>, fat: Option<f64>) -> ValidationResult {
    for (field, value) in [("protein_g", protein), ("carbs_g", carbs), ("fat_g", fat)] {
        if let Some(value) = value {
            ensure_non_negative(field, value)?;
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealBreakdown {
    pub meal_type: MealType,
    pub entries: usize,
    pub calories: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyNutritionSummary {
    pub date: NaiveDate,
    pub entry_count: usize,
    pub total_calories: f64,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub by_meal: Vec<MealBreakdown>,
}

impl DailyNutritionSummary {
    pub fn from_entries(date: NaiveDate, entries: &[FoodEntry]) -> Self {
        let by_meal = [MealType::Breakfast, MealType::Lunch, MealType::Dinner, MealType::Snack]
            .into_iter()
            .filter_map(|meal_type| {
                let meals: Vec<&FoodEntry> =
                    entries.iter().filter(|e| e.meal_type == meal_type).collect();
                if meals.is_empty() {
                    return None;
                }
                Some(MealBreakdown {
                    meal_type,
                    entries: meals.len(),
                    calories: meals.iter().map(|e| e.calories).sum(),
                })
            })
            .collect();

        Self {
            date,
            entry_count: entries.len(),
            total_calories: entries.iter().map(|e| e.calories).sum(),
            total_protein_g: entries.iter().filter_map(|e| e.protein_g).sum(),
            total_carbs_g: entries.iter().filter_map(|e| e.carbs_g).sum(),
            total_fat_g: entries.iter().filter_map(|e| e.fat_g).sum(),
            by_meal,
        }
    }
}
