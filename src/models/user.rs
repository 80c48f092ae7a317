use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::calculator::{body_mass_index, StepConversion};
use crate::models::validation::{ensure_not_blank, ensure_range, ValidationError, ValidationResult};

pub const DEFAULT_DAILY_STEP_TARGET: i32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub stride_length_cm: Option<f64>,
    pub daily_step_target: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Step conversion personalised with the user's stride and weight
    pub fn step_conversion(&self) -> StepConversion {
        StepConversion::for_profile(self.stride_length_cm, self.weight_kg)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub stride_length_cm: Option<f64>,
    pub daily_step_target: Option<i32>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> ValidationResult {
        if let Some(name) = &self.name {
            ensure_not_blank("name", name, 255)?;
        }
        if let Some(weight) = self.weight_kg {
            ensure_range("weight_kg", weight, 20.0, 400.0)?;
        }
        if let Some(height) = self.height_cm {
            ensure_range("height_cm", height, 50.0, 280.0)?;
        }
        if let Some(stride) = self.stride_length_cm {
            ensure_range("stride_length_cm", stride, 20.0, 200.0)?;
        }
        if let Some(target) = self.daily_step_target {
            if target <= 0 {
                return Err(ValidationError::new(
                    "daily_step_target",
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub stride_length_cm: Option<f64>,
    pub daily_step_target: i32,
    pub bmi: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let bmi = match (user.weight_kg, user.height_cm) {
            (Some(weight), Some(height)) => body_mass_index(weight, height),
            _ => None,
        };

        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            weight_kg: user.weight_kg,
            height_cm: user.height_cm,
            stride_length_cm: user.stride_length_cm,
            daily_step_target: user.daily_step_target,
            bmi,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
