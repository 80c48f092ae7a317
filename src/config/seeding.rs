use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::models::*;
use crate::services::*;

pub const DEMO_EMAIL: &str = "demo@fittrack.example";
pub const DEMO_PASSWORD: &str = "DemoPass123!";

/// Demo account with a week of activity, created once
pub struct DatabaseSeeder {
    pool: PgPool,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn seed_all(&self) -> Result<()> {
        let users = UserService::new(self.pool.clone());
        if users.get_user_by_email(DEMO_EMAIL).await?.is_some() {
            tracing::info!("Demo data already present, skipping seeding");
            return Ok(());
        }

        tracing::info!("Starting database seeding...");

        let today = Utc::now().date_naive();
        let user_id = self.seed_user().await?;
        self.seed_workouts(user_id, today).await?;
        self.seed_steps(user_id, today).await?;
        self.seed_goals(user_id, today).await?;
        self.seed_food(user_id, today).await?;

        tracing::info!("Database seeding completed! Demo login: {}", DEMO_EMAIL);
        Ok(())
    }

    async fn seed_user(&self) -> Result<Uuid> {
        let password_hash =
            hash_password(DEMO_PASSWORD).map_err(|e| anyhow!("Failed to hash password: {}", e))?;
        let user_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, weight_kg, height_cm, stride_length_cm)
            VALUES ($1, $2, $3, 'Demo User', 72.5, 178.0, 76.0)
            "#,
        )
        .bind(user_id)
        .bind(DEMO_EMAIL)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO reminder_settings (user_id, enabled) VALUES ($1, TRUE)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(user_id)
    }

    async fn seed_workouts(&self, user_id: Uuid, today: NaiveDate) -> Result<()> {
        let workouts = WorkoutService::new(self.pool.clone());

        let plan = [
            (6, WorkoutType::Running, Intensity::Moderate, 35, Some(6.2)),
            (5, WorkoutType::StrengthTraining, Intensity::High, 45, None),
            (3, WorkoutType::Cycling, Intensity::Low, 60, Some(18.5)),
            (2, WorkoutType::Yoga, Intensity::Low, 30, None),
            (1, WorkoutType::Hiit, Intensity::High, 25, None),
        ];

        for (days_ago, workout_type, intensity, duration_minutes, distance_km) in plan {
            workouts
                .create_workout(
                    user_id,
                    CreateWorkoutRequest {
                        workout_type,
                        intensity,
                        duration_minutes,
                        calories_burned: None,
                        distance_km,
                        performed_on: Some(today - Duration::days(days_ago)),
                        notes: None,
                    },
                )
                .await?;
        }

        tracing::info!("Created demo workouts");
        Ok(())
    }

    async fn seed_steps(&self, user_id: Uuid, today: NaiveDate) -> Result<()> {
        let steps = StepService::new(self.pool.clone());

        let counts = [8_412, 11_230, 6_905, 9_874, 12_560, 7_310, 10_045];
        for (days_ago, count) in counts.into_iter().enumerate() {
            steps
                .record_steps(
                    user_id,
                    RecordStepsRequest {
                        steps: count,
                        date: Some(today - Duration::days(days_ago as i64 + 1)),
                        mode: StepRecordMode::Set,
                    },
                )
                .await?;
        }

        tracing::info!("Created demo step history");
        Ok(())
    }

    async fn seed_goals(&self, user_id: Uuid, today: NaiveDate) -> Result<()> {
        let goals = GoalService::new(self.pool.clone());

        let requests = [
            CreateGoalRequest {
                title: "Walk 300k steps this month".to_string(),
                description: None,
                goal_type: GoalType::Steps,
                target_value: 300_000.0,
                unit: None,
                start_date: Some(today - Duration::days(7)),
                end_date: Some(today + Duration::days(23)),
            },
            CreateGoalRequest {
                title: "Log 12 workouts".to_string(),
                description: Some("Three sessions a week".to_string()),
                goal_type: GoalType::Workouts,
                target_value: 12.0,
                unit: None,
                start_date: Some(today - Duration::days(7)),
                end_date: Some(today + Duration::days(21)),
            },
            CreateGoalRequest {
                title: "Reach 70 kg".to_string(),
                description: None,
                goal_type: GoalType::Weight,
                target_value: 70.0,
                unit: None,
                start_date: Some(today),
                end_date: None,
            },
        ];

        for request in requests {
            let goal = goals.create_goal(user_id, request).await?;
            goals.sync_progress(goal, today).await?;
        }

        tracing::info!("Created demo goals");
        Ok(())
    }

    async fn seed_food(&self, user_id: Uuid, today: NaiveDate) -> Result<()> {
        let nutrition = NutritionService::new(self.pool.clone());

        let meals = [
            ("Oatmeal with berries", MealType::Breakfast, 350.0, 12.0, 60.0, 7.0),
            ("Chicken salad", MealType::Lunch, 520.0, 42.0, 25.0, 26.0),
            ("Greek yogurt", MealType::Snack, 150.0, 15.0, 8.0, 4.0),
            ("Salmon with rice", MealType::Dinner, 680.0, 45.0, 70.0, 22.0),
        ];

        for (name, meal_type, calories, protein_g, carbs_g, fat_g) in meals {
            nutrition
                .create_entry(
                    user_id,
                    CreateFoodEntryRequest {
                        name: name.to_string(),
                        meal_type,
                        calories,
                        protein_g: Some(protein_g),
                        carbs_g: Some(carbs_g),
                        fat_g: Some(fat_g),
                        consumed_on: Some(today - Duration::days(1)),
                        notes: None,
                    },
                )
                .await?;
        }

        tracing::info!("Created demo food entries");
        Ok(())
    }
}
