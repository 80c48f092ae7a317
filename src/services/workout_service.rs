use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::calculator::{estimate_calories, met_value, REFERENCE_WEIGHT_KG};
use crate::models::{
    CalorieEstimate, CreateWorkoutRequest, DailyWorkoutTotals, DateRangeQuery,
    EstimateCaloriesRequest, UpdateWorkoutRequest, Workout, WorkoutQuery, WorkoutSummary,
    WorkoutTypeBreakdown,
};
use crate::services::UserService;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct WorkoutService {
    db: PgPool,
    users: UserService,
}

impl WorkoutService {
    pub fn new(db: PgPool) -> Self {
        Self {
            users: UserService::new(db.clone()),
            db,
        }
    }

    pub async fn create_workout(&self, user_id: Uuid, request: CreateWorkoutRequest) -> Result<Workout> {
        let calories_burned = match request.calories_burned {
            Some(calories) => calories,
            None => {
                let weight = self.weight_for(user_id).await?;
                estimate_calories(
                    request.workout_type,
                    request.intensity,
                    f64::from(request.duration_minutes),
                    weight,
                )?
            }
        };

        let workout = sqlx::query_as::<_, Workout>(
            r#"
            INSERT INTO workouts (
                id, user_id, workout_type, intensity, duration_minutes,
                calories_burned, distance_km, performed_on, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.workout_type)
        .bind(request.intensity)
        .bind(request.duration_minutes)
        .bind(calories_burned)
        .bind(request.distance_km)
        .bind(request.performed_on.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(request.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(
            "Logged {} workout {} for user {}",
            workout.workout_type.as_str(),
            workout.id,
            user_id
        );
        Ok(workout)
    }

    pub async fn get_workout(&self, workout_id: Uuid, user_id: Uuid) -> Result<Option<Workout>> {
        let workout = sqlx::query_as::<_, Workout>(
            "SELECT * FROM workouts WHERE id = $1 AND user_id = $2",
        )
        .bind(workout_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(workout)
    }

    /// Newest first
    pub async fn list_workouts(&self, user_id: Uuid, query: WorkoutQuery) -> Result<Vec<Workout>> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0).max(0);

        let mut sql = "SELECT * FROM workouts WHERE user_id = $1".to_string();
        let mut param_count = 2;

        if query.workout_type.is_some() {
            sql.push_str(&format!(" AND workout_type = ${}", param_count));
            param_count += 1;
        }
        if query.from.is_some() {
            sql.push_str(&format!(" AND performed_on >= ${}", param_count));
            param_count += 1;
        }
        if query.to.is_some() {
            sql.push_str(&format!(" AND performed_on <= ${}", param_count));
        }

        sql.push_str(" ORDER BY performed_on DESC, created_at DESC");
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut query_builder = sqlx::query_as::<_, Workout>(&sql).bind(user_id);
        if let Some(workout_type) = query.workout_type {
            query_builder = query_builder.bind(workout_type);
        }
        if let Some(from) = query.from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = query.to {
            query_builder = query_builder.bind(to);
        }

        let workouts = query_builder.fetch_all(&self.db).await?;
        Ok(workouts)
    }

    /// Re-estimates calories when type, intensity or duration change without an explicit count
    pub async fn update_workout(
        &self,
        workout_id: Uuid,
        user_id: Uuid,
        request: UpdateWorkoutRequest,
    ) -> Result<Option<Workout>> {
        let Some(existing) = self.get_workout(workout_id, user_id).await? else {
            return Ok(None);
        };

        let workout_type = request.workout_type.unwrap_or(existing.workout_type);
        let intensity = request.intensity.unwrap_or(existing.intensity);
        let duration_minutes = request.duration_minutes.unwrap_or(existing.duration_minutes);

        let calories_burned = match request.calories_burned {
            Some(calories) => calories,
            None if request.affects_calorie_estimate() => {
                let weight = self.weight_for(user_id).await?;
                estimate_calories(workout_type, intensity, f64::from(duration_minutes), weight)?
            }
            None => existing.calories_burned,
        };

        let workout = sqlx::query_as::<_, Workout>(
            r#"
            UPDATE workouts SET
                workout_type = $3,
                intensity = $4,
                duration_minutes = $5,
                calories_burned = $6,
                distance_km = COALESCE($7, distance_km),
                performed_on = COALESCE($8, performed_on),
                notes = COALESCE($9, notes),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(workout_id)
        .bind(user_id)
        .bind(workout_type)
        .bind(intensity)
        .bind(duration_minutes)
        .bind(calories_burned)
        .bind(request.distance_km)
        .bind(request.performed_on)
        .bind(request.notes)
        .fetch_optional(&self.db)
        .await?;

        Ok(workout)
    }

    pub async fn delete_workout(&self, workout_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
            .bind(workout_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Totals over an optional inclusive date range, with a per-type breakdown
    pub async fn get_summary(&self, user_id: Uuid, range: DateRangeQuery) -> Result<WorkoutSummary> {
        let totals = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_workouts,
                COALESCE(SUM(duration_minutes), 0)::BIGINT AS total_minutes,
                COALESCE(SUM(calories_burned), 0)::FLOAT8 AS total_calories,
                COALESCE(SUM(distance_km), 0)::FLOAT8 AS total_distance_km
            FROM workouts
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR performed_on >= $2)
              AND ($3::DATE IS NULL OR performed_on <= $3)
            "#,
        )
        .bind(user_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_one(&self.db)
        .await?;

        let by_type = sqlx::query_as::<_, WorkoutTypeBreakdown>(
            r#"
            SELECT
                workout_type,
                COUNT(*) AS workouts,
                COALESCE(SUM(duration_minutes), 0)::BIGINT AS minutes,
                COALESCE(SUM(calories_burned), 0)::FLOAT8 AS calories
            FROM workouts
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR performed_on >= $2)
              AND ($3::DATE IS NULL OR performed_on <= $3)
            GROUP BY workout_type
            ORDER BY workouts DESC, workout_type
            "#,
        )
        .bind(user_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.db)
        .await?;

        Ok(WorkoutSummary {
            from: range.from,
            to: range.to,
            total_workouts: totals.try_get("total_workouts")?,
            total_minutes: totals.try_get("total_minutes")?,
            total_calories: round1(totals.try_get("total_calories")?),
            total_distance_km: round1(totals.try_get("total_distance_km")?),
            by_type,
        })
    }

    pub async fn daily_totals(&self, user_id: Uuid, date: NaiveDate) -> Result<DailyWorkoutTotals> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS workouts,
                COALESCE(SUM(duration_minutes), 0)::BIGINT AS minutes,
                COALESCE(SUM(calories_burned), 0)::FLOAT8 AS calories
            FROM workouts
            WHERE user_id = $1 AND performed_on = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.db)
        .await?;

        Ok(DailyWorkoutTotals {
            workouts: row.try_get("workouts")?,
            minutes: row.try_get("minutes")?,
            calories: round1(row.try_get("calories")?),
        })
    }

    /// Stateless estimate; weight falls back to the caller's profile, then the reference weight
    pub async fn estimate(&self, user_id: Uuid, request: EstimateCaloriesRequest) -> Result<CalorieEstimate> {
        let weight_kg = match request.weight_kg {
            Some(weight) => weight,
            None => self.weight_for(user_id).await?,
        };

        let calories = estimate_calories(
            request.workout_type,
            request.intensity,
            request.duration_minutes,
            weight_kg,
        )?;

        Ok(CalorieEstimate {
            workout_type: request.workout_type,
            intensity: request.intensity,
            met: met_value(request.workout_type, request.intensity),
            weight_kg,
            duration_minutes: request.duration_minutes,
            calories,
        })
    }

    async fn weight_for(&self, user_id: Uuid) -> Result<f64> {
        Ok(self
            .users
            .get_weight_kg(user_id)
            .await?
            .unwrap_or(REFERENCE_WEIGHT_KG))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
