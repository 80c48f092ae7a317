use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    CreateFoodEntryRequest, DailyNutritionSummary, FoodEntry, FoodQuery, UpdateFoodEntryRequest,
};

#[derive(Clone)]
pub struct NutritionService {
    db: PgPool,
}

impl NutritionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_entry(&self, user_id: Uuid, request: CreateFoodEntryRequest) -> Result<FoodEntry> {
        let entry = sqlx::query_as::<_, FoodEntry>(
            r#"
            INSERT INTO food_entries (
                id, user_id, name, meal_type, calories,
                protein_g, carbs_g, fat_g, consumed_on, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.name.trim())
        .bind(request.meal_type)
        .bind(request.calories)
        .bind(request.protein_g)
        .bind(request.carbs_g)
        .bind(request.fat_g)
        .bind(request.consumed_on.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(request.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(entry)
    }

    pub async fn get_entry(&self, entry_id: Uuid, user_id: Uuid) -> Result<Option<FoodEntry>> {
        let entry = sqlx::query_as::<_, FoodEntry>(
            "SELECT * FROM food_entries WHERE id = $1 AND user_id = $2",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(entry)
    }

    /// `date` wins over `from`/`to`; newest day first, meals in eating order
    pub async fn list_entries(&self, user_id: Uuid, query: FoodQuery) -> Result<Vec<FoodEntry>> {
        let (from, to) = match query.date {
            Some(date) => (Some(date), Some(date)),
            None => (query.from, query.to),
        };

        let entries = sqlx::query_as::<_, FoodEntry>(
            r#"
            SELECT * FROM food_entries
            WHERE user_id = $1
              AND ($2::DATE IS NULL OR consumed_on >= $2)
              AND ($3::DATE IS NULL OR consumed_on <= $3)
              AND ($4::meal_type IS NULL OR meal_type = $4)
            ORDER BY consumed_on DESC, meal_type, created_at
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(query.meal_type)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    pub async fn update_entry(
        &self,
        entry_id: Uuid,
        user_id: Uuid,
        request: UpdateFoodEntryRequest,
    ) -> Result<Option<FoodEntry>> {
        let entry = sqlx::query_as::<_, FoodEntry>(
            r#"
            UPDATE food_entries SET
                name = COALESCE($3, name),
                meal_type = COALESCE($4, meal_type),
                calories = COALESCE($5, calories),
                protein_g = COALESCE($6, protein_g),
                carbs_g = COALESCE($7, carbs_g),
                fat_g = COALESCE($8, fat_g),
                consumed_on = COALESCE($9, consumed_on),
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.meal_type)
        .bind(request.calories)
        .bind(request.protein_g)
        .bind(request.carbs_g)
        .bind(request.fat_g)
        .bind(request.consumed_on)
        .bind(request.notes)
        .fetch_optional(&self.db)
        .await?;

        Ok(entry)
    }

    pub async fn delete_entry(&self, entry_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM food_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn daily_summary(&self, user_id: Uuid, date: NaiveDate) -> Result<DailyNutritionSummary> {
        let entries = self
            .list_entries(
                user_id,
                FoodQuery {
                    date: Some(date),
                    ..FoodQuery::default()
                },
            )
            .await?;

        Ok(DailyNutritionSummary::from_entries(date, &entries))
    }
}
