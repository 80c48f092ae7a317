use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{UpdateProfileRequest, User};

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// Fields left out of the request keep their stored value
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                weight_kg = COALESCE($3, weight_kg),
                height_cm = COALESCE($4, height_cm),
                stride_length_cm = COALESCE($5, stride_length_cm),
                daily_step_target = COALESCE($6, daily_step_target),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.weight_kg)
        .bind(request.height_cm)
        .bind(request.stride_length_cm)
        .bind(request.daily_step_target)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// Removes the account; every per-user table cascades
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_weight_kg(&self, user_id: Uuid) -> Result<Option<f64>> {
        let weight = sqlx::query_scalar::<_, Option<f64>>("SELECT weight_kg FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(weight.flatten())
    }
}
