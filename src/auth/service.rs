use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{generate_reset_token, hash_password, verify_password};
use crate::auth::{
    AuthError, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, JwtService, LoginRequest,
    MessageResponse, PasswordResetToken, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
    TokenResponse, TokenType, UserSession,
};
use crate::models::{ensure_not_blank, validate_email, User, UserProfile};
use crate::services::Mailer;

const RESET_TOKEN_TTL_MINUTES: i64 = 60;
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for that email, password reset instructions have been sent";

#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
    mailer: Option<Mailer>,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: &str, mailer: Option<Mailer>) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret),
            db,
            mailer,
        }
    }

    /// Register a new user with default reminder settings
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);
        validate_email(&email).map_err(|err| AuthError::EmailValidation(err.message))?;
        if let Some(name) = &request.name {
            ensure_not_blank("name", name, 255)?;
        }

        if self.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;

        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, name)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(&password_hash)
        .bind(request.name.as_deref().map(str::trim))
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AuthError::EmailAlreadyExists
            }
            other => AuthError::Database(other),
        })?;

        sqlx::query("INSERT INTO reminder_settings (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Registered user {}", user.id);
        self.issue_tokens(user).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);

        // Unknown email and wrong password are indistinguishable to the caller
        let user = self
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_tokens(user).await
    }

    /// Exchange a stored, unrevoked refresh token for a new access token
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> Result<TokenResponse, AuthError> {
        let claims = self
            .jwt_service
            .validate_typed(&request.refresh_token, TokenType::Refresh)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        if !self.is_refresh_token_valid(user_id, &request.refresh_token).await? {
            return Err(AuthError::InvalidToken);
        }

        let access_token = self
            .jwt_service
            .create_token(user_id, &claims.email, TokenType::Access)?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
        })
    }

    /// Blacklist the access token and revoke every refresh token of its user
    pub async fn logout(&self, token: &str) -> Result<MessageResponse, AuthError> {
        let session = self.jwt_service.extract_user_session(token)?;

        self.blacklist_token(&session.jti, session.expires_at as i64).await?;
        self.revoke_user_refresh_tokens(session.user_id).await?;

        Ok(MessageResponse::new("Successfully logged out"))
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(&request.new_password)?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        self.revoke_user_refresh_tokens(user_id).await?;

        Ok(MessageResponse::new("Password changed successfully"))
    }

    /// Same answer whether or not the email belongs to an account
    pub async fn forgot_password(
        &self,
        request: ForgotPasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        let email = normalize_email(&request.email);

        let Some(user) = self.get_user_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE));
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        sqlx::query(
            "INSERT INTO password_reset_tokens (token, user_id, expires_at)
             VALUES ($1, $2, $3)",
        )
        .bind(&token)
        .bind(user.id)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        match &self.mailer {
            Some(mailer) => {
                let body = format!(
                    "A password reset was requested for your FitTrack account.\n\n\
                     Reset token: {token}\n\n\
                     The token expires in {RESET_TOKEN_TTL_MINUTES} minutes. \
                     If you did not request this, ignore this email."
                );
                if let Err(err) = mailer.send(&user.email, "Reset your FitTrack password", &body).await {
                    tracing::error!("Failed to send password reset email to user {}: {:#}", user.id, err);
                }
            }
            None => {
                tracing::warn!(
                    "SMTP not configured; password reset token for user {}: {}",
                    user.id,
                    token
                );
            }
        }

        Ok(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
    }

    /// Consume a valid reset token and set the new password
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        let reset = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT token, user_id, expires_at, used FROM password_reset_tokens WHERE token = $1",
        )
        .bind(request.token.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AuthError::InvalidResetToken)?;

        if reset.used || reset.expires_at <= Utc::now() {
            return Err(AuthError::InvalidResetToken);
        }

        let password_hash = hash_password(&request.new_password)?;

        let mut tx = self.db.begin().await?;

        // A token is consumed at most once
        let consumed = sqlx::query(
            "UPDATE password_reset_tokens SET used = TRUE WHERE token = $1 AND NOT used",
        )
        .bind(&reset.token)
        .execute(&mut *tx)
        .await?;
        if consumed.rows_affected() == 0 {
            return Err(AuthError::InvalidResetToken);
        }

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(reset.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1")
            .bind(reset.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Password reset for user {}", reset.user_id);
        Ok(MessageResponse::new("Password has been reset"))
    }

    pub async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("SELECT 1 FROM token_blacklist WHERE jti = $1 AND expires_at > NOW()")
            .bind(jti)
            .fetch_optional(&self.db)
            .await?;

        Ok(result.is_some())
    }

    /// Validate user session from an access token
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let session = self.jwt_service.extract_user_session(token)?;

        if self.is_token_blacklisted(&session.jti).await? {
            return Err(AuthError::InvalidToken);
        }

        Ok(session)
    }

    async fn issue_tokens(&self, user: User) -> Result<AuthResponse, AuthError> {
        let (access_token, refresh_token) =
            self.jwt_service.create_token_pair(user.id, &user.email)?;

        self.store_refresh_token(user.id, &refresh_token).await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
            user: UserProfile::from(user),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn store_refresh_token(&self, user_id: Uuid, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.jwt_service.validate_token(refresh_token)?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp as i64, 0).ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_digest(refresh_token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn is_refresh_token_valid(&self, user_id: Uuid, refresh_token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "SELECT 1 FROM refresh_tokens
             WHERE user_id = $1 AND token_hash = $2 AND expires_at > NOW() AND NOT revoked",
        )
        .bind(user_id)
        .bind(token_digest(refresh_token))
        .fetch_optional(&self.db)
        .await?;

        Ok(result.is_some())
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn blacklist_token(&self, jti: &str, exp: i64) -> Result<(), AuthError> {
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0).ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn token_digest(token: &str) -> String {
    format!("{:x}", md5::compute(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_token_digest_is_stable_hex() {
        let digest = token_digest("refresh-token");
        assert_eq!(digest.len(), 32);
        assert_eq!(digest, token_digest("refresh-token"));
        assert_ne!(digest, token_digest("other-token"));
    }
}
