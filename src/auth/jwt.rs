use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{AuthError, Claims, TokenType, UserSession};

/// JWT token service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: Duration,
    refresh_token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("access_token_expires_in", &self.access_token_expires_in)
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: Duration::minutes(15),
            refresh_token_expires_in: Duration::days(30),
        }
    }

    pub fn create_token(
        &self,
        user_id: Uuid,
        email: &str,
        token_type: TokenType,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => self.access_token_expires_in,
            TokenType::Refresh => self.refresh_token_expires_in,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type,
            exp: (now + lifetime).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Create token pair (access + refresh)
    pub fn create_token_pair(&self, user_id: Uuid, email: &str) -> Result<(String, String), AuthError> {
        let access_token = self.create_token(user_id, email, TokenType::Access)?;
        let refresh_token = self.create_token(user_id, email, TokenType::Refresh)?;
        Ok((access_token, refresh_token))
    }

    /// Validate signature and expiry, whatever the token type
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    pub fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Session for an access token; refresh tokens are rejected
    pub fn extract_user_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let claims = self.validate_typed(token, TokenType::Access)?;
        UserSession::from_claims(&claims).map_err(|_| AuthError::InvalidToken)
    }

    pub fn access_token_expires_in_seconds(&self) -> usize {
        self.access_token_expires_in.num_seconds() as usize
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeaderFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_jwt_creation_and_validation() {
        let jwt_service = JwtService::new("test_secret");
        let user_id = Uuid::new_v4();

        let token = jwt_service
            .create_token(user_id, "test@example.com", TokenType::Access)
            .unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(extract_bearer_token("Bearer test_token").unwrap(), "test_token");
        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
    }

    #[test]
    fn test_refresh_token_is_not_a_session() {
        let jwt_service = JwtService::new("test_secret");
        let (access, refresh) = jwt_service
            .create_token_pair(Uuid::new_v4(), "test@example.com")
            .unwrap();

        assert!(jwt_service.extract_user_session(&access).is_ok());
        assert_matches!(
            jwt_service.extract_user_session(&refresh),
            Err(AuthError::InvalidToken)
        );
        assert!(jwt_service.validate_typed(&refresh, TokenType::Refresh).is_ok());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = JwtService::new("secret_a");
        let verifier = JwtService::new("secret_b");
        let token = issuer
            .create_token(Uuid::new_v4(), "test@example.com", TokenType::Access)
            .unwrap();

        assert_matches!(verifier.validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_token_pair_has_distinct_ids() {
        let jwt_service = JwtService::new("test_secret");
        let (access, refresh) = jwt_service
            .create_token_pair(Uuid::new_v4(), "test@example.com")
            .unwrap();

        let access_jti = jwt_service.validate_token(&access).unwrap().jti;
        let refresh_jti = jwt_service.validate_token(&refresh).unwrap().jti;
        assert_ne!(access_jti, refresh_jti);
    }
}
