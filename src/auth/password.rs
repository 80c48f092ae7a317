use bcrypt::{hash, verify, DEFAULT_COST};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters long")]
    TooShort(usize),
    #[error("Password must be no more than {0} characters long")]
    TooLong(usize),
    #[error("Password must contain at least one uppercase letter")]
    NoUppercase,
    #[error("Password must contain at least one lowercase letter")]
    NoLowercase,
    #[error("Password must contain at least one number")]
    NoNumber,
    #[error("Password must contain at least one special character")]
    NoSpecialChar,
    #[error("Failed to hash password")]
    HashingFailed,
    #[error("Failed to verify password")]
    VerificationFailed,
}

impl PasswordError {
    /// Errors caused by the chosen password rather than by bcrypt
    pub fn is_policy_violation(&self) -> bool {
        !matches!(
            self,
            PasswordError::HashingFailed | PasswordError::VerificationFailed
        )
    }
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special_char: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special_char: true,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordError::TooShort(self.min_length));
        }
        if length > self.max_length {
            return Err(PasswordError::TooLong(self.max_length));
        }

        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            return Err(PasswordError::NoUppercase);
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            return Err(PasswordError::NoLowercase);
        }
        if self.require_number && !password.chars().any(char::is_numeric) {
            return Err(PasswordError::NoNumber);
        }
        if self.require_special_char && password.chars().all(char::is_alphanumeric) {
            return Err(PasswordError::NoSpecialChar);
        }

        Ok(())
    }
}

/// Validate against the default policy, then hash with bcrypt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    PasswordPolicy::default().validate(password)?;

    hash(password, DEFAULT_COST).map_err(|_| PasswordError::HashingFailed)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|_| PasswordError::VerificationFailed)
}

/// 32 random alphanumeric characters
pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_password_validation() {
        let policy = PasswordPolicy::default();

        assert_matches!(policy.validate("short"), Err(PasswordError::TooShort(8)));
        assert_matches!(policy.validate("lowercase123!"), Err(PasswordError::NoUppercase));
        assert_matches!(policy.validate("UPPERCASE123!"), Err(PasswordError::NoLowercase));
        assert_matches!(policy.validate("Password!"), Err(PasswordError::NoNumber));
        assert_matches!(policy.validate("Password123"), Err(PasswordError::NoSpecialChar));
        assert!(policy.validate("Password123!").is_ok());
    }

    #[test]
    fn test_password_hashing() {
        let password = "TestPassword123!";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword1!", &hash).unwrap());
    }

    #[test]
    fn test_weak_password_is_not_hashed() {
        assert_matches!(hash_password("weak"), Err(PasswordError::TooShort(_)));
    }

    #[test]
    fn test_reset_token_generation() {
        let token1 = generate_reset_token();
        let token2 = generate_reset_token();

        assert_eq!(token1.len(), 32);
        assert!(token1.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token1, token2);
    }
}
