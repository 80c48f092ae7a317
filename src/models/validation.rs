use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A rejected request field
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
            .expect("email pattern is a valid regex")
    })
}

/// Email validation
pub fn validate_email(email: &str) -> ValidationResult {
    if email.trim().is_empty() {
        return Err(ValidationError::new("email", "cannot be empty"));
    }

    if email.len() > 255 {
        return Err(ValidationError::new(
            "email",
            "cannot be longer than 255 characters",
        ));
    }

    if !email_regex().is_match(email) {
        return Err(ValidationError::new("email", "invalid email format"));
    }

    Ok(())
}

pub fn ensure_not_blank(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "cannot be empty"));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("cannot be longer than {max_len} characters"),
        ));
    }
    Ok(())
}

pub fn ensure_positive(field: &'static str, value: f64) -> ValidationResult {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }
    Ok(())
}

pub fn ensure_non_negative(field: &'static str, value: f64) -> ValidationResult {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(field, "cannot be negative"));
    }
    Ok(())
}

/// Lower bound exclusive, upper bound inclusive
pub fn ensure_range(field: &'static str, value: f64, min: f64, max: f64) -> ValidationResult {
    if !value.is_finite() || value <= min || value > max {
        return Err(ValidationError::new(
            field,
            format!("must be greater than {min} and at most {max}"),
        ));
    }
    Ok(())
}

pub fn ensure_date_order(start: NaiveDate, end: Option<NaiveDate>) -> ValidationResult {
    if let Some(end) = end {
        if end < start {
            return Err(ValidationError::new(
                "end_date",
                "cannot be before start_date",
            ));
        }
    }
    Ok(())
}

pub fn ensure_not_future(field: &'static str, date: NaiveDate, today: NaiveDate) -> ValidationResult {
    if date > today {
        return Err(ValidationError::new(field, "cannot be in the future"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("test@").is_err());
        assert!(validate_email("test@example").is_err());
    }

    #[test]
    fn test_numeric_checks() {
        assert!(ensure_positive("target_value", 1.0).is_ok());
        assert!(ensure_positive("target_value", 0.0).is_err());
        assert!(ensure_positive("target_value", f64::NAN).is_err());

        assert!(ensure_non_negative("calories", 0.0).is_ok());
        assert!(ensure_non_negative("calories", -0.1).is_err());

        assert!(ensure_range("weight_kg", 70.0, 20.0, 400.0).is_ok());
        assert!(ensure_range("weight_kg", 20.0, 20.0, 400.0).is_err());
        assert!(ensure_range("weight_kg", 400.0, 20.0, 400.0).is_ok());
    }

    #[test]
    fn test_date_checks() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let before = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        assert!(ensure_date_order(start, None).is_ok());
        assert!(ensure_date_order(start, Some(start)).is_ok());
        assert_eq!(
            ensure_date_order(start, Some(before)).unwrap_err().field,
            "end_date"
        );

        assert!(ensure_not_future("date", before, start).is_ok());
        assert!(ensure_not_future("date", start, before).is_err());
    }

    #[test]
    fn test_blank_check() {
        assert!(ensure_not_blank("title", "Run 5k", 255).is_ok());
        assert!(ensure_not_blank("title", "   ", 255).is_err());
        assert!(ensure_not_blank("title", "abcdef", 5).is_err());
    }
}
