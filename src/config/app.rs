use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";
pub const DEFAULT_REMINDER_CRON: &str = "0 * * * * *";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub reminder_cron: String,
    pub seed_demo_data: bool,
    pub smtp: Option<SmtpConfig>,
}

/// Outgoing mail settings; present only when every credential is set
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env("PORT", 3000)?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        let reminder_cron =
            env::var("REMINDER_CRON").unwrap_or_else(|_| DEFAULT_REMINDER_CRON.to_string());
        let seed_demo_data = parse_env("SEED_DEMO_DATA", false)?;

        let config = AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            reminder_cron,
            seed_demo_data,
            smtp: SmtpConfig::from_env()?,
        };

        if config.is_production() && config.jwt_secret == DEFAULT_JWT_SECRET {
            bail!("JWT_SECRET must be set in production");
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SmtpConfig {
    pub fn from_env() -> Result<Option<Self>> {
        let host = env::var("SMTP_HOST").ok();
        let username = env::var("SMTP_USERNAME").ok();
        let password = env::var("SMTP_PASSWORD").ok();
        let from = env::var("SMTP_FROM").ok();
        let port = parse_env("SMTP_PORT", 587)?;

        match (host, username, password, from) {
            (Some(host), Some(username), Some(password), Some(from)) => Ok(Some(SmtpConfig {
                host,
                port,
                username,
                password,
                from,
            })),
            _ => Ok(None),
        }
    }
}

/// Read `key`, falling back to `default` when unset; malformed values are errors
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "HOST",
        "PORT",
        "ENVIRONMENT",
        "JWT_SECRET",
        "REMINDER_CRON",
        "SEED_DEMO_DATA",
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_USERNAME",
        "SMTP_PASSWORD",
        "SMTP_FROM",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert_eq!(config.reminder_cron, DEFAULT_REMINDER_CRON);
        assert!(config.is_development());
        assert!(!config.seed_demo_data);
        assert!(config.smtp.is_none());
    }

    #[test]
    #[serial]
    fn test_malformed_port_is_an_error() {
        clear_env();
        env::set_var("PORT", "not-a-port");
        let result = AppConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_production_requires_secret() {
        clear_env();
        env::set_var("ENVIRONMENT", "production");
        assert!(AppConfig::from_env().is_err());

        env::set_var("JWT_SECRET", "a-real-secret");
        let config = AppConfig::from_env().unwrap();
        clear_env();

        assert!(config.is_production());
    }

    #[test]
    #[serial]
    fn test_smtp_needs_every_credential() {
        clear_env();
        env::set_var("SMTP_HOST", "smtp.example.com");
        env::set_var("SMTP_USERNAME", "mailer");
        env::set_var("SMTP_PASSWORD", "hunter2");
        assert!(SmtpConfig::from_env().unwrap().is_none());

        env::set_var("SMTP_FROM", "FitTrack <noreply@example.com>");
        env::set_var("SMTP_PORT", "2525");
        let smtp = SmtpConfig::from_env().unwrap().unwrap();
        clear_env();

        assert_eq!(smtp.port, 2525);
        assert!(!format!("{:?}", smtp).contains("hunter2"));
    }
}
