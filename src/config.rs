use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_MAX_ADMINS, DEFAULT_MAX_VIEWERS, FOLDER_DELAY_MAX_MS, FOLDER_DELAY_MIN_MS,
    UPLOAD_DELAY_MAX_MS, UPLOAD_DELAY_MIN_MS,
};
use crate::security::{PasswordHasher, PasswordScheme};
use crate::transfer::RandomDelay;
use crate::users::RoleLimits;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Profile database file; empty keeps the profile in memory
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub limits: RoleLimits,
    pub password_scheme: PasswordScheme,
    pub password_pepper: String,
    pub upload_delay_ms: (u64, u64),
    pub folder_delay_ms: (u64, u64),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parse_var("SERVER_PORT", 8080)?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/portal.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let limits = RoleLimits {
            max_admins: parse_var("MAX_ADMINS", DEFAULT_MAX_ADMINS)?,
            max_viewers: parse_var("MAX_VIEWERS", DEFAULT_MAX_VIEWERS)?,
        };

        let password_scheme = env::var("PASSWORD_SCHEME")
            .unwrap_or_else(|_| "peppered".to_string())
            .parse::<PasswordScheme>()?;

        let password_pepper = env::var("PASSWORD_PEPPER").unwrap_or_default();
        if password_scheme == PasswordScheme::Peppered && password_pepper.is_empty() {
            return Err("PASSWORD_PEPPER must be set for the peppered password scheme".to_string());
        }

        let upload_delay_ms = (
            parse_var("UPLOAD_DELAY_MIN_MS", UPLOAD_DELAY_MIN_MS)?,
            parse_var("UPLOAD_DELAY_MAX_MS", UPLOAD_DELAY_MAX_MS)?,
        );
        let folder_delay_ms = (
            parse_var("FOLDER_DELAY_MIN_MS", FOLDER_DELAY_MIN_MS)?,
            parse_var("FOLDER_DELAY_MAX_MS", FOLDER_DELAY_MAX_MS)?,
        );

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            environment,
            limits,
            password_scheme,
            password_pepper,
            upload_delay_ms,
            folder_delay_ms,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        match self.password_scheme {
            PasswordScheme::Rolling => PasswordHasher::Rolling,
            PasswordScheme::Peppered => PasswordHasher::Peppered {
                pepper: self.password_pepper.clone(),
            },
        }
    }

    pub fn transfer_delays(&self) -> RandomDelay {
        RandomDelay {
            file_ms: self.upload_delay_ms.0..=self.upload_delay_ms.1,
            folder_ms: self.folder_delay_ms.0..=self.folder_delay_ms.1,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid {}", name)),
        Err(_) => Ok(default),
    }
}
