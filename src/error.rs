use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::LOGIN_REDIRECT;
use crate::files::DashboardVariant;
use crate::models::FileId;
use crate::store::StoreError;

/// Why a registration attempt was refused. Checked in declaration order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Invalid registration key. Please contact the administrator.")]
    InvalidKey,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Password must be at least 8 characters with uppercase, lowercase, and number.")]
    WeakPassword,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Username or email already exists.")]
    DuplicateUser,

    #[error("{0}")]
    CapacityExceeded(String),
}

impl RegistrationError {
    /// Stable identifier reported to the presentation layer
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationError::InvalidKey => "invalid_key",
            RegistrationError::InvalidEmail => "invalid_email",
            RegistrationError::WeakPassword => "weak_password",
            RegistrationError::PasswordMismatch => "password_mismatch",
            RegistrationError::DuplicateUser => "duplicate_user",
            RegistrationError::CapacityExceeded(_) => "capacity_exceeded",
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username/email or password.")]
    InvalidCredentials,
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
        }
    }
}

/// Why a picked file was refused by its category
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid file type: {file}")]
    InvalidExtension { file: String },

    #[error("File too large: {file} (max {}MB)", .max_bytes / crate::constants::MIB)]
    TooLarge { file: String, max_bytes: u64 },
}

impl ValidationError {
    pub fn file(&self) -> &str {
        match self {
            ValidationError::InvalidExtension { file } | ValidationError::TooLarge { file, .. } => {
                file
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("File not found: {id} in {category}")]
pub struct NotFound {
    pub id: FileId,
    pub category: String,
}

/// Session check failure; callers are sent back to the login page
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Access denied. Please login first.")]
    NoSession,

    #[error("Access denied. Insufficient privileges.")]
    RoleNotAllowed,
}

impl AccessDenied {
    pub fn redirect(&self) -> &'static str {
        LOGIN_REDIRECT
    }
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("Unknown category '{category}' for the {variant} dashboard")]
    UnknownCategory {
        variant: DashboardVariant,
        category: String,
    },

    #[error("The {variant} dashboard does not allow {action}")]
    NotPermitted {
        variant: DashboardVariant,
        action: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                return internal_error();
            }
            AppError::TaskJoin(e) => {
                tracing::error!("Task join error: {:?}", e);
                return internal_error();
            }
            AppError::AccessDenied(denied) => {
                let body = Json(json!({
                    "error": denied.to_string(),
                    "redirect": denied.redirect(),
                }));
                return (StatusCode::UNAUTHORIZED, body).into_response();
            }
            AppError::Registration(RegistrationError::DuplicateUser) => StatusCode::CONFLICT,
            AppError::Registration(RegistrationError::CapacityExceeded(_)) => StatusCode::FORBIDDEN,
            AppError::Registration(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(ValidationError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UnknownCategory { .. } => StatusCode::NOT_FOUND,
            AppError::NotPermitted { .. } => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

fn internal_error() -> Response {
    let body = Json(json!({ "error": "Internal server error" }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_message_names_limit() {
        let err = ValidationError::TooLarge {
            file: "big.cfg".to_string(),
            max_bytes: 50 * crate::constants::MIB,
        };
        assert_eq!(err.to_string(), "File too large: big.cfg (max 50MB)");
        assert_eq!(err.file(), "big.cfg");
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::from(RegistrationError::InvalidKey), StatusCode::BAD_REQUEST),
            (AppError::from(RegistrationError::DuplicateUser), StatusCode::CONFLICT),
            (
                AppError::from(RegistrationError::CapacityExceeded("full".to_string())),
                StatusCode::FORBIDDEN,
            ),
            (AppError::from(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (AppError::from(AccessDenied::NoSession), StatusCode::UNAUTHORIZED),
            (
                AppError::from(NotFound {
                    id: FileId(1.5),
                    category: "tools".to_string(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (AppError::from(StoreError::Poisoned), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
