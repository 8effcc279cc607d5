//! Registered accounts: uniqueness, per-role capacity and password checks.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::constants::{DEFAULT_MAX_ADMINS, DEFAULT_MAX_VIEWERS};
use crate::credentials::CredentialStore;
use crate::error::{AuthError, RegistrationError, Result};
use crate::models::{Role, User};
use crate::security::{validate_email, validate_password_strength, PasswordHasher};
use crate::store::{load_collection, modify_collection, tables, Change, KvStore};

/// Maximum accounts per role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleLimits {
    pub max_admins: usize,
    pub max_viewers: usize,
}

impl Default for RoleLimits {
    fn default() -> Self {
        Self {
            max_admins: DEFAULT_MAX_ADMINS,
            max_viewers: DEFAULT_MAX_VIEWERS,
        }
    }
}

impl RoleLimits {
    pub fn max_for(&self, role: Role) -> usize {
        match role {
            Role::Admin => self.max_admins,
            Role::Viewer => self.max_viewers,
        }
    }
}

/// Result of a capacity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capacity {
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Sign-up form contents
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(rename = "regKey")]
    pub key: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct UserRegistry {
    store: Arc<dyn KvStore>,
    credentials: CredentialStore,
    hasher: PasswordHasher,
    limits: RoleLimits,
}

impl UserRegistry {
    pub fn new(
        store: Arc<dyn KvStore>,
        credentials: CredentialStore,
        hasher: PasswordHasher,
        limits: RoleLimits,
    ) -> Self {
        Self {
            store,
            credentials,
            hasher,
            limits,
        }
    }

    pub fn list(&self) -> Result<Vec<User>> {
        Ok(load_collection(self.store.as_ref(), tables::REGISTERED_USERS)?)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// True if either field collides, case-insensitively, with a stored user
    pub fn exists(&self, username: &str, email: &str) -> Result<bool> {
        Ok(self
            .list()?
            .iter()
            .any(|user| user.collides_with(username.trim(), email.trim())))
    }

    pub fn capacity_for(&self, role: Role) -> Result<Capacity> {
        Ok(capacity_among(&self.list()?, role, &self.limits))
    }

    /// Register a new account.
    ///
    /// Checks run in a fixed order and the first failure is reported. The
    /// uniqueness and capacity checks run inside the same store update as the
    /// insert.
    pub fn register(&self, request: &RegistrationRequest) -> Result<User> {
        let key = request.key.trim();
        let username = request.username.trim();
        let email = request.email.trim();

        let role = self
            .credentials
            .classify(key)
            .role()
            .ok_or(RegistrationError::InvalidKey)?;

        if !validate_email(email) {
            return Err(RegistrationError::InvalidEmail.into());
        }

        if !validate_password_strength(&request.password) {
            return Err(RegistrationError::WeakPassword.into());
        }

        if request.password != request.confirm_password {
            return Err(RegistrationError::PasswordMismatch.into());
        }

        let now = Utc::now();
        let candidate = User {
            id: now.timestamp_millis(),
            username: username.to_string(),
            email: email.to_string(),
            password: self.hasher.hash(&request.password),
            registration_key: key.to_string(),
            role,
            created_at: now,
            is_premium: true,
        };

        let limits = self.limits;
        let outcome = modify_collection(
            self.store.as_ref(),
            tables::REGISTERED_USERS,
            |users: &mut Vec<User>| {
                if users.iter().any(|u| u.collides_with(username, email)) {
                    return Change::Unchanged(Err(RegistrationError::DuplicateUser));
                }

                let capacity = capacity_among(users, role, &limits);
                if !capacity.allowed {
                    let reason = capacity.reason.unwrap_or_default();
                    return Change::Unchanged(Err(RegistrationError::CapacityExceeded(reason)));
                }

                users.push(candidate.clone());
                Change::Modified(Ok(()))
            },
        )?;

        match outcome {
            Ok(()) => {
                tracing::info!("New {} registered: {}", candidate.role, candidate.username);
                Ok(candidate)
            }
            Err(e) => {
                tracing::warn!("Registration refused for {}: {}", username, e);
                Err(e.into())
            }
        }
    }

    /// Find the user whose username or email matches `identifier` and whose
    /// stored token matches `password`
    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<User> {
        let identifier = identifier.trim();
        let token = self.hasher.hash(password);

        self.list()?
            .into_iter()
            .find(|user| user.matches_identifier(identifier) && user.password == token)
            .ok_or_else(|| {
                tracing::warn!("Failed login for {}", identifier);
                AuthError::InvalidCredentials.into()
            })
    }
}

fn capacity_among(users: &[User], role: Role, limits: &RoleLimits) -> Capacity {
    let count = users.iter().filter(|u| u.role == role).count();
    let max = limits.max_for(role);

    if count >= max {
        let reason = match role {
            Role::Admin => format!(
                "Maximum admin limit reached ({} admin maximum)",
                max
            ),
            Role::Viewer => format!(
                "Maximum viewer limit reached ({} viewers maximum)",
                max
            ),
        };
        return Capacity {
            allowed: false,
            reason: Some(reason),
        };
    }

    Capacity {
        allowed: true,
        reason: None,
    }
}
