use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role granted at registration by the key used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    /// Whether this role passes a check that admits `allowed`.
    ///
    /// Admin satisfies every check a viewer would satisfy.
    pub fn satisfies(self, allowed: &[Role]) -> bool {
        allowed.contains(&self) || (self == Role::Admin && allowed.contains(&Role::Viewer))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered user as persisted under `registeredUsers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Creation time in epoch milliseconds
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Opaque password hash token
    pub password: String,
    /// Registration key as entered
    pub registration_key: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub is_premium: bool,
}

impl User {
    /// Case-insensitive match against either the username or the email
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        same_identity(&self.username, identifier) || same_identity(&self.email, identifier)
    }

    /// Whether this user already owns `username` or `email`
    pub fn collides_with(&self, username: &str, email: &str) -> bool {
        same_identity(&self.username, username) || same_identity(&self.email, email)
    }
}

/// Unicode case-insensitive comparison of usernames and emails
fn same_identity(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Projection of the logged-in user stored under `currentUser`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_premium: bool,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_premium: user.is_premium,
        }
    }
}

/// User listing shown to admins (no password material)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1733788800123,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "-1234567".to_string(),
            registration_key: "ADMIN-MASTER-2024".to_string(),
            role: Role::Admin,
            created_at: DateTime::from_timestamp(1733788800, 0).unwrap(),
            is_premium: true,
        }
    }

    #[test]
    fn test_role_satisfies() {
        assert!(Role::Admin.satisfies(&[Role::Admin]));
        assert!(Role::Admin.satisfies(&[Role::Viewer]));
        assert!(Role::Viewer.satisfies(&[Role::Viewer, Role::Admin]));
        assert!(!Role::Viewer.satisfies(&[Role::Admin]));
        assert!(!Role::Admin.satisfies(&[]));
    }

    #[test]
    fn test_matches_identifier_case_insensitive() {
        let user = sample_user();
        assert!(user.matches_identifier("ALICE"));
        assert!(user.matches_identifier("Alice@Example.com"));
        assert!(!user.matches_identifier("bob"));
    }

    #[test]
    fn test_identity_comparison_folds_non_ascii_case() {
        let mut user = sample_user();
        user.username = "Élodie".to_string();
        user.email = "élodie@exemple.fr".to_string();

        assert!(user.matches_identifier("élodie"));
        assert!(user.matches_identifier("ÉLODIE@EXEMPLE.FR"));
        assert!(user.collides_with("ÉLODIE", "other@example.com"));
        assert!(!user.collides_with("elodie", "elodie@exemple.fr"));
    }

    #[test]
    fn test_user_serialization_round_trip() {
        let user = sample_user();

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"registrationKey\""));
        assert!(json.contains("\"isPremium\":true"));
        assert!(json.contains("\"role\":\"admin\""));

        let deserialized: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, deserialized);
    }

    #[test]
    fn test_reads_browser_profile_shape() {
        let json = r#"{
            "id": 1733788800123,
            "username": "bob",
            "email": "bob@example.com",
            "password": "96354",
            "registrationKey": "VIP-MEMBER-2024",
            "role": "viewer",
            "createdAt": "2024-12-10T00:00:00.123Z",
            "isPremium": true
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Viewer);
        assert_eq!(Session::from(&user).username, "bob");
    }
}
