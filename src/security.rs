use sha2::{Digest, Sha256};
use std::str::FromStr;

use crate::constants::MIN_PASSWORD_LENGTH;

// =============================================================================
// Password Hashing
// =============================================================================

/// Turns a password into the opaque token stored on the user record.
///
/// Neither scheme is a password KDF; both exist so stored tokens can be
/// compared without keeping plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordHasher {
    /// 32-bit `h * 31 + c` over UTF-16 code units, rendered in decimal.
    /// Matches tokens written by the browser build of the portal.
    Rolling,
    /// `SHA256(password + pepper)`, hex encoded
    Peppered { pepper: String },
}

impl PasswordHasher {
    pub fn hash(&self, password: &str) -> String {
        match self {
            PasswordHasher::Rolling => rolling_hash(password).to_string(),
            PasswordHasher::Peppered { pepper } => apply_pepper(password, pepper),
        }
    }

    pub fn verify(&self, password: &str, token: &str) -> bool {
        self.hash(password) == token
    }
}

/// Configuration name of a hashing scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    Rolling,
    Peppered,
}

impl FromStr for PasswordScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rolling" => Ok(PasswordScheme::Rolling),
            "peppered" | "sha256" => Ok(PasswordScheme::Peppered),
            other => Err(format!("Unknown password scheme: {}", other)),
        }
    }
}

/// Additive rolling hash with 32-bit wraparound
pub fn rolling_hash(password: &str) -> i32 {
    password.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Apply a server-side pepper to a password
///
/// `token = SHA256(password + pepper)`
pub fn apply_pepper(password: &str, pepper: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(pepper.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Registration Input Checks
// =============================================================================

/// `local@domain.tld`: no whitespace, exactly one `@`, and a `.` inside the
/// domain with text on both sides
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// At least 8 characters with one lowercase, one uppercase and one digit
pub fn validate_password_strength(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
