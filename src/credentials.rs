use crate::constants::{ADMIN_KEYS, VIEWER_KEYS};
use crate::models::Role;

/// Classification of a registration key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Admin,
    Viewer,
    Invalid,
}

impl KeyClass {
    pub fn role(self) -> Option<Role> {
        match self {
            KeyClass::Admin => Some(Role::Admin),
            KeyClass::Viewer => Some(Role::Viewer),
            KeyClass::Invalid => None,
        }
    }
}

/// Static sets of registration keys. Keys are configuration and never change
/// at runtime.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    admin_keys: Vec<String>,
    viewer_keys: Vec<String>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(ADMIN_KEYS, VIEWER_KEYS)
    }
}

impl CredentialStore {
    pub fn new<A, V>(admin_keys: A, viewer_keys: V) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        Self {
            admin_keys: admin_keys
                .into_iter()
                .map(|k| k.as_ref().to_ascii_uppercase())
                .collect(),
            viewer_keys: viewer_keys
                .into_iter()
                .map(|k| k.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Classify a key, ignoring case and surrounding whitespace
    pub fn classify(&self, key: &str) -> KeyClass {
        let key = key.trim().to_ascii_uppercase();

        if self.admin_keys.iter().any(|k| *k == key) {
            KeyClass::Admin
        } else if self.viewer_keys.iter().any(|k| *k == key) {
            KeyClass::Viewer
        } else {
            KeyClass::Invalid
        }
    }
}
