use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{AccessDenied, Result};
use crate::models::{Role, Session, User};
use crate::store::{load_value, save_value, tables, KvStore, StoreError};

/// Where the portal is in the login flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unauthenticated,
    Authenticating,
    Authenticated(Role),
}

/// Who is logged in for this profile.
///
/// State is persisted under `currentUser`, `isLoggedIn` and `rememberUser` so
/// it survives a restart.
pub struct SessionState {
    store: Arc<dyn KvStore>,
    authenticating: AtomicBool,
}

impl SessionState {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            authenticating: AtomicBool::new(false),
        }
    }

    pub fn login(&self, user: &User, remember: bool) -> Result<Session> {
        let session = Session::from(user);

        save_value(self.store.as_ref(), tables::CURRENT_USER, &session)?;
        self.store.set(tables::IS_LOGGED_IN, b"true")?;
        if remember {
            self.store.set(tables::REMEMBER_USER, b"true")?;
        } else {
            self.store.remove(tables::REMEMBER_USER)?;
        }

        tracing::info!("{} logged in as {}", session.username, session.role);
        Ok(session)
    }

    pub fn logout(&self) -> Result<()> {
        for key in [tables::CURRENT_USER, tables::IS_LOGGED_IN, tables::REMEMBER_USER] {
            self.store.remove(key)?;
        }
        tracing::info!("Session cleared");
        Ok(())
    }

    /// The logged-in user, if any.
    ///
    /// A missing flag, a missing record or a record that no longer parses all
    /// read as "nobody is logged in".
    pub fn current(&self) -> Result<Option<Session>> {
        let logged_in = self.store.get(tables::IS_LOGGED_IN)?;
        if logged_in.as_deref() != Some(&b"true"[..]) {
            return Ok(None);
        }

        match load_value::<Session>(self.store.as_ref(), tables::CURRENT_USER) {
            Ok(session) => Ok(session),
            Err(e @ StoreError::Malformed { .. }) => {
                tracing::warn!("Ignoring unreadable session: {}", e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn remembered(&self) -> Result<bool> {
        Ok(self.store.get(tables::REMEMBER_USER)?.as_deref() == Some(&b"true"[..]))
    }

    /// Gate an operation on the session role
    pub fn require_role(&self, allowed: &[Role]) -> Result<Session> {
        let session = self.current()?.ok_or(AccessDenied::NoSession)?;

        if !session.role.satisfies(allowed) {
            tracing::warn!("{} denied: role {} not in {:?}", session.username, session.role, allowed);
            return Err(AccessDenied::RoleNotAllowed.into());
        }

        Ok(session)
    }

    pub fn begin_authentication(&self) {
        self.authenticating.store(true, Ordering::SeqCst);
    }

    pub fn end_authentication(&self) {
        self.authenticating.store(false, Ordering::SeqCst);
    }

    pub fn phase(&self) -> Result<AuthPhase> {
        if self.authenticating.load(Ordering::SeqCst) {
            return Ok(AuthPhase::Authenticating);
        }

        Ok(match self.current()? {
            Some(session) => AuthPhase::Authenticated(session.role),
            None => AuthPhase::Unauthenticated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "96354".to_string(),
            registration_key: "ADMIN-MASTER-2024".to_string(),
            role,
            created_at: Utc::now(),
            is_premium: true,
        }
    }

    fn state() -> (Arc<dyn KvStore>, SessionState) {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        (store.clone(), SessionState::new(store))
    }

    #[test]
    fn test_login_then_current() {
        let (_, state) = state();
        assert!(state.current().unwrap().is_none());

        let session = state.login(&user(Role::Viewer), false).unwrap();
        assert_eq!(state.current().unwrap(), Some(session));
        assert!(!state.remembered().unwrap());
    }

    #[test]
    fn test_logout_clears_everything() {
        let (store, state) = state();
        state.login(&user(Role::Admin), true).unwrap();
        assert!(state.remembered().unwrap());

        state.logout().unwrap();
        assert!(state.current().unwrap().is_none());
        for key in [tables::CURRENT_USER, tables::IS_LOGGED_IN, tables::REMEMBER_USER] {
            assert!(store.get(key).unwrap().is_none());
        }
    }

    #[test]
    fn test_malformed_session_reads_as_none() {
        let (store, state) = state();
        store.set(tables::IS_LOGGED_IN, b"true").unwrap();
        store.set(tables::CURRENT_USER, b"{broken").unwrap();

        assert!(state.current().unwrap().is_none());
        assert!(matches!(
            state.require_role(&[Role::Viewer]),
            Err(AppError::AccessDenied(AccessDenied::NoSession))
        ));
    }

    #[test]
    fn test_flag_without_true_reads_as_none() {
        let (store, state) = state();
        state.login(&user(Role::Admin), false).unwrap();
        store.set(tables::IS_LOGGED_IN, b"false").unwrap();

        assert!(state.current().unwrap().is_none());
    }

    #[test]
    fn test_require_role() {
        let (_, state) = state();
        state.login(&user(Role::Viewer), false).unwrap();

        assert!(state.require_role(&[Role::Viewer]).is_ok());
        assert!(matches!(
            state.require_role(&[Role::Admin]),
            Err(AppError::AccessDenied(AccessDenied::RoleNotAllowed))
        ));

        state.login(&user(Role::Admin), false).unwrap();
        assert!(state.require_role(&[Role::Admin]).is_ok());
        assert!(state.require_role(&[Role::Viewer]).is_ok());
    }

    #[test]
    fn test_phase_transitions() {
        let (_, state) = state();
        assert_eq!(state.phase().unwrap(), AuthPhase::Unauthenticated);

        state.begin_authentication();
        assert_eq!(state.phase().unwrap(), AuthPhase::Authenticating);

        state.login(&user(Role::Admin), false).unwrap();
        state.end_authentication();
        assert_eq!(state.phase().unwrap(), AuthPhase::Authenticated(Role::Admin));

        state.logout().unwrap();
        assert_eq!(state.phase().unwrap(), AuthPhase::Unauthenticated);
    }
}
