//! Role based authorization of the current user.

use crate::error::SessionError;
use micro_router::{Authorizer, Security};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct Session {
    roles: Vec<String>,
    authorized_on: Instant,
    expires_on: Option<Instant>,
}

impl Session {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_on.is_some_and(|expires_on| now >= expires_on)
    }
}

/// The authorization state of one user.
///
/// A session is opened by [`UserSession::authorize`] and lasts until
/// [`UserSession::unauthorize`] or until it expires. Checking an expired session
/// clears it.
#[derive(Debug)]
pub struct UserSession {
    expires: Duration,
    session: Mutex<Option<Session>>,
}

impl UserSession {
    pub fn new(expires: Duration) -> Self {
        Self { expires, session: Mutex::new(None) }
    }

    /// Opens a session holding `roles`, replacing any previous one.
    ///
    /// # Errors
    /// [`SessionError::NoRoles`] when no non-empty role is given.
    pub fn authorize<I, S>(&self, roles: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).filter(|role| !role.is_empty()).collect();
        if roles.is_empty() {
            return Err(SessionError::NoRoles);
        }

        let now = Instant::now();
        debug!(?roles, expires = ?self.expires, "user authorized");
        *self.lock() = Some(Session { roles, authorized_on: now, expires_on: now.checked_add(self.expires) });
        Ok(())
    }

    pub fn unauthorize(&self) {
        if self.lock().take().is_some() {
            debug!("user unauthorized");
        }
    }

    /// True when an unexpired session holds at least one of `roles`.
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        let mut session = self.lock();
        let Some(current) = session.as_ref() else {
            return false;
        };

        if current.is_expired(Instant::now()) {
            debug!(authorized_for = ?current.authorized_on.elapsed(), "session expired");
            *session = None;
            return false;
        }

        roles.iter().any(|role| current.roles.iter().any(|held| held == role.as_ref()))
    }

    /// The roles of the current session, empty when there is none.
    pub fn roles(&self) -> Vec<String> {
        self.lock().as_ref().map(|session| session.roles.clone()).unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Authorizer for UserSession {
    fn is_authorized(&self, security: &Security) -> bool {
        self.has_any_role(security.roles())
    }
}

#[cfg(test)]
mod tests {
    use super::UserSession;
    use crate::error::SessionError;
    use micro_router::{Authorizer, Security};
    use std::time::Duration;

    #[test]
    fn test_authorize_and_check() {
        let session = UserSession::new(Duration::from_secs(60));
        assert!(!session.has_any_role(&["admin"]));

        session.authorize(["editor", "admin"]).unwrap();
        assert!(session.has_any_role(&["admin"]));
        assert!(session.has_any_role(&["guest", "editor"]));
        assert!(!session.has_any_role(&["guest"]));
        assert_eq!(session.roles(), ["editor", "admin"]);

        assert!(session.is_authorized(&Security::from("admin")));
        assert!(!session.is_authorized(&Security::from(["owner"])));
    }

    #[test]
    fn test_unauthorize() {
        let session = UserSession::new(Duration::from_secs(60));
        session.authorize(["admin"]).unwrap();
        session.unauthorize();
        assert!(!session.has_any_role(&["admin"]));
        assert!(session.roles().is_empty());
    }

    #[test]
    fn test_expired_session_is_cleared() {
        let session = UserSession::new(Duration::ZERO);
        session.authorize(["admin"]).unwrap();
        assert!(!session.has_any_role(&["admin"]));
        assert!(session.roles().is_empty());
    }

    #[test]
    fn test_no_roles() {
        let session = UserSession::new(Duration::from_secs(60));
        assert_eq!(session.authorize(Vec::<String>::new()), Err(SessionError::NoRoles));
        assert_eq!(session.authorize([""]), Err(SessionError::NoRoles));
    }
}
