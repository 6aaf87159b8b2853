use tracing::info;

use shared_models::UserSession;

use crate::error::SessionError;

/// Explicit session holder with a defined lifecycle: established once at app
/// start (after login), handed to workflow constructors, cleared on logout.
/// Views never reach into ambient storage for the current user.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<UserSession>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn establish(&mut self, session: UserSession) {
        info!("Session established for {} ({})", session.name, session.role);
        self.current = Some(session);
    }

    pub fn clear(&mut self) {
        if let Some(session) = self.current.take() {
            info!("Session cleared for {} ({})", session.name, session.role);
        }
    }

    pub fn current(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }

    pub fn require(&self) -> Result<&UserSession, SessionError> {
        self.current.as_ref().ok_or(SessionError::NotLoggedIn)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().and_then(|s| s.bearer_token())
    }
}
