/// Session state and principal types
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::csrf::CsrfRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Owner,
}

/// The authenticated identity carried by a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPrincipal {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Server-side state for one client session.
///
/// The caller's session layer owns this value and hands handlers exclusive
/// mutable access for the duration of a request; that exclusivity is what
/// serializes check-and-refresh and CSRF use counting per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: String,
    pub principal: Option<SessionPrincipal>,
    /// Unix seconds of the last authenticated activity.
    pub last_activity: u64,
    pub csrf: Option<CsrfRecord>,
}

impl SessionState {
    /// Fresh anonymous session with a random identifier.
    pub fn anonymous() -> Self {
        Self {
            id: new_session_id(),
            principal: None,
            last_activity: 0,
            csrf: None,
        }
    }

    /// Swap in a new session identifier, preventing fixation across the
    /// anonymous-to-authenticated transition.
    pub fn regenerate_id(&mut self) {
        self.id = new_session_id();
    }

    /// Wipe everything and start over as a new anonymous session.
    pub fn clear(&mut self) {
        *self = Self::anonymous();
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sessions_get_unique_ids() {
        let a = SessionState::anonymous();
        let b = SessionState::anonymous();
        assert_ne!(a.id, b.id);
        assert!(!a.is_authenticated());
    }

    #[test]
    fn regenerate_replaces_id() {
        let mut session = SessionState::anonymous();
        let before = session.id.clone();
        session.regenerate_id();
        assert_ne!(session.id, before);
    }

    #[test]
    fn clear_resets_to_anonymous() {
        let mut session = SessionState::anonymous();
        session.principal = Some(SessionPrincipal {
            user_id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            role: Role::User,
        });
        session.last_activity = 123;
        let before = session.id.clone();

        session.clear();
        assert!(session.principal.is_none());
        assert_eq!(session.last_activity, 0);
        assert!(session.csrf.is_none());
        assert_ne!(session.id, before);
    }
}
