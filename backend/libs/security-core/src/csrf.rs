/// Anti-forgery tokens bound to the session identifier.
use std::sync::Arc;

use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::clock::Clock;
use crate::compare::constant_time_eq;
use crate::config::CsrfConfig;
use crate::error::{Result, SecurityError};
use crate::session::SessionState;

type HmacSha256 = Hmac<Sha256>;

/// Soft rotation bound: uses beyond this force a fresh token on `issue`.
const MAX_USES: u32 = 10;
/// Soft rotation bound on age, applied in `issue`.
const ROTATE_AFTER_SECONDS: u64 = 3600;
/// Hard ceiling on age, applied in `check` regardless of use count.
const HARD_CEILING_SECONDS: u64 = 7200;

/// Token record stored inside the session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfRecord {
    pub token: String,
    /// HMAC-SHA256(token || session id, app key), hex encoded. Binding the
    /// hash to the session id means a leaked token cannot be replayed
    /// against a different session.
    pub hash: String,
    pub created_at: u64,
    pub uses: u32,
}

pub struct CsrfGuard {
    key: Vec<u8>,
    header_name: String,
    clock: Arc<dyn Clock>,
}

impl CsrfGuard {
    pub fn new(config: CsrfConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: config.key_bytes(),
            header_name: config.header_name,
            clock,
        }
    }

    /// Header the request layer should read when a form carries no token.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Return the session's token, minting or rotating as needed.
    ///
    /// Every call counts as a use, including idempotent re-renders of the
    /// same form, so the 10-use ceiling is a soft rotation bound rather
    /// than a strict replay counter. A page opened in many tabs can burn
    /// through the quota early; the next issue simply rotates the token.
    pub fn issue(&self, session: &mut SessionState) -> Result<String> {
        let now = self.clock.unix_now();

        if let Some(record) = &session.csrf {
            if record.uses > MAX_USES
                || now.saturating_sub(record.created_at) > ROTATE_AFTER_SECONDS
            {
                session.csrf = None;
            }
        }

        if session.csrf.is_none() {
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            let token = hex::encode(bytes);
            let hash = self.hash(&token, &session.id)?;
            session.csrf = Some(CsrfRecord {
                token,
                hash,
                created_at: now,
                uses: 0,
            });
        }

        match session.csrf.as_mut() {
            Some(record) => {
                record.uses += 1;
                Ok(record.token.clone())
            }
            None => Err(SecurityError::Internal(
                "csrf record missing after mint".to_string(),
            )),
        }
    }

    /// Validate a supplied token against the session's record.
    ///
    /// `form_token` takes precedence; `header_token` is the designated
    /// header fallback. Records older than the hard ceiling are invalidated
    /// even when their hash still matches.
    pub fn check(
        &self,
        session: &mut SessionState,
        form_token: Option<&str>,
        header_token: Option<&str>,
    ) -> bool {
        let Some(record) = session.csrf.clone() else {
            return false;
        };
        let Some(supplied) = form_token.or(header_token) else {
            return false;
        };

        let Ok(expected) = self.hash(supplied, &session.id) else {
            return false;
        };
        if !constant_time_eq(record.hash.as_bytes(), expected.as_bytes()) {
            return false;
        }

        if self.clock.unix_now().saturating_sub(record.created_at) > HARD_CEILING_SECONDS {
            session.csrf = None;
            return false;
        }

        true
    }

    /// Drop the session's token record; the next `issue` starts fresh.
    pub fn invalidate(&self, session: &mut SessionState) {
        session.csrf = None;
    }

    fn hash(&self, token: &str, session_id: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|_| SecurityError::Internal("hmac rejected key".to_string()))?;
        mac.update(token.as_bytes());
        mac.update(session_id.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn guard(clock: Arc<ManualClock>) -> CsrfGuard {
        CsrfGuard::new(CsrfConfig::default(), clock)
    }

    #[test]
    fn issued_token_passes_check() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        let token = g.issue(&mut session).unwrap();
        assert!(g.check(&mut session, Some(&token), None));
    }

    #[test]
    fn header_fallback_is_accepted() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        let token = g.issue(&mut session).unwrap();
        assert!(g.check(&mut session, None, Some(&token)));
        assert_eq!(g.header_name(), "X-CSRF-TOKEN");
    }

    #[test]
    fn missing_record_or_token_fails() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        assert!(!g.check(&mut session, Some("deadbeef"), None));
        g.issue(&mut session).unwrap();
        assert!(!g.check(&mut session, None, None));
    }

    #[test]
    fn wrong_token_fails() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        g.issue(&mut session).unwrap();
        assert!(!g.check(&mut session, Some("0000000000"), None));
    }

    #[test]
    fn token_is_bound_to_session_id() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        let token = g.issue(&mut session).unwrap();

        // Same record under a different session id: the hash no longer
        // matches, so a leaked token cannot cross sessions.
        let mut other = session.clone();
        other.regenerate_id();
        assert!(!g.check(&mut other, Some(&token), None));
        assert!(g.check(&mut session, Some(&token), None));
    }

    #[test]
    fn token_rotates_after_use_quota() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        let first = g.issue(&mut session).unwrap();
        // Uses 2..=11 still return the original token; the record only
        // trips the `uses > 10` bound on the issue after that.
        for _ in 0..10 {
            assert_eq!(g.issue(&mut session).unwrap(), first);
        }
        let rotated = g.issue(&mut session).unwrap();
        assert_ne!(rotated, first);
    }

    #[test]
    fn token_rotates_after_soft_age_bound() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock.clone());
        let mut session = SessionState::anonymous();

        let first = g.issue(&mut session).unwrap();
        clock.advance(3601);
        let rotated = g.issue(&mut session).unwrap();
        assert_ne!(rotated, first);
    }

    #[test]
    fn hard_ceiling_invalidates_on_check() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock.clone());
        let mut session = SessionState::anonymous();

        let token = g.issue(&mut session).unwrap();
        clock.advance(7201);
        assert!(!g.check(&mut session, Some(&token), None));
        assert!(session.csrf.is_none());
    }

    #[test]
    fn check_does_not_consume_quota() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        let token = g.issue(&mut session).unwrap();
        for _ in 0..50 {
            assert!(g.check(&mut session, Some(&token), None));
        }
        assert_eq!(session.csrf.as_ref().map(|r| r.uses), Some(1));
    }

    #[test]
    fn invalidate_forces_fresh_token() {
        let clock = Arc::new(ManualClock::new(1000));
        let g = guard(clock);
        let mut session = SessionState::anonymous();

        let first = g.issue(&mut session).unwrap();
        g.invalidate(&mut session);
        assert!(!g.check(&mut session, Some(&first), None));
        let second = g.issue(&mut session).unwrap();
        assert_ne!(second, first);
    }
}
