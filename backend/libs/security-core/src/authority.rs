/// Session lifecycle: login, activity timeout, logout, role queries.
use std::sync::Arc;

use chrono::DateTime;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::{Result, SecurityError};
use crate::password;
use crate::session::{Role, SessionPrincipal, SessionState};
use crate::store::{AccountStatus, AuditLog, CredentialStore, LoginAttempt};
use crate::throttle::LoginThrottle;
use crate::totp::TotpVerifier;

pub struct SessionAuthority {
    credentials: Arc<dyn CredentialStore>,
    audit: Arc<dyn AuditLog>,
    throttle: LoginThrottle,
    totp: TotpVerifier,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl SessionAuthority {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        audit: Arc<dyn AuditLog>,
        throttle: LoginThrottle,
        totp: TotpVerifier,
        config: SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            audit,
            throttle,
            totp,
            config,
            clock,
        }
    }

    pub fn throttle(&self) -> &LoginThrottle {
        &self.throttle
    }

    /// Authenticate an identifier/password pair, plus a TOTP code when the
    /// account has two-factor enrolled, and establish the session.
    ///
    /// The throttle gate runs before any credential read so a locked
    /// identifier cannot be distinguished from a slow path by timing, and
    /// the session id is regenerated on success to prevent fixation.
    pub async fn authenticate(
        &self,
        session: &mut SessionState,
        identifier: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> Result<SessionPrincipal> {
        if self.throttle.is_locked(identifier).await? {
            warn!("login rejected: identifier locked out");
            return Err(SecurityError::RateLimited);
        }

        let Some(record) = self.credentials.find_by_identifier(identifier).await? else {
            self.fail(identifier, "invalid credentials").await?;
            return Err(SecurityError::InvalidCredentials);
        };

        if !password::verify_password(password, &record.password_hash) {
            self.fail(identifier, "invalid credentials").await?;
            return Err(SecurityError::InvalidCredentials);
        }

        if record.status != AccountStatus::Active {
            self.fail(identifier, "account inactive").await?;
            return Err(SecurityError::AccountInactive);
        }

        if let Some(secret) = &record.totp_secret {
            let accepted = match totp_code {
                Some(code) => self.totp.verify(secret, code)?,
                None => false,
            };
            if !accepted {
                self.fail(identifier, "invalid 2fa code").await?;
                return Err(SecurityError::InvalidTotp);
            }
        }

        session.regenerate_id();
        let principal = SessionPrincipal {
            user_id: record.user_id,
            email: record.email.clone(),
            role: record.role,
        };
        session.principal = Some(principal.clone());
        session.last_activity = self.clock.unix_now();

        self.throttle.record_success(identifier).await?;
        self.audit
            .record(self.attempt(identifier, true, "login success"))
            .await?;
        info!(user_id = %principal.user_id, "login succeeded");

        Ok(principal)
    }

    /// Freshness check plus activity refresh; must run on every
    /// authenticated request.
    ///
    /// A session idle past the timeout is destroyed here, on the next
    /// check; an alive one gets its `last_activity` bumped to now.
    pub fn check(&self, session: &mut SessionState) -> bool {
        if session.principal.is_none() {
            return false;
        }

        let now = self.clock.unix_now();
        if now.saturating_sub(session.last_activity) > self.config.timeout_seconds {
            info!("session expired after inactivity");
            self.end_session(session);
            return false;
        }

        session.last_activity = now;
        true
    }

    /// Log out: wipe the session wholesale and start a fresh anonymous one.
    pub fn end_session(&self, session: &mut SessionState) {
        session.clear();
    }

    pub fn is_admin(&self, session: &mut SessionState) -> bool {
        self.check(session) && self.role_of(session) == Some(Role::Admin)
    }

    pub fn is_owner(&self, session: &mut SessionState) -> bool {
        self.check(session) && self.role_of(session) == Some(Role::Owner)
    }

    /// Owner-only capability; there is no separate permission store.
    pub fn can_manage_admins(&self, session: &mut SessionState) -> bool {
        self.check(session) && self.role_of(session) == Some(Role::Owner)
    }

    fn role_of(&self, session: &SessionState) -> Option<Role> {
        session.principal.as_ref().map(|p| p.role)
    }

    async fn fail(&self, identifier: &str, reason: &str) -> Result<()> {
        self.audit
            .record(self.attempt(identifier, false, reason))
            .await?;
        self.throttle.record_failure(identifier).await?;
        Ok(())
    }

    fn attempt(&self, identifier: &str, success: bool, reason: &str) -> LoginAttempt {
        LoginAttempt {
            identifier: identifier.to_string(),
            success,
            reason: reason.to_string(),
            at: DateTime::from_timestamp(self.clock.unix_now() as i64, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}
