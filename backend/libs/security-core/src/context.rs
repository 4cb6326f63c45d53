/// One security context per process, built once at startup and handed into
/// request handling by reference. Replaces ad hoc global state with an
/// explicit object whose collaborators (store, audit, cache, clock) are
/// injected, so tests run against in-memory fakes.
use std::sync::Arc;

use cache_core::Cache;
use uuid::Uuid;

use crate::authority::SessionAuthority;
use crate::clock::Clock;
use crate::config::SecurityConfig;
use crate::csrf::CsrfGuard;
use crate::error::Result;
use crate::store::{AuditLog, CredentialStore};
use crate::throttle::LoginThrottle;
use crate::totp::TotpVerifier;

pub struct SecurityContext {
    pub authority: SessionAuthority,
    pub csrf: CsrfGuard,
    credentials: Arc<dyn CredentialStore>,
    totp: TotpVerifier,
}

impl SecurityContext {
    pub fn new(
        config: SecurityConfig,
        credentials: Arc<dyn CredentialStore>,
        audit: Arc<dyn AuditLog>,
        cache: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let throttle = LoginThrottle::new(cache, config.throttle.clone());
        let totp = TotpVerifier::new(config.totp.clone(), clock.clone());

        Self {
            authority: SessionAuthority::new(
                credentials.clone(),
                audit,
                throttle,
                totp.clone(),
                config.session.clone(),
                clock.clone(),
            ),
            csrf: CsrfGuard::new(config.csrf, clock),
            credentials,
            totp,
        }
    }

    /// Begin two-factor enrollment: mint a secret, persist it, and return
    /// it together with the `otpauth://` URI the QR renderer consumes.
    /// The secret is never transmitted again after this provisioning step.
    pub async fn enroll_totp(&self, user_id: Uuid, email: &str) -> Result<(String, String)> {
        let secret = self.totp.generate_secret();
        self.credentials.set_totp_secret(user_id, &secret).await?;
        let uri = self.totp.enrollment_uri(email, &secret);
        Ok((secret, uri))
    }

    /// Disable two-factor auth, deleting the stored secret.
    pub async fn disable_totp(&self, user_id: Uuid) -> Result<()> {
        self.credentials.clear_totp_secret(user_id).await
    }
}
