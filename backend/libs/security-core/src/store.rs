/// Storage collaborators the security core calls into.
///
/// The relational schema itself lives elsewhere; these traits are the
/// boundary the authority talks through, and tests implement them with
/// in-memory fixtures.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
    Banned,
}

#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub password_hash: String,
    /// Present iff two-factor auth is enrolled. Stored encrypted at rest by
    /// the implementing store; handed to the core in base32 text form.
    pub totp_secret: Option<String>,
}

impl CredentialRecord {
    pub fn totp_enabled(&self) -> bool {
        self.totp_secret.is_some()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<CredentialRecord>>;

    /// Enroll: persist the shared secret for a user.
    async fn set_totp_secret(&self, user_id: Uuid, secret: &str) -> Result<()>;

    /// Disable two-factor auth, deleting the secret.
    async fn clear_totp_secret(&self, user_id: Uuid) -> Result<()>;
}

/// One row of the append-only login audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct LoginAttempt {
    pub identifier: String,
    pub success: bool,
    pub reason: String,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, attempt: LoginAttempt) -> Result<()>;
}
