// Security core: TOTP two-factor auth, session lifecycle, CSRF protection
// and login throttling for the Pantube platform.

pub mod authority;
pub mod base32;
pub mod clock;
pub mod compare;
pub mod config;
pub mod context;
pub mod csrf;
pub mod error;
pub mod password;
pub mod session;
pub mod store;
pub mod throttle;
pub mod totp;

pub use authority::SessionAuthority;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SecurityConfig;
pub use context::SecurityContext;
pub use csrf::CsrfGuard;
pub use error::{Result, SecurityError};
pub use session::{Role, SessionPrincipal, SessionState};
pub use store::{AccountStatus, AuditLog, CredentialRecord, CredentialStore, LoginAttempt};
pub use throttle::LoginThrottle;
pub use totp::TotpVerifier;
