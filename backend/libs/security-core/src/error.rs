use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("invalid base32 encoding")]
    InvalidEncoding,

    #[error("too many failed attempts")]
    RateLimited,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is not active")]
    AccountInactive,

    #[error("invalid two-factor code")]
    InvalidTotp,

    #[error("csrf token mismatch")]
    CsrfMismatch,

    #[error("cache error: {0}")]
    Cache(#[from] cache_core::CacheError),

    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SecurityError>;

impl SecurityError {
    /// Message safe to show the end user.
    ///
    /// The three authentication failures collapse into one phrase so a login
    /// response does not reveal which check rejected the attempt; the audit
    /// log keeps the specific reason.
    pub fn user_message(&self) -> &'static str {
        match self {
            SecurityError::RateLimited => "Too many attempts. Please try again later.",
            SecurityError::InvalidCredentials
            | SecurityError::AccountInactive
            | SecurityError::InvalidTotp => "Invalid login.",
            SecurityError::CsrfMismatch => "Request could not be verified.",
            SecurityError::InvalidEncoding => "Invalid code.",
            SecurityError::Cache(_) | SecurityError::Store(_) | SecurityError::Internal(_) => {
                "Something went wrong."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_share_one_user_message() {
        assert_eq!(
            SecurityError::InvalidCredentials.user_message(),
            SecurityError::AccountInactive.user_message()
        );
        assert_eq!(
            SecurityError::InvalidCredentials.user_message(),
            SecurityError::InvalidTotp.user_message()
        );
    }
}
