/// Time-based one-time passwords (RFC 6238) over HMAC-SHA1 (RFC 4226).
use std::sync::Arc;

use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;

use crate::base32;
use crate::clock::Clock;
use crate::compare::constant_time_eq;
use crate::config::TotpConfig;
use crate::error::{Result, SecurityError};

type HmacSha1 = Hmac<Sha1>;

/// Derive the code for one counter value.
///
/// HMAC-SHA1 over the 8-byte big-endian counter, then RFC 4226 dynamic
/// truncation: the low 4 bits of the final digest byte select an offset,
/// 4 bytes there are read big-endian with the top bit masked, and the
/// result is reduced modulo 10^digits and zero-padded. The sequence must
/// match the RFC exactly or standard authenticator apps disagree with us.
pub fn hotp(secret: &[u8], counter: u64, digits: u32) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret)
        .map_err(|_| SecurityError::Internal("hmac rejected key".to_string()))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let value = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);

    let code = value % 10u32.pow(digits);
    Ok(format!("{:0width$}", code, width = digits as usize))
}

/// Validates submitted codes against a shared secret within a drift window,
/// and produces the enrollment artifacts handed to the QR renderer.
#[derive(Clone)]
pub struct TotpVerifier {
    config: TotpConfig,
    clock: Arc<dyn Clock>,
}

impl TotpVerifier {
    pub fn new(config: TotpConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Generate a new shared secret, already in the base32 alphabet form
    /// authenticator apps consume (32 symbols, 160 bits).
    pub fn generate_secret(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..32)
            .map(|_| base32::ALPHABET[rng.gen_range(0..base32::ALPHABET.len())] as char)
            .collect()
    }

    /// Build the `otpauth://` provisioning URI for a QR code.
    pub fn enrollment_uri(&self, email: &str, secret: &str) -> String {
        format!(
            "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}&digits={digits}&period={period}&algorithm=SHA1",
            issuer = urlencoding::encode(&self.config.issuer),
            account = urlencoding::encode(email),
            secret = secret,
            digits = self.config.digits,
            period = self.config.period,
        )
    }

    /// Check a submitted code against the secret.
    ///
    /// Scans every counter in `now/period ± window` so clock drift between
    /// server and device is tolerated; comparison is constant-time. A code
    /// that matches nowhere is `Ok(false)`; a malformed secret is an error.
    pub fn verify(&self, secret_text: &str, submitted: &str) -> Result<bool> {
        let digits = self.config.digits as usize;
        if submitted.len() != digits || !submitted.chars().all(|c| c.is_ascii_digit()) {
            return Ok(false);
        }

        let key = base32::decode(secret_text)?;
        let current = (self.clock.unix_now() / self.config.period) as i64;
        let window = self.config.window as i64;

        for offset in -window..=window {
            let counter = current + offset;
            if counter < 0 {
                continue;
            }
            let expected = hotp(&key, counter as u64, self.config.digits)?;
            if constant_time_eq(expected.as_bytes(), submitted.as_bytes()) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
