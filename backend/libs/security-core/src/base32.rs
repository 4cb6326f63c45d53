//! RFC 4648 base32 decoding for authenticator shared secrets.

use crate::error::{Result, SecurityError};

/// The 32-symbol alphabet authenticator apps expect (A-Z, 2-7).
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Decode base32 text into raw bytes.
///
/// Input is case-insensitive and `=` padding is ignored wherever it appears.
/// Any character outside the alphabet fails with `InvalidEncoding`.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(text.len() * 5 / 8);

    for ch in text.chars() {
        if ch == '=' {
            continue;
        }
        let value = match ch.to_ascii_uppercase() {
            c @ 'A'..='Z' => c as u32 - 'A' as u32,
            c @ '2'..='7' => c as u32 - '2' as u32 + 26,
            _ => return Err(SecurityError::InvalidEncoding),
        };

        buffer = (buffer << 5) | value;
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            out.push(((buffer >> bits) & 0xff) as u8);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rfc_totp_seed() {
        // The RFC 6238 SHA-1 reference secret, ASCII "12345678901234567890".
        let decoded = decode("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(decoded, b"12345678901234567890");
    }

    #[test]
    fn decodes_lowercase_and_padded_input() {
        let reference = decode("JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(decode("jbswy3dpehpk3pxp").unwrap(), reference);
        assert_eq!(decode("JBSWY3DPEHPK3PXP====").unwrap(), reference);
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        for bad in ["JBSWY1", "ABC 23", "ABC!DE", "ABCD80"] {
            assert!(matches!(
                decode(bad),
                Err(SecurityError::InvalidEncoding)
            ));
        }
    }

    #[test]
    fn empty_input_decodes_to_empty() {
        assert!(decode("").unwrap().is_empty());
    }
}
