//! Storage encoding for one encrypted field.
//!
//! Envelope layout, base64 encoded (standard alphabet, padded):
//! ```text
//! SALT (16) | NONCE (12) | CIPHERTEXT + TAG (>= 16)
//! ```
//!
//! There is no magic or version field: changing lengths or order makes
//! previously stored notes undecryptable.

use super::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::CryptoError;
use base64::{Engine, engine::general_purpose::STANDARD};

/// Salt and nonce prefix length.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;
/// Smallest decoded envelope that can hold an authenticated ciphertext.
pub const MIN_LEN: usize = HEADER_LEN + TAG_LEN;

/// The unpacked parts of an envelope string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn new(salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            salt,
            nonce,
            ciphertext,
        }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Concatenates salt, nonce and ciphertext and base64-encodes the result.
    pub fn pack(&self) -> String {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());

        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);

        STANDARD.encode(buf)
    }

    /// Parses an envelope string.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] if:
    /// - the text contains characters outside the base64 alphabet
    /// - the text does not decode as base64
    /// - the decoded bytes cannot hold salt, nonce and a GCM tag
    pub fn unpack(text: &str) -> Result<Self, CryptoError> {
        if !looks_like_base64(text) {
            return Err(CryptoError::MalformedEnvelope("not base64 text"));
        }

        let data = STANDARD
            .decode(text)
            .map_err(|_| CryptoError::MalformedEnvelope("invalid base64"))?;

        if data.len() < HEADER_LEN {
            return Err(CryptoError::MalformedEnvelope("too short for salt and nonce"));
        }
        if data.len() < MIN_LEN {
            return Err(CryptoError::MalformedEnvelope("too short for ciphertext"));
        }

        let (salt, rest) = data.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        Ok(Self {
            salt: salt
                .try_into()
                .map_err(|_| CryptoError::MalformedEnvelope("invalid salt length"))?,
            nonce: nonce
                .try_into()
                .map_err(|_| CryptoError::MalformedEnvelope("invalid nonce length"))?,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Alphabet check for `[A-Za-z0-9+/]*={0,2}`.
fn looks_like_base64(text: &str) -> bool {
    let body = text.trim_end_matches('=');
    text.len() - body.len() <= 2
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new([1u8; SALT_LEN], [2u8; NONCE_LEN], vec![3u8; 21])
    }

    #[test]
    fn pack_layout_is_salt_nonce_ciphertext() {
        let bytes = STANDARD.decode(sample().pack()).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + 21);
        assert!(bytes[..16].iter().all(|&b| b == 1));
        assert!(bytes[16..28].iter().all(|&b| b == 2));
        assert!(bytes[28..].iter().all(|&b| b == 3));
    }

    #[test]
    fn unpack_inverts_pack() {
        let env = sample();
        assert_eq!(Envelope::unpack(&env.pack()).unwrap(), env);
    }

    #[test]
    fn unpack_accepts_bare_tag() {
        let env = Envelope::new([0u8; SALT_LEN], [0u8; NONCE_LEN], vec![0u8; TAG_LEN]);
        assert_eq!(Envelope::unpack(&env.pack()).unwrap().ciphertext().len(), TAG_LEN);
    }

    #[test]
    fn non_base64_text_is_rejected() {
        for text in ["<p>milk, eggs</p>", "abc def", "YWJj===", "-_-_"] {
            assert!(
                matches!(
                    Envelope::unpack(text),
                    Err(CryptoError::MalformedEnvelope(_))
                ),
                "{text:?} was accepted"
            );
        }
    }

    #[test]
    fn badly_padded_base64_is_rejected() {
        assert!(matches!(
            Envelope::unpack("QUJD="),
            Err(CryptoError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn too_short_is_rejected() {
        for len in [0usize, 27, 28, MIN_LEN - 1] {
            let text = STANDARD.encode(vec![0u8; len]);
            assert!(matches!(
                Envelope::unpack(&text),
                Err(CryptoError::MalformedEnvelope(_))
            ));
        }
    }
}
