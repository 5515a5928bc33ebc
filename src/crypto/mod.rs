//! Password-based encryption of note fields.
//!
//! Every call derives a fresh key from the password and a random salt,
//! seals the text with AES-256-GCM under a random nonce, and packs
//! `salt ‖ nonce ‖ ciphertext` into a base64 [`Envelope`].

pub mod aead;
pub mod envelope;
pub mod kdf;
pub mod password;

pub use aead::{decrypt, encrypt, generate_nonce, generate_salt};
pub use envelope::Envelope;
pub use kdf::{DerivedKey, derive_key};
pub use password::{PasswordStrength, assess_password, generate_password};

use crate::error::CryptoError;
use zeroize::Zeroizing;

/// Length of the salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the nonce (12 bytes for AES-GCM).
pub const NONCE_LEN: usize = 12;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the GCM authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Encrypts `plaintext` under `password` into an envelope string.
pub fn encrypt_text(plaintext: &str, password: &str) -> Result<String, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidPassword);
    }

    let salt = generate_salt()?;
    let nonce = generate_nonce()?;
    let key = derive_key(password, &salt)?;
    let ciphertext = encrypt(&key, &nonce, plaintext.as_bytes())?;

    tracing::debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "sealed text"
    );

    Ok(Envelope::new(salt, nonce, ciphertext).pack())
}

/// Decrypts an envelope string produced by [`encrypt_text`].
pub fn decrypt_text(envelope: &str, password: &str) -> Result<Zeroizing<String>, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidPassword);
    }

    let envelope = Envelope::unpack(envelope)?;
    let key = derive_key(password, envelope.salt())?;
    let plaintext = decrypt(&key, envelope.nonce(), envelope.ciphertext()).inspect_err(|_| {
        tracing::debug!("envelope failed authentication");
    })?;

    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| CryptoError::MalformedEnvelope("payload is not valid UTF-8"))?;

    Ok(Zeroizing::new(text.to_owned()))
}
