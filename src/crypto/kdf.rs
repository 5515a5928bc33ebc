use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_LEN, PBKDF2_ROUNDS, SALT_LEN};
use crate::error::CryptoError;

/// A 256-bit AES-GCM key, wiped on drop.
pub type DerivedKey = Zeroizing<[u8; KEY_LEN]>;

/// Derives the note key from `password` and `salt` with PBKDF2-HMAC-SHA256.
///
/// Identical inputs always yield the same key.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Result<DerivedKey, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidPassword);
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key[..]);

    Ok(key)
}
