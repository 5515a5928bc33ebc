use thiserror::Error;
use uuid::Uuid;

/// Failures of the password-based encryption layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("password must not be empty")]
    InvalidPassword,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),

    /// Wrong password and tampered ciphertext are indistinguishable here.
    #[error("incorrect password or corrupted data")]
    AuthenticationFailure,

    #[error("OS random generator unavailable")]
    Randomness,

    #[error("encryption failed")]
    Encryption,
}

/// Failures of note-level operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    #[error("note is already encrypted")]
    AlreadyEncrypted,

    #[error("note is not encrypted")]
    NotEncrypted,

    #[error("note '{0}' not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
