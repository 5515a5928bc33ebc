//! Note records and their encrypted/plaintext state transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto;
use crate::error::{CryptoError, NoteError};
use crate::text::{char_count, word_count};

/// Title used for notes created without one, and sealed in place of an empty title.
pub const UNTITLED: &str = "Untitled Note";
/// Sealed in place of empty content.
const EMPTY_CONTENT: &str = " ";

/// Seals and opens single note fields.
pub trait FieldCipher {
    fn seal(&self, plaintext: &str, password: &str) -> Result<String, CryptoError>;
    fn open(&self, envelope: &str, password: &str) -> Result<Zeroizing<String>, CryptoError>;
}

/// PBKDF2 + AES-256-GCM envelopes, see [`crate::crypto`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordCipher;

impl FieldCipher for PasswordCipher {
    fn seal(&self, plaintext: &str, password: &str) -> Result<String, CryptoError> {
        crypto::encrypt_text(plaintext, password)
    }

    fn open(&self, envelope: &str, password: &str) -> Result<Zeroizing<String>, CryptoError> {
        crypto::decrypt_text(envelope, password)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: Uuid,
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_pinned: bool,
    #[serde(default)]
    is_encrypted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decrypted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    word_count: usize,
    #[serde(default)]
    char_count: usize,
}

impl Note {
    pub fn new(title: &str, content: &str, tags: Vec<String>) -> Self {
        let now = Utc::now();
        let title = if title.is_empty() { UNTITLED } else { title };

        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            tags: normalize_tags(tags),
            is_pinned: false,
            is_encrypted: false,
            created_at: now,
            updated_at: now,
            encrypted_at: None,
            decrypted_at: None,
            word_count: word_count(content),
            char_count: char_count(content),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The title, or its envelope while encrypted.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The HTML content, or its envelope while encrypted.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    pub fn is_encrypted(&self) -> bool {
        self.is_encrypted
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn encrypted_at(&self) -> Option<DateTime<Utc>> {
        self.encrypted_at
    }

    pub fn decrypted_at(&self) -> Option<DateTime<Utc>> {
        self.decrypted_at
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Updates any of title, content and tags.
    ///
    /// Title and content of an encrypted note cannot change; tags can.
    pub fn edit(
        &mut self,
        title: Option<&str>,
        content: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<(), NoteError> {
        if self.is_encrypted && (title.is_some() || content.is_some()) {
            return Err(NoteError::AlreadyEncrypted);
        }

        if let Some(title) = title {
            self.title = title.to_string();
        }
        if let Some(content) = content {
            self.content = content.to_string();
            self.word_count = word_count(content);
            self.char_count = char_count(content);
        }
        if let Some(tags) = tags {
            self.tags = normalize_tags(tags);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub(crate) fn toggle_pin(&mut self) -> bool {
        self.is_pinned = !self.is_pinned;
        self.is_pinned
    }

    /// Encrypts title and content with [`PasswordCipher`].
    pub fn encrypt(&mut self, password: &str) -> Result<(), NoteError> {
        self.apply_encryption(&PasswordCipher, password)
    }

    /// Decrypts title and content with [`PasswordCipher`].
    pub fn decrypt(&mut self, password: &str) -> Result<(), NoteError> {
        self.apply_decryption(&PasswordCipher, password)
    }

    /// Seals title and content as two independent envelopes.
    ///
    /// Both fields are sealed before anything is written, so on error the
    /// note is exactly as it was.
    pub fn apply_encryption<C: FieldCipher>(
        &mut self,
        cipher: &C,
        password: &str,
    ) -> Result<(), NoteError> {
        if self.is_encrypted {
            return Err(NoteError::AlreadyEncrypted);
        }
        if password.is_empty() {
            return Err(CryptoError::InvalidPassword.into());
        }

        let title = if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        };
        let content = if self.content.is_empty() {
            EMPTY_CONTENT
        } else {
            &self.content
        };

        let sealed_title = cipher.seal(title, password)?;
        let sealed_content = cipher.seal(content, password)?;

        self.title = sealed_title;
        self.content = sealed_content;
        self.is_encrypted = true;
        self.encrypted_at = Some(Utc::now());
        self.word_count = 0;
        self.char_count = 0;

        tracing::info!(note_id = %self.id, "note encrypted");
        Ok(())
    }

    /// Opens both envelopes; on any failure the note stays encrypted and unchanged.
    pub fn apply_decryption<C: FieldCipher>(
        &mut self,
        cipher: &C,
        password: &str,
    ) -> Result<(), NoteError> {
        if !self.is_encrypted {
            return Err(NoteError::NotEncrypted);
        }

        let title = cipher.open(&self.title, password)?;
        let content = cipher.open(&self.content, password)?;

        self.title = title.as_str().to_owned();
        self.content = content.as_str().to_owned();
        self.is_encrypted = false;
        self.decrypted_at = Some(Utc::now());
        self.word_count = word_count(&self.content);
        self.char_count = char_count(&self.content);

        tracing::info!(note_id = %self.id, "note decrypted");
        Ok(())
    }

    /// Whether the note matches a lowercase search query.
    ///
    /// Encrypted notes only expose tags and creation date.
    pub(crate) fn matches(&self, query: &str) -> bool {
        let tag_match = self
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(query));

        if self.is_encrypted {
            let date = self.created_at.format("%Y-%m-%d").to_string();
            return tag_match || date.contains(query);
        }

        tag_match
            || self.title.to_lowercase().contains(query)
            || self.content.to_lowercase().contains(query)
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
