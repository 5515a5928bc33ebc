pub mod crypto;
mod error;
pub mod note;
mod storage;
mod store;
pub mod text;

pub use crate::crypto::{decrypt_text, encrypt_text};
pub use crate::error::{CryptoError, NoteError};
pub use crate::note::{FieldCipher, Note, PasswordCipher};
pub use crate::storage::Storage;
pub use crate::store::{NoteStore, sort_for_display};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use uuid::Uuid;

/// A note collection bound to its backing file.
pub struct Notebook {
    store: NoteStore,
    storage: Storage,
}

impl Notebook {
    pub fn open() -> Result<Self> {
        Self::open_with_storage(default_storage()?)
    }

    pub fn open_with_storage(storage: Storage) -> Result<Self> {
        let store = storage.load()?;
        Ok(Self { store, storage })
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NoteStore {
        &mut self.store
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Looks up a note by full id or unique id prefix.
    pub fn find(&self, id: &str) -> Result<&Note> {
        let id = self.resolve(id)?;
        self.store.get(id).context("note not found")
    }

    pub fn resolve(&self, id: &str) -> Result<Uuid> {
        self.store
            .resolve(id)
            .with_context(|| format!("no note matches id '{id}'"))
    }

    pub fn save(&self) -> Result<()> {
        self.storage.save(&self.store)
    }
}

pub fn default_storage() -> Result<Storage> {
    let project_dirs =
        ProjectDirs::from("", "", "notelock").context("could not determine platform directories")?;

    Ok(Storage::new(project_dirs.data_dir().join("notes.json")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn notebook_persists_encrypted_note_across_opens() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("notes.json"));

        let mut nb = Notebook::open_with_storage(storage.clone()).unwrap();
        let id = nb
            .store_mut()
            .create("Shopping List", "<p>milk, eggs</p>", vec![])
            .id();
        nb.store_mut().encrypt(id, "correct-horse-battery").unwrap();
        nb.save().unwrap();

        let mut nb2 = Notebook::open_with_storage(storage).unwrap();
        let note = nb2.find(&id.to_string()).unwrap();
        assert!(note.is_encrypted());
        assert_eq!(note.word_count(), 0);

        assert!(nb2.store_mut().decrypt(id, "wrong-password").is_err());
        assert!(nb2.store().get(id).unwrap().is_encrypted());

        nb2.store_mut().decrypt(id, "correct-horse-battery").unwrap();
        let note = nb2.store().get(id).unwrap();
        assert_eq!(note.title(), "Shopping List");
        assert_eq!(note.content(), "<p>milk, eggs</p>");
        assert!(note.word_count() > 0);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let dir = tempdir().unwrap();
        let nb = Notebook::open_with_storage(Storage::new(dir.path().join("n.json"))).unwrap();
        assert!(nb.find("deadbeef").is_err());
    }
}
