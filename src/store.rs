use crate::error::NoteError;
use crate::note::Note;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All notes, newest first.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NoteStore {
    notes: Vec<Note>,
    created_at: Option<DateTime<Utc>>,
}

impl NoteStore {
    pub fn new() -> Self {
        NoteStore {
            notes: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn create(&mut self, title: &str, content: &str, tags: Vec<String>) -> &Note {
        let note = Note::new(title, content, tags);
        tracing::debug!(note_id = %note.id(), "note created");
        self.notes.insert(0, note);
        &self.notes[0]
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id() == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Note, NoteError> {
        self.notes
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or(NoteError::NotFound(id))
    }

    /// Resolves a full id or an unambiguous id prefix.
    pub fn resolve(&self, prefix: &str) -> Option<Uuid> {
        if let Ok(id) = Uuid::parse_str(prefix) {
            return self.get(id).map(Note::id);
        }
        if prefix.is_empty() {
            return None;
        }

        let mut matches = self
            .notes
            .iter()
            .filter(|n| n.id().to_string().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(note), None) => Some(note.id()),
            _ => None,
        }
    }

    pub fn update(
        &mut self,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<(), NoteError> {
        self.get_mut(id)?.edit(title, content, tags)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Note, NoteError> {
        let pos = self
            .notes
            .iter()
            .position(|n| n.id() == id)
            .ok_or(NoteError::NotFound(id))?;
        Ok(self.notes.remove(pos))
    }

    /// Flips the pin flag and returns the new state.
    pub fn toggle_pin(&mut self, id: Uuid) -> Result<bool, NoteError> {
        Ok(self.get_mut(id)?.toggle_pin())
    }

    pub fn encrypt(&mut self, id: Uuid, password: &str) -> Result<(), NoteError> {
        self.get_mut(id)?.encrypt(password)
    }

    pub fn decrypt(&mut self, id: Uuid, password: &str) -> Result<(), NoteError> {
        self.get_mut(id)?.decrypt(password)
    }

    /// Case-insensitive search; a blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let query = query.trim().to_lowercase();
        self.notes
            .iter()
            .filter(|n| query.is_empty() || n.matches(&query))
            .collect()
    }

    pub fn with_tag(&self, tag: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.tags().iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Every tag in use, sorted and deduplicated.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .notes
            .iter()
            .flat_map(|n| n.tags().iter().map(String::as_str))
            .collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    /// Pinned notes first, then most recently updated.
    pub fn sorted(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.iter().collect();
        sort_for_display(&mut notes);
        notes
    }

    pub fn pinned(&self) -> Vec<&Note> {
        self.notes.iter().filter(|n| n.is_pinned()).collect()
    }

    pub fn recent(&self, n: usize) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.iter().collect();
        notes.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        notes.truncate(n);
        notes
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

pub fn sort_for_display(notes: &mut [&Note]) {
    notes.sort_by(|a, b| {
        b.is_pinned()
            .cmp(&a.is_pinned())
            .then_with(|| b.updated_at().cmp(&a.updated_at()))
    });
}
