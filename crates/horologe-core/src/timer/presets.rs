use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Instant;
use crate::error::ValidationError;
use crate::events::Event;

/// A named countdown duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPreset {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
}

/// Saved countdown presets in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetBook {
    presets: Vec<SavedPreset>,
}

impl PresetBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[SavedPreset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&SavedPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Save a preset under a fresh id. The name is trimmed and must not be empty.
    pub fn save(
        &mut self,
        name: &str,
        duration_ms: u64,
        now: Instant,
    ) -> Result<Event, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName("preset"));
        }
        let preset = SavedPreset {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            duration_ms,
        };
        self.presets.push(preset.clone());
        Ok(Event::PresetSaved {
            preset,
            at: now.to_utc(),
        })
    }

    /// Remove a preset. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &str, now: Instant) -> Option<Event> {
        let idx = self.presets.iter().position(|p| p.id == id)?;
        let removed = self.presets.remove(idx);
        Some(Event::PresetDeleted {
            id: removed.id,
            at: now.to_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn save_keeps_insertion_order() {
        let mut book = PresetBook::new();
        book.save("Tea", 180_000, at(0)).unwrap();
        book.save("Eggs", 420_000, at(0)).unwrap();
        let names: Vec<_> = book.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Tea", "Eggs"]);
        assert_ne!(book.list()[0].id, book.list()[1].id);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut book = PresetBook::new();
        assert_eq!(
            book.save("   ", 1_000, at(0)),
            Err(ValidationError::EmptyName("preset"))
        );
        assert!(book.is_empty());
    }

    #[test]
    fn delete_unknown_is_noop() {
        let mut book = PresetBook::new();
        book.save("Tea", 180_000, at(0)).unwrap();
        assert!(book.delete("missing", at(0)).is_none());
        let id = book.list()[0].id.clone();
        assert!(book.delete(&id, at(0)).is_some());
        assert!(book.get(&id).is_none());
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut book = PresetBook::new();
        book.save("Tea", 180_000, at(0)).unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json[0]["name"], "Tea");
        assert_eq!(json[0]["durationMs"], 180_000);
    }
}
