//! The visitor's in-progress ticket selection.
//!
//! [`SelectionSet`] is an ordered, duplicate-free list of ticket ids.
//! [`LocalSelectionStore`] owns the set for one page and keeps it mirrored in
//! [`ClientStorage`] under two keys: the raffle marker and the JSON-encoded
//! selection. Every mutation writes the candidate set first and only adopts
//! it in memory once the write has succeeded; a failed write leaves the
//! previous selection in place.

use crate::environment::ClientStorage;
use crate::error::StorageError;
use crate::ticket::{RaffleId, TicketId};
use serde::Serialize;
use serde_json::Value;

/// Storage key holding the raffle id the stored selection belongs to
pub const RAFFLE_MARKER_KEY: &str = "rifaIdSeleccionada";

/// Storage key holding the JSON array of selected ticket ids
pub const SELECTION_KEY: &str = "numerosSeleccionados";

/// Ordered set of selected ticket ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<TicketId>,
}

impl SelectionSet {
    /// Empty selection
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Whether `id` is selected
    #[must_use]
    pub fn contains(&self, id: &TicketId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in selection order
    pub fn iter(&self) -> std::slice::Iter<'_, TicketId> {
        self.ids.iter()
    }

    /// Selected ids in selection order
    #[must_use]
    pub fn as_slice(&self) -> &[TicketId] {
        &self.ids
    }

    /// Encode as the JSON array kept in storage and posted by the purchase form
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Decode a stored JSON array
    ///
    /// Members are coerced to strings: numbers become their decimal text.
    /// Members that are neither strings nor numbers, or that are not valid
    /// ticket ids, are dropped. Duplicates keep their first position.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] if the payload is not a JSON array.
    pub fn from_stored(raw: &str) -> Result<Self, StorageError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let Value::Array(members) = value else {
            return Err(StorageError::Corrupt(format!(
                "expected a JSON array, found {raw}"
            )));
        };

        let mut selection = Self::new();
        for member in members {
            let text = match member {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                other => {
                    tracing::debug!(member = %other, "Dropping non-scalar stored selection member");
                    continue;
                },
            };
            match TicketId::new(text) {
                Ok(id) if !selection.contains(&id) => selection.ids.push(id),
                Ok(_) => {},
                Err(error) => {
                    tracing::debug!(error = %error, "Dropping invalid stored selection member");
                },
            }
        }
        Ok(selection)
    }

    fn toggled(&self, id: &TicketId) -> Self {
        let mut next = self.clone();
        if let Some(index) = next.ids.iter().position(|selected| selected == id) {
            next.ids.remove(index);
        } else {
            next.ids.push(id.clone());
        }
        next
    }

    fn without(&self, id: &TicketId) -> Option<Self> {
        let index = self.ids.iter().position(|selected| selected == id)?;
        let mut next = self.clone();
        next.ids.remove(index);
        Some(next)
    }
}

impl FromIterator<TicketId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = TicketId>>(iter: I) -> Self {
        let mut selection = Self::new();
        for id in iter {
            if !selection.contains(&id) {
                selection.ids.push(id);
            }
        }
        selection
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a TicketId;
    type IntoIter = std::slice::Iter<'a, TicketId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// The selection for one page, mirrored in client storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSelectionStore {
    selection: SelectionSet,
}

impl LocalSelectionStore {
    /// Load the stored selection for `raffle`
    ///
    /// If the stored raffle marker differs from `raffle`, the stored
    /// selection is discarded and the marker is moved to `raffle` (when the
    /// page has one). Unreadable or corrupt storage loads as empty.
    #[must_use]
    pub fn load(storage: &dyn ClientStorage, raffle: Option<&RaffleId>) -> Self {
        let stored_marker = storage.get(RAFFLE_MARKER_KEY).unwrap_or_else(|error| {
            tracing::warn!(error = %error, "Could not read raffle marker");
            None
        });

        let current = raffle.map(RaffleId::as_str);
        if current != stored_marker.as_deref() {
            tracing::info!(
                stored = ?stored_marker,
                current = ?current,
                "Raffle changed since the selection was stored, discarding it"
            );
            if let Err(error) = storage.remove(SELECTION_KEY) {
                tracing::warn!(error = %error, "Could not discard stale selection");
            }
            if let Some(raffle) = raffle {
                if let Err(error) = storage.set(RAFFLE_MARKER_KEY, raffle.as_str()) {
                    tracing::warn!(error = %error, "Could not update raffle marker");
                }
            }
            return Self::default();
        }

        let selection = match storage.get(SELECTION_KEY) {
            Ok(Some(raw)) => SelectionSet::from_stored(&raw).unwrap_or_else(|error| {
                tracing::warn!(error = %error, "Stored selection is corrupt, starting empty");
                SelectionSet::new()
            }),
            Ok(None) => SelectionSet::new(),
            Err(error) => {
                tracing::warn!(error = %error, "Could not read stored selection");
                SelectionSet::new()
            },
        };

        tracing::debug!(selected = selection.len(), "Loaded selection");
        Self { selection }
    }

    /// Current selection
    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Add `id` if absent, remove it otherwise, and persist
    pub fn toggle(&mut self, storage: &dyn ClientStorage, id: &TicketId) -> &SelectionSet {
        let candidate = self.selection.toggled(id);
        self.commit(storage, candidate);
        &self.selection
    }

    /// Remove `id` if selected and persist; returns whether it was removed
    pub fn remove(&mut self, storage: &dyn ClientStorage, id: &TicketId) -> bool {
        match self.selection.without(id) {
            Some(candidate) => self.commit(storage, candidate),
            None => false,
        }
    }

    /// Empty the selection and persist
    pub fn clear(&mut self, storage: &dyn ClientStorage) {
        match storage.remove(SELECTION_KEY) {
            Ok(()) => self.selection = SelectionSet::new(),
            Err(error) => {
                tracing::warn!(error = %error, "Could not clear stored selection, keeping it");
            },
        }
    }

    fn commit(&mut self, storage: &dyn ClientStorage, candidate: SelectionSet) -> bool {
        let written = candidate
            .to_json()
            .and_then(|json| storage.set(SELECTION_KEY, &json));
        match written {
            Ok(()) => {
                self.selection = candidate;
                true
            },
            Err(error) => {
                tracing::warn!(error = %error, "Could not persist selection, mutation dropped");
                false
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStorage {
        entries: Mutex<HashMap<String, String>>,
        read_only: bool,
    }

    impl MapStorage {
        fn with(entries: &[(&str, &str)]) -> Self {
            let storage = Self::default();
            for (key, value) in entries {
                storage.set(key, value).unwrap();
            }
            storage
        }

        fn value(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }
    }

    impl ClientStorage for MapStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.value(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.read_only {
                return Err(StorageError::Io("quota exceeded".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.read_only {
                return Err(StorageError::Io("quota exceeded".to_string()));
            }
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn id(raw: &str) -> TicketId {
        TicketId::new(raw).unwrap()
    }

    fn raffle(raw: &str) -> RaffleId {
        RaffleId::parse(raw).unwrap()
    }

    #[test]
    fn stored_numbers_are_coerced_to_strings() {
        let selection = SelectionSet::from_stored(r#"[12, "045", 12, "12", null]"#).unwrap();
        let ids: Vec<&str> = selection.iter().map(TicketId::as_str).collect();
        assert_eq!(ids, vec!["12", "045"]);
    }

    #[test]
    fn stored_object_is_corrupt() {
        assert!(matches!(
            SelectionSet::from_stored(r#"{"a":1}"#),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn load_keeps_selection_of_same_raffle() {
        let storage = MapStorage::with(&[
            (RAFFLE_MARKER_KEY, "3"),
            (SELECTION_KEY, r#"["12","45"]"#),
        ]);
        let store = LocalSelectionStore::load(&storage, Some(&raffle("3")));
        assert_eq!(store.selection().len(), 2);
    }

    #[test]
    fn load_with_other_raffle_clears_and_moves_marker() {
        let storage = MapStorage::with(&[
            (RAFFLE_MARKER_KEY, "3"),
            (SELECTION_KEY, r#"["12","45"]"#),
        ]);
        let store = LocalSelectionStore::load(&storage, Some(&raffle("4")));
        assert!(store.selection().is_empty());
        assert_eq!(storage.value(RAFFLE_MARKER_KEY).as_deref(), Some("4"));
        assert_eq!(storage.value(SELECTION_KEY), None);
    }

    #[test]
    fn load_without_page_raffle_clears_but_keeps_marker() {
        let storage = MapStorage::with(&[
            (RAFFLE_MARKER_KEY, "3"),
            (SELECTION_KEY, r#"["12"]"#),
        ]);
        let store = LocalSelectionStore::load(&storage, None);
        assert!(store.selection().is_empty());
        assert_eq!(storage.value(RAFFLE_MARKER_KEY).as_deref(), Some("3"));
    }

    #[test]
    fn load_corrupt_selection_is_empty() {
        let storage = MapStorage::with(&[(RAFFLE_MARKER_KEY, "3"), (SELECTION_KEY, "not json")]);
        let store = LocalSelectionStore::load(&storage, Some(&raffle("3")));
        assert!(store.selection().is_empty());
    }

    #[test]
    fn toggle_persists_every_change() {
        let storage = MapStorage::default();
        let mut store = LocalSelectionStore::load(&storage, Some(&raffle("1")));
        store.toggle(&storage, &id("12"));
        store.toggle(&storage, &id("45"));
        assert_eq!(storage.value(SELECTION_KEY).as_deref(), Some(r#"["12","45"]"#));
        store.toggle(&storage, &id("12"));
        assert_eq!(storage.value(SELECTION_KEY).as_deref(), Some(r#"["45"]"#));
    }

    #[test]
    fn remove_absent_is_noop() {
        let storage = MapStorage::default();
        let mut store = LocalSelectionStore::load(&storage, Some(&raffle("1")));
        store.toggle(&storage, &id("12"));
        assert!(!store.remove(&storage, &id("99")));
        assert!(store.remove(&storage, &id("12")));
        assert!(store.selection().is_empty());
    }

    #[test]
    fn failed_write_keeps_previous_selection() {
        let storage = MapStorage::default();
        let mut store = LocalSelectionStore::load(&storage, Some(&raffle("1")));
        store.toggle(&storage, &id("12"));

        let read_only = MapStorage {
            entries: Mutex::new(storage.entries.lock().unwrap().clone()),
            read_only: true,
        };
        store.toggle(&read_only, &id("45"));
        assert!(!store.remove(&read_only, &id("12")));
        store.clear(&read_only);
        let ids: Vec<&str> = store.selection().iter().map(TicketId::as_str).collect();
        assert_eq!(ids, vec!["12"]);
    }

    #[test]
    fn retoggling_a_selected_id_moves_it_to_the_end() {
        let storage = MapStorage::default();
        let mut store = LocalSelectionStore::load(&storage, Some(&raffle("1")));
        for raw in ["12", "45", "77"] {
            store.toggle(&storage, &id(raw));
        }

        store.toggle(&storage, &id("12"));
        store.toggle(&storage, &id("12"));

        let ids: Vec<&str> = store.selection().iter().map(TicketId::as_str).collect();
        assert_eq!(ids, vec!["45", "77", "12"]);
        assert_eq!(
            storage.value(SELECTION_KEY).as_deref(),
            Some(r#"["45","77","12"]"#)
        );
    }

    #[test]
    fn clear_removes_stored_selection() {
        let storage = MapStorage::default();
        let mut store = LocalSelectionStore::load(&storage, Some(&raffle("1")));
        store.toggle(&storage, &id("12"));
        store.clear(&storage);
        assert!(store.selection().is_empty());
        assert_eq!(storage.value(SELECTION_KEY), None);
    }

    proptest! {
        #[test]
        fn size_equals_ids_toggled_an_odd_number_of_times(
            toggles in proptest::collection::vec(0_u8..20, 0..60)
        ) {
            let storage = MapStorage::default();
            let mut store = LocalSelectionStore::load(&storage, Some(&raffle("1")));
            let mut counts = [0_usize; 20];
            for n in &toggles {
                store.toggle(&storage, &id(&format!("{n:02}")));
                counts[usize::from(*n)] += 1;
            }
            let odd = counts.iter().filter(|count| *count % 2 == 1).count();
            prop_assert_eq!(store.selection().len(), odd);
        }

        // Holds for ids outside the selection; a selected id re-enters at the end
        #[test]
        fn double_toggle_restores_content_and_order(
            initial in proptest::collection::vec(0_u8..20, 0..10),
            extra in 20_u8..40,
        ) {
            let storage = MapStorage::default();
            let mut store = LocalSelectionStore::load(&storage, Some(&raffle("1")));
            for n in &initial {
                if !store.selection().contains(&id(&n.to_string())) {
                    store.toggle(&storage, &id(&n.to_string()));
                }
            }
            let before = store.selection().clone();
            let extra = id(&extra.to_string());
            store.toggle(&storage, &extra);
            store.toggle(&storage, &extra);
            prop_assert_eq!(store.selection(), &before);
        }
    }
}
