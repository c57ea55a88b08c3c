//! Placements this client has asked the controller for

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Predecessor each section was last placed after by this client.
///
/// The controller is not trusted to echo `predecessor_ref` back, so the
/// reconciler keeps its own record and falls back on it when reading the
/// observed order. An entry of `None` records a section placed without an
/// anchor; a section missing from the book was never placed by this client.
#[derive(Debug, Default)]
pub struct AnchorBook {
    anchors: Mutex<HashMap<String, Option<String>>>,
}

impl AnchorBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, section_id: &str, predecessor: Option<&str>) {
        self.lock()
            .insert(section_id.to_string(), predecessor.map(str::to_string));
    }

    /// `Some(anchor)` if this client placed the section.
    pub fn anchor(&self, section_id: &str) -> Option<Option<String>> {
        self.lock().get(section_id).cloned()
    }

    /// Drop a deleted section, moving every section anchored on it to
    /// `replacement`.
    pub fn splice(&self, section_id: &str, replacement: Option<&str>) {
        let mut anchors = self.lock();
        anchors.remove(section_id);
        for anchor in anchors.values_mut() {
            if anchor.as_deref() == Some(section_id) {
                *anchor = replacement.map(str::to_string);
            }
        }
    }

    pub fn snapshot(&self) -> HashMap<String, Option<String>> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        self.anchors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
