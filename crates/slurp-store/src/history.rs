//! Linear edit history with a current pointer.
//!
//! ```text
//! versions: [v0, v1, v2, v3]
//!                    ^ current = 2
//! undo  -> current = 1
//! redo  -> current = 2
//! push  -> truncate to [v0, v1, v2], append v3', current = 3
//! ```
//!
//! `versions[i].version_index == i` for every `i`, and `current` is a
//! valid index whenever the history is non-empty.

use serde::Serialize;

use crate::version::ImageVersion;

/// Version list plus the index of the active version.
#[derive(Debug, Clone, Default)]
pub struct History {
    versions: Vec<ImageVersion>,
    current: usize,
}

impl History {
    /// `true` until the first version is pushed. An empty history is
    /// treated the same as an absent entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Index the next pushed version will get.
    #[must_use]
    pub fn next_index(&self) -> usize {
        if self.versions.is_empty() {
            0
        } else {
            self.current + 1
        }
    }

    /// Drop everything after `current`, append `version`, and move
    /// `current` onto it. Returns the versions that were cut off.
    ///
    /// `version.version_index` must equal [`next_index`](Self::next_index).
    pub fn push(&mut self, version: ImageVersion) -> Vec<ImageVersion> {
        debug_assert_eq!(version.version_index, self.next_index());
        let keep = self.next_index();
        let discarded = self.versions.split_off(keep);
        self.versions.push(version);
        self.current = keep;
        discarded
    }

    /// Step back. `None` at version 0 or when empty.
    pub fn undo(&mut self) -> Option<&ImageVersion> {
        if self.versions.is_empty() || self.current == 0 {
            return None;
        }
        self.current -= 1;
        self.versions.get(self.current)
    }

    /// Step forward. `None` at the newest version or when empty.
    pub fn redo(&mut self) -> Option<&ImageVersion> {
        if self.current + 1 >= self.versions.len() {
            return None;
        }
        self.current += 1;
        self.versions.get(self.current)
    }

    #[must_use]
    pub fn current(&self) -> Option<&ImageVersion> {
        self.versions.get(self.current)
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ImageVersion> {
        self.versions.get(index)
    }

    #[must_use]
    pub fn versions(&self) -> &[ImageVersion] {
        &self.versions
    }
}

/// Point-in-time copy of an entity's history.
///
/// Serialises as `{"uuid", "current", "versions"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistorySnapshot {
    #[serde(rename = "uuid")]
    pub entity_id: String,
    pub current: usize,
    pub versions: Vec<ImageVersion>,
}

impl HistorySnapshot {
    pub(crate) fn of(entity_id: &str, history: &History) -> Self {
        Self {
            entity_id: entity_id.to_owned(),
            current: history.current_index(),
            versions: history.versions().to_vec(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use slurp_filters::ImageFormat;

    use super::*;

    fn push_next(history: &mut History) -> Vec<ImageVersion> {
        let v = ImageVersion::new("e", history.next_index(), ImageFormat::Png);
        history.push(v)
    }

    fn indices(history: &History) -> Vec<usize> {
        history.versions().iter().map(|v| v.version_index).collect()
    }

    #[test]
    fn empty_history_has_nothing_to_move() {
        let mut h = History::default();
        assert!(h.is_empty());
        assert!(h.current().is_none());
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        assert_eq!(h.next_index(), 0);
    }

    #[test]
    fn pushes_are_dense() {
        let mut h = History::default();
        for _ in 0..4 {
            assert!(push_next(&mut h).is_empty());
        }
        assert_eq!(indices(&h), [0, 1, 2, 3]);
        assert_eq!(h.current_index(), 3);
    }

    #[test]
    fn undo_and_redo_move_pointer_only() {
        let mut h = History::default();
        push_next(&mut h);
        push_next(&mut h);
        assert_eq!(h.undo().unwrap().version_index, 0);
        assert!(h.undo().is_none());
        assert_eq!(h.redo().unwrap().version_index, 1);
        assert!(h.redo().is_none());
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn push_after_undo_cuts_branch() {
        let mut h = History::default();
        for _ in 0..3 {
            push_next(&mut h);
        }
        h.undo();
        assert_eq!(h.next_index(), 2);
        let cut = push_next(&mut h);
        assert_eq!(cut.len(), 1);
        assert_eq!(cut[0].version_index, 2);
        assert_eq!(indices(&h), [0, 1, 2]);
        assert_eq!(h.current_index(), 2);
        assert!(h.redo().is_none());
    }

    #[test]
    fn push_after_multiple_undos_cuts_everything_after_pointer() {
        let mut h = History::default();
        for _ in 0..5 {
            push_next(&mut h);
        }
        h.undo();
        h.undo();
        h.undo();
        let cut = push_next(&mut h);
        assert_eq!(
            cut.iter().map(|v| v.version_index).collect::<Vec<_>>(),
            [2, 3, 4]
        );
        assert_eq!(indices(&h), [0, 1, 2]);
    }
}
