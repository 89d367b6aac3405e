use std::fs;
use std::path::Path;

use crate::error::EditorError;

/// Default cap on the number of entries a freshly constructed store keeps.
pub const DEFAULT_HISTORY_MAX_LEN: usize = 100;

/// Bounded, ordered sequence of past lines (oldest first).
///
/// Mirrors the teacher's `LineEditor` history handling (load on construction,
/// reject empty/consecutive-duplicate entries, evict the oldest entry when
/// full) but is generalized to a resizable cap (`set_max_len`) and a
/// full-file `save` rather than append-only persistence, per the editor
/// engine's history file format.
pub struct HistoryStore {
    entries: Vec<String>,
    max_len: usize,
}

impl HistoryStore {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_len,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Entry at `history_index` distance from the newest (0 = newest).
    pub fn from_newest(&self, history_index: usize) -> Option<&str> {
        let len = self.entries.len();
        if history_index >= len {
            return None;
        }
        Some(&self.entries[len - 1 - history_index])
    }

    /// Overwrite the scratch slot (see [`Self::push_scratch`]) in place —
    /// used while navigating history so the in-progress edit survives.
    pub fn set_newest(&mut self, line: &str) {
        if let Some(last) = self.entries.last_mut() {
            *last = line.to_string();
        }
    }

    /// Push the live buffer as a scratch slot at the tail, ignoring the
    /// duplicate/empty-store rules that govern [`Self::add`]. Popped again
    /// by [`Self::pop_scratch`] on commit or EOF.
    pub fn push_scratch(&mut self, line: &str) {
        if self.max_len == 0 {
            return;
        }
        self.entries.push(line.to_string());
        self.evict_if_full();
    }

    pub fn pop_scratch(&mut self) -> Option<String> {
        self.entries.pop()
    }

    /// Add a line, rejecting empty stores and consecutive duplicates.
    pub fn add(&mut self, line: &str) -> Result<(), EditorError> {
        if self.max_len == 0 {
            return Err(EditorError::AllocFailure);
        }
        if self.entries.last().map(String::as_str) == Some(line) {
            return Ok(());
        }
        self.entries.push(line.to_string());
        self.evict_if_full();
        Ok(())
    }

    fn evict_if_full(&mut self) {
        while self.entries.len() > self.max_len {
            self.entries.remove(0);
        }
    }

    /// Resize the cap, keeping the `len` most recent entries.
    pub fn set_max_len(&mut self, len: usize) {
        self.max_len = len;
        self.evict_if_full();
    }

    /// Write each entry on its own line, LF-terminated.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }

    /// Load newline- or CR-terminated lines, pushing each through [`Self::add`].
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let contents = fs::read_to_string(path)?;
        for line in contents.lines() {
            let trimmed = line.trim_end_matches('\r');
            if !trimmed.is_empty() {
                let _ = self.add(trimmed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_consecutive_duplicates() {
        let mut h = HistoryStore::new(10);
        h.add("ls").unwrap();
        h.add("ls").unwrap();
        h.add("ls").unwrap();
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn keeps_non_consecutive_duplicates() {
        let mut h = HistoryStore::new(10);
        h.add("ls").unwrap();
        h.add("pwd").unwrap();
        h.add("ls").unwrap();
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut h = HistoryStore::new(2);
        h.add("a").unwrap();
        h.add("b").unwrap();
        h.add("c").unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.from_newest(1), Some("b"));
        assert_eq!(h.from_newest(0), Some("c"));
    }

    #[test]
    fn set_max_len_trims_oldest() {
        let mut h = HistoryStore::new(10);
        for c in ["a", "b", "c", "d"] {
            h.add(c).unwrap();
        }
        h.set_max_len(2);
        assert_eq!(h.len(), 2);
        assert_eq!(h.from_newest(0), Some("d"));
        assert_eq!(h.from_newest(1), Some("c"));
    }

    #[test]
    fn empty_store_rejects_add() {
        let mut h = HistoryStore::new(0);
        assert!(h.add("x").is_err());
        assert!(h.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        let mut h = HistoryStore::new(10);
        h.add("echo hi").unwrap();
        h.add("ls -la").unwrap();
        h.save(&path).unwrap();

        let mut loaded = HistoryStore::new(10);
        loaded.load(&path).unwrap();
        assert_eq!(loaded.from_newest(0), Some("ls -la"));
        assert_eq!(loaded.from_newest(1), Some("echo hi"));
    }

    #[test]
    fn load_tolerates_cr_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        fs::write(&path, "one\r\ntwo\r\n").unwrap();

        let mut h = HistoryStore::new(10);
        h.load(&path).unwrap();
        assert_eq!(h.from_newest(0), Some("two"));
        assert_eq!(h.from_newest(1), Some("one"));
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn len_never_exceeds_max_len_and_no_adjacent_duplicates(
                lines in proptest::collection::vec(
                    proptest::string::string_regex("[a-z ]{1,12}").expect("regex"),
                    0..40
                ),
                max_len in 1usize..10
            ) {
                let mut h = HistoryStore::new(max_len);
                for line in &lines {
                    let _ = h.add(line);
                }
                prop_assert!(h.len() <= h.max_len());
                for i in 1..h.len() {
                    prop_assert_ne!(h.from_newest(i - 1), h.from_newest(i));
                }
            }

            #[test]
            fn save_then_load_round_trips_non_empty_lines(
                lines in proptest::collection::vec(
                    proptest::string::string_regex("[a-z]{1,12}").expect("regex"),
                    0..20
                )
            ) {
                let dir = tempfile::tempdir().unwrap();
                let path = dir.path().join("history");

                let mut h = HistoryStore::new(100);
                for line in &lines {
                    let _ = h.add(line);
                }
                h.save(&path).unwrap();

                let mut loaded = HistoryStore::new(100);
                loaded.load(&path).unwrap();

                for i in 0..h.len() {
                    prop_assert_eq!(h.from_newest(i), loaded.from_newest(i));
                }
            }
        }
    }
}
