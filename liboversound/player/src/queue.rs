use tracing::info;

use crate::dto::track::{KnownMetadata, QueueEntry};

/// History of the tracks played in this session.
///
/// Behaves like browser history: playing something new while positioned in the
/// middle of the queue throws away everything after the current position.
#[derive(Debug, Default, Clone)]
pub(crate) struct PlayQueue {
    entries: Vec<QueueEntry>,
    index: Option<usize>,
}

impl PlayQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub(crate) fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Makes `entry` the active entry, discarding forward history first.
    /// A track equal to the last entry is not appended twice.
    pub(crate) fn push(&mut self, entry: QueueEntry) {
        let keep = self.index.map(|i| i + 1).unwrap_or(0);
        if keep < self.entries.len() {
            info!(
                "Dropping {} forward queue entries",
                self.entries.len() - keep
            );
            self.entries.truncate(keep);
        }

        let is_duplicate = self
            .entries
            .last()
            .is_some_and(|last| last.track_id == entry.track_id);
        if !is_duplicate {
            self.entries.push(entry);
        }
        self.index = Some(self.entries.len() - 1);
    }

    /// Moves the cursor without touching the entries. Returns `false` when out of range.
    pub(crate) fn set_index(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.index = Some(index);
        true
    }

    pub(crate) fn next_index(&self) -> Option<usize> {
        let index = self.index?;
        (index + 1 < self.entries.len()).then_some(index + 1)
    }

    pub(crate) fn previous_index(&self) -> Option<usize> {
        self.index.and_then(|i| i.checked_sub(1))
    }

    /// Stores known metadata on the active entry so navigating back to it
    /// does not need another catalog round trip. Unknown fields are left as they are,
    /// so a replay still asks the catalog for them.
    pub(crate) fn capture_metadata(&mut self, track_id: &str, metadata: &KnownMetadata) {
        let Some(entry) = self.index.and_then(|i| self.entries.get_mut(i)) else {
            return;
        };
        if entry.track_id != track_id {
            return;
        }
        if let Some(title) = &metadata.title {
            entry.title = Some(title.clone());
        }
        if let Some(artist) = &metadata.artist {
            entry.artist_name = Some(artist.clone());
        }
        if let Some(cover) = &metadata.cover {
            entry.cover = Some(cover.clone());
        }
    }
}
