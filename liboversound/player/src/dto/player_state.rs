use super::track::{CurrentTrack, DisplayMetadata, QueueEntry};

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub current_track: Option<CurrentTrack>,
    pub queue: Vec<QueueEntry>,
    pub queue_index: Option<usize>,
    pub volume: f32,
    pub is_loading: bool,
    pub visible: bool,
    pub now_playing: DisplayMetadata,
}

impl PlayerState {
    pub fn queue_track_ids(&self) -> Vec<String> {
        self.queue.iter().map(|q| q.track_id.clone()).collect()
    }
}
