use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{AudioBlob, MediaBackend, MediaError, ResourceHandle};

#[derive(Debug, Default)]
struct MockMediaState {
    next_id: u64,
    live: HashMap<u64, AudioBlob>,
    created: Vec<u64>,
    released: Vec<u64>,
    source: Option<u64>,
    paused: bool,
    position: Duration,
    duration: Option<Duration>,
    volume: f32,
    play_calls: usize,
    reject_play: Option<MediaError>,
}

/// In-memory media element that records every resource it hands out.
///
/// Cloning shares the underlying state, so a test can keep a clone around while the
/// player owns another.
#[derive(Debug, Clone)]
pub struct MockMedia {
    state: Arc<Mutex<MockMediaState>>,
}

impl Default for MockMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMedia {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockMediaState {
                paused: true,
                volume: 1.0,
                ..Default::default()
            })),
        }
    }

    /// Duration reported for every source installed from now on.
    pub fn with_duration(self, duration: Option<Duration>) -> Self {
        self.lock().duration = duration;
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockMediaState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn created(&self) -> Vec<u64> {
        self.lock().created.clone()
    }

    pub fn released(&self) -> Vec<u64> {
        self.lock().released.clone()
    }

    pub fn live_resources(&self) -> usize {
        self.lock().live.len()
    }

    pub fn source(&self) -> Option<u64> {
        self.lock().source
    }

    /// Bytes behind the installed source.
    pub fn source_bytes(&self) -> Option<Vec<u8>> {
        let state = self.lock();
        state
            .source
            .and_then(|id| state.live.get(&id))
            .map(|blob| blob.bytes.clone())
    }

    pub fn play_calls(&self) -> usize {
        self.lock().play_calls
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    pub fn set_position(&self, position: Duration) {
        self.lock().position = position;
    }

    /// Makes the next `play()` fail with `error`.
    pub fn reject_next_play(&self, error: MediaError) {
        self.lock().reject_play = Some(error);
    }
}

impl MediaBackend for MockMedia {
    fn create_resource(&mut self, blob: AudioBlob) -> Result<ResourceHandle, MediaError> {
        if blob.bytes.is_empty() {
            return Err(MediaError::Decode("empty audio buffer".to_owned()));
        }
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id, blob);
        state.created.push(id);
        Ok(ResourceHandle::new(id))
    }

    fn release_resource(&mut self, handle: ResourceHandle) {
        let mut state = self.lock();
        state.live.remove(&handle.id());
        state.released.push(handle.id());
    }

    fn set_source(&mut self, handle: Option<&ResourceHandle>) {
        let mut state = self.lock();
        state.source = handle.map(ResourceHandle::id);
        state.position = Duration::ZERO;
        state.paused = true;
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let mut state = self.lock();
        state.play_calls += 1;
        if let Some(error) = state.reject_play.take() {
            return Err(error);
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.lock().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn position(&self) -> Duration {
        self.lock().position
    }

    fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
        self.lock().position = position;
        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        let state = self.lock();
        state.source.and(state.duration)
    }

    fn set_volume(&mut self, volume: f32) {
        self.lock().volume = volume;
    }
}
