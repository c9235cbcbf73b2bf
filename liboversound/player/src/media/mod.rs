mod mock_media;
#[cfg(feature = "rodio-output")]
mod rodio_media;

pub use mock_media::*;
#[cfg(feature = "rodio-output")]
pub use rodio_media::*;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Unable to decode audio: {0}")]
    Decode(String),
    #[error("Playback rejected: {0}")]
    PlayRejected(String),
    #[error("Seek failed: {0}")]
    Seek(String),
    #[error("Output unavailable: {0}")]
    Output(String),
}

/// Fully downloaded track audio.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl std::fmt::Debug for AudioBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBlob")
            .field("len", &self.bytes.len())
            .field("mime", &self.mime)
            .finish()
    }
}

/// A buffer registered with the media engine. Not `Clone`: giving it back through
/// [`MediaBackend::release_resource`] consumes it, so it can only be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    id: u64,
}

impl ResourceHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// The single media element the player drives.
pub trait MediaBackend: Send + 'static {
    /// Registers a buffer the engine can play from.
    fn create_resource(&mut self, blob: AudioBlob) -> Result<ResourceHandle, MediaError>;
    fn release_resource(&mut self, handle: ResourceHandle);
    /// Points the element at a resource, or detaches it with `None`.
    fn set_source(&mut self, handle: Option<&ResourceHandle>);
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn position(&self) -> Duration;
    fn seek(&mut self, position: Duration) -> Result<(), MediaError>;
    /// `None` while unknown, e.g. for streams without a length.
    fn duration(&self) -> Option<Duration>;
    fn set_volume(&mut self, volume: f32);
}
