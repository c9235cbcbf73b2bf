use std::fmt;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use super::TrackPayload;
use crate::dto::load_error::LoadError;

/// Raw audio body of the streaming transport.
pub struct TrackStream {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub chunks: BoxStream<'static, Result<Vec<u8>, LoadError>>,
}

impl fmt::Debug for TrackStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Source of track audio.
#[async_trait]
pub trait TrackService: Send + Sync {
    /// JSON transport. `Ok(None)` means the transport is unavailable for this track
    /// and the caller should fall back to [`TrackService::open_stream`].
    async fn fetch_payload(&self, track_id: &str) -> Result<Option<TrackPayload>, LoadError>;

    /// Streaming transport.
    async fn open_stream(&self, track_id: &str) -> Result<TrackStream, LoadError>;
}
