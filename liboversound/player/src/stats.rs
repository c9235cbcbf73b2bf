use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use tap::TapFallible;
use tracing::debug;

/// Usage accounting hook notified whenever a track starts.
#[async_trait]
pub trait StatsCollector: Send + Sync {
    async fn add_stats(&self, song_id: &str, artist_id: &str) -> Result<()>;
}

/// Fire and forget: the caller never waits on, or learns about, the outcome.
pub(crate) fn notify(
    collector: Option<&Arc<dyn StatsCollector>>,
    song_id: Option<&str>,
    artist_id: Option<&str>,
) {
    let (Some(collector), Some(song_id), Some(artist_id)) = (collector, song_id, artist_id) else {
        return;
    };
    let collector = collector.clone();
    let song_id = song_id.to_owned();
    let artist_id = artist_id.to_owned();
    tokio::spawn(async move {
        let _ = collector
            .add_stats(&song_id, &artist_id)
            .await
            .tap_err(|e| debug!("Error sending stats for song {song_id}: {e:?}"));
    });
}
