use async_trait::async_trait;
use tap::TapFallible;
use tracing::{info, warn};

use super::{ArtistRecord, SongRecord};
use crate::dto::load_error::LoadError;

/// Read side of the song/artist catalog.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn song(&self, song_id: &str) -> Result<SongRecord, LoadError>;
    async fn artist(&self, artist_id: &str) -> Result<ArtistRecord, LoadError>;
}

/// Display fields the catalog knows about a track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMetadata {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub cover: Option<String>,
}

/// Best effort catalog lookup. Failures degrade to `None` so playback never waits on
/// an error here.
pub async fn lookup_metadata(
    catalog: &dyn CatalogService,
    song_id: Option<&str>,
    artist_id: Option<&str>,
) -> Option<CatalogMetadata> {
    if let Some(song_id) = song_id
        && let Ok(song) = catalog
            .song(song_id)
            .await
            .tap_err(|e| warn!("Error fetching song metadata for {song_id}: {e}"))
    {
        let artist_name = match song.artist_id.as_deref().or(artist_id) {
            Some(id) => catalog
                .artist(id)
                .await
                .tap_err(|e| warn!("Error resolving artist name for {id}: {e}"))
                .ok()
                .and_then(|a| a.display_name().map(str::to_owned)),
            None => None,
        };
        return Some(CatalogMetadata {
            title: song.display_title().map(str::to_owned),
            artist_name,
            cover: song.cover_path().map(str::to_owned),
        });
    }

    if let Some(artist_id) = artist_id
        && let Ok(artist) = catalog
            .artist(artist_id)
            .await
            .tap_err(|e| warn!("Error fetching artist metadata for {artist_id}: {e}"))
    {
        return Some(CatalogMetadata {
            title: None,
            artist_name: artist.display_name().map(str::to_owned),
            cover: artist.image_path().map(str::to_owned),
        });
    }

    info!("No catalog metadata available");
    None
}
