use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::TryStreamExt;
use reqwest::Url;
use tap::TapFallible;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::display::{download_progress, known_metadata, resolve_display_metadata};
use crate::dto::command::Command;
use crate::dto::load_error::LoadError;
use crate::dto::player_event::PlayerEvent;
use crate::dto::player_response::PlayerResponse;
use crate::dto::track::{DisplayMetadata, KnownMetadata, PageMetadata, PlayRequest};
use crate::media::AudioBlob;
use crate::transport::{
    CatalogMetadata, CatalogService, DEFAULT_MIME, TrackService, TrackStream, lookup_metadata,
};
use crate::two_way_channel::TwoWaySender;

// Never preallocate more than this from an untrusted Content-Length
const MAX_PREALLOCATION: u64 = 32 * 1024 * 1024;

/// A track that is ready to be handed to the media engine.
#[derive(Debug)]
pub(crate) struct LoadedTrack {
    pub(crate) blob: AudioBlob,
    pub(crate) metadata: DisplayMetadata,
    pub(crate) known: KnownMetadata,
}

/// Posted back to the controller when a load task completes.
#[derive(Debug)]
pub(crate) struct LoadOutcome {
    pub(crate) generation: u64,
    pub(crate) track_id: String,
    pub(crate) result: Result<LoadedTrack, LoadError>,
}

pub(crate) struct LoadContext {
    pub(crate) generation: u64,
    pub(crate) request: PlayRequest,
    pub(crate) token: CancellationToken,
    pub(crate) tracks: Arc<dyn TrackService>,
    pub(crate) catalog: Arc<dyn CatalogService>,
    pub(crate) page: PageMetadata,
    pub(crate) site: Url,
    pub(crate) metadata_timeout: Duration,
    pub(crate) event_tx: broadcast::Sender<PlayerEvent>,
}

pub(crate) fn spawn_load(
    context: LoadContext,
    cmd_tx: TwoWaySender<Command, PlayerResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let generation = context.generation;
        let track_id = context.request.track.track_id.clone();
        let result = cancellable(&context.token, load(&context)).await;

        if let Err(e) = &result
            && (e.is_cancellation() || context.token.is_cancelled())
        {
            debug!("Load {generation} for track {track_id} cancelled");
            return;
        }

        let outcome = LoadOutcome {
            generation,
            track_id,
            result,
        };
        let _ = cmd_tx
            .send_async(Command::LoadFinished(outcome))
            .await
            .tap_err(|_| debug!("Controller gone before load {generation} finished"));
    })
}

/// Resolves to [`LoadError::Cancelled`] as soon as `token` fires, dropping `future`.
pub(crate) async fn cancellable<T>(
    token: &CancellationToken,
    future: impl Future<Output = Result<T, LoadError>>,
) -> Result<T, LoadError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(LoadError::Cancelled),
        result = future => result,
    }
}

async fn load(context: &LoadContext) -> Result<LoadedTrack, LoadError> {
    let (fetched, catalog) = tokio::try_join!(fetch_audio(context), async {
        Ok::<_, LoadError>(lookup_catalog(context).await)
    })?;

    let known = known_metadata(
        &context.request.options,
        fetched.payload_cover.as_deref(),
        catalog.as_ref(),
        &context.site,
    );
    let metadata =
        resolve_display_metadata(&context.request.track.track_id, &known, &context.page);
    Ok(LoadedTrack {
        blob: fetched.blob,
        metadata,
        known,
    })
}

struct FetchedAudio {
    blob: AudioBlob,
    payload_cover: Option<String>,
}

async fn fetch_audio(context: &LoadContext) -> Result<FetchedAudio, LoadError> {
    let track_id = context.request.track.track_id.as_str();
    let mut payload_cover = None;

    if let Some(payload) = context.tracks.fetch_payload(track_id).await? {
        payload_cover = payload.cover_path().map(str::to_owned);
        if let Some(blob) = payload.audio()? {
            info!("Loaded track {track_id} from JSON payload");
            return Ok(FetchedAudio {
                blob,
                payload_cover,
            });
        }
        info!("JSON payload for track {track_id} carries no audio, streaming instead");
    }

    let stream = context.tracks.open_stream(track_id).await?;
    let blob = read_stream(context, stream).await?;
    Ok(FetchedAudio {
        blob,
        payload_cover,
    })
}

async fn read_stream(context: &LoadContext, stream: TrackStream) -> Result<AudioBlob, LoadError> {
    let track_id = &context.request.track.track_id;
    let total = stream.content_length;
    let mime = stream
        .content_type
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MIME.to_owned());

    let mut bytes = Vec::with_capacity(total.unwrap_or_default().min(MAX_PREALLOCATION) as usize);
    let mut last_percent = None;
    let mut chunks = stream.chunks;
    while let Some(chunk) = chunks.try_next().await? {
        bytes.extend_from_slice(&chunk);
        let percent = download_progress(bytes.len() as u64, total);
        if last_percent != Some(percent) {
            last_percent = Some(percent);
            context
                .event_tx
                .send(PlayerEvent::LoadProgress {
                    track_id: track_id.clone(),
                    percent,
                })
                .unwrap_or_default();
        }
    }

    if bytes.is_empty() {
        return Err(LoadError::Decode("empty audio body".to_owned()));
    }
    info!("Streamed {} bytes for track {track_id}", bytes.len());
    Ok(AudioBlob { bytes, mime })
}

async fn lookup_catalog(context: &LoadContext) -> Option<CatalogMetadata> {
    let request = &context.request;
    if request.options.has_display_metadata() {
        return None;
    }
    let song_id = request.track.song_id.as_deref();
    let artist_id = request.track.artist_id.as_deref();
    if song_id.is_none() && artist_id.is_none() {
        return None;
    }

    tokio::time::timeout(
        context.metadata_timeout,
        lookup_metadata(context.catalog.as_ref(), song_id, artist_id),
    )
    .await
    .tap_err(|_| warn!("Catalog lookup for track {} timed out", request.track.track_id))
    .ok()
    .flatten()
}
