use std::time::Duration;

use tap::TapFallible;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::display::{loading_metadata, playback_progress, time_display};
use crate::dto::audio_status::AudioStatus;
use crate::dto::command::Command;
use crate::dto::load_error::LoadError;
use crate::dto::player_event::PlayerEvent;
use crate::dto::player_response::PlayerResponse;
use crate::dto::player_state::PlayerState;
use crate::dto::player_status::PlayerStatus;
use crate::dto::track::{CurrentTrack, DisplayMetadata, PageMetadata, PlayRequest, QueueEntry};
use crate::loader::{LoadContext, LoadOutcome, LoadedTrack, spawn_load};
use crate::media::{MediaBackend, ResourceHandle};
use crate::queue::PlayQueue;
use crate::services::Services;
use crate::settings::{Settings, clamp_volume};
use crate::stats;
use crate::storage::{load_volume, save_volume};
use crate::two_way_channel::TwoWaySender;

struct PendingLoad {
    generation: u64,
    token: CancellationToken,
    // What to show again if this load fails
    previous_metadata: DisplayMetadata,
}

pub(crate) struct Player<M: MediaBackend> {
    media: M,
    services: Services,
    settings: Settings,
    event_tx: broadcast::Sender<PlayerEvent>,
    cmd_tx: TwoWaySender<Command, PlayerResponse>,
    queue: PlayQueue,
    current_track: Option<CurrentTrack>,
    generation: u64,
    pending: Option<PendingLoad>,
    resource: Option<ResourceHandle>,
    volume: f32,
    pre_mute_volume: Option<f32>,
    visible: bool,
    now_playing: DisplayMetadata,
    page_fallback: PageMetadata,
}

impl<M: MediaBackend> Player<M> {
    pub(crate) fn new(
        mut media: M,
        services: Services,
        settings: Settings,
        event_tx: broadcast::Sender<PlayerEvent>,
        cmd_tx: TwoWaySender<Command, PlayerResponse>,
    ) -> Self {
        let volume = load_volume(services.store.as_ref(), settings.default_volume);
        info!("Restored volume {volume}");
        media.set_volume(volume);

        Self {
            media,
            services,
            settings,
            event_tx,
            cmd_tx,
            queue: PlayQueue::new(),
            current_track: None,
            generation: 0,
            pending: None,
            resource: None,
            volume,
            pre_mute_volume: None,
            visible: false,
            now_playing: DisplayMetadata::default(),
            page_fallback: PageMetadata::default(),
        }
    }

    fn emit(&self, event: PlayerEvent) {
        self.event_tx.send(event).unwrap_or_default();
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn state(&self) -> PlayerState {
        PlayerState {
            current_track: self.current_track.clone(),
            queue: self.queue.entries().to_vec(),
            queue_index: self.queue.index(),
            volume: self.volume,
            is_loading: self.is_loading(),
            visible: self.visible,
            now_playing: self.now_playing.clone(),
        }
    }

    pub(crate) fn play_track(&mut self, request: PlayRequest) {
        let track_id = request.track.track_id.clone();
        if track_id.trim().is_empty() {
            info!("Ignoring play request without a track id");
            return;
        }
        info!("Playing track {track_id}");

        self.current_track = Some(request.track.clone());
        let previous_metadata = match self.pending.take() {
            Some(pending) => {
                debug!("Cancelling load {}", pending.generation);
                pending.token.cancel();
                pending.previous_metadata
            }
            None => self.now_playing.clone(),
        };
        self.now_playing = loading_metadata();
        self.set_visible(true);

        if request.options.add_to_queue {
            self.queue.push(QueueEntry::from_request(&request));
            self.emit(PlayerEvent::QueueUpdated(self.state()));
        }

        self.generation += 1;
        let token = CancellationToken::new();
        self.pending = Some(PendingLoad {
            generation: self.generation,
            token: token.clone(),
            previous_metadata,
        });
        self.emit(PlayerEvent::Loading {
            track_id: track_id.clone(),
        });

        spawn_load(
            LoadContext {
                generation: self.generation,
                request,
                token,
                tracks: self.services.tracks.clone(),
                catalog: self.services.catalog.clone(),
                page: self.page_fallback.clone(),
                site: self.settings.site_url.clone(),
                metadata_timeout: self.settings.metadata_timeout,
                event_tx: self.event_tx.clone(),
            },
            self.cmd_tx.clone(),
        );
    }

    pub(crate) fn play_queue_index(&mut self, index: usize) {
        let Some(entry) = self.queue.get(index).cloned() else {
            info!(
                "Queue index {index} out of range for {} entries",
                self.queue.len()
            );
            return;
        };
        self.queue.set_index(index);
        self.emit(PlayerEvent::QueueUpdated(self.state()));
        self.play_track(entry.to_request());
    }

    pub(crate) fn go_next(&mut self) {
        match self.queue.next_index() {
            Some(index) => self.play_queue_index(index),
            None => info!("Already at the end of the queue"),
        }
    }

    pub(crate) fn go_previous(&mut self) {
        match self.queue.previous_index() {
            Some(index) => self.play_queue_index(index),
            None => info!("Already at the start of the queue"),
        }
    }

    pub(crate) fn on_load_finished(&mut self, outcome: LoadOutcome) {
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == outcome.generation);
        if !is_current {
            debug!(
                "Discarding stale load {} for track {}",
                outcome.generation, outcome.track_id
            );
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        match outcome.result {
            Ok(loaded) => self.install(outcome.track_id, loaded, pending.previous_metadata),
            Err(e) => self.fail(outcome.track_id, e, pending.previous_metadata),
        }
    }

    fn install(&mut self, track_id: String, loaded: LoadedTrack, previous: DisplayMetadata) {
        self.media.pause();
        self.release_resource();

        let handle = match self.media.create_resource(loaded.blob) {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(track_id, LoadError::Media(e), previous);
                return;
            }
        };
        self.media.set_source(Some(&handle));
        self.media.set_volume(self.volume);
        self.resource = Some(handle);

        self.queue.capture_metadata(&track_id, &loaded.known);
        self.now_playing = loaded.metadata;
        self.emit(PlayerEvent::LoadProgress {
            track_id: track_id.clone(),
            percent: 0,
        });

        let _ = self
            .media
            .play()
            .tap_err(|e| warn!("Playback of track {track_id} did not start: {e}"));
        info!("Started track {track_id}");
        self.emit(PlayerEvent::TrackStarted(self.state()));

        if let Some(track) = &self.current_track {
            stats::notify(
                self.services.stats.as_ref(),
                track.song_id.as_deref(),
                track.artist_id.as_deref(),
            );
        }
    }

    fn fail(&mut self, track_id: String, e: LoadError, previous: DisplayMetadata) {
        error!("Error loading track {track_id}: {e}");
        self.now_playing = previous;
        self.emit(PlayerEvent::LoadFailed {
            track_id,
            message: e.to_string(),
        });
    }

    fn release_resource(&mut self) {
        if let Some(handle) = self.resource.take() {
            debug!("Releasing resource {}", handle.id());
            self.media.set_source(None);
            self.media.release_resource(handle);
        }
    }

    pub(crate) fn seek_forward(&mut self, step: Duration) {
        self.seek_by(step.as_secs_f64());
    }

    pub(crate) fn seek_backward(&mut self, step: Duration) {
        self.seek_by(-step.as_secs_f64());
    }

    fn seek_by(&mut self, offset_secs: f64) {
        if self.resource.is_none() {
            info!("Nothing to seek");
            return;
        }
        let mut target = (self.media.position().as_secs_f64() + offset_secs).max(0.0);
        if let Some(duration) = self.media.duration() {
            target = target.min(duration.as_secs_f64());
        }
        self.seek(Duration::from_secs_f64(target));
    }

    pub(crate) fn seek_to_fraction(&mut self, fraction: f64) {
        if self.resource.is_none() || fraction.is_nan() {
            return;
        }
        let Some(duration) = self.media.duration() else {
            info!("Duration unknown, ignoring seek");
            return;
        };
        self.seek(duration.mul_f64(fraction.clamp(0.0, 1.0)));
    }

    fn seek(&mut self, position: Duration) {
        info!("Seeking to {position:?}");
        let _ = self
            .media
            .seek(position)
            .tap_err(|e| warn!("Error seeking: {e}"));
        self.emit(PlayerEvent::Seek(self.state(), position));
    }

    pub(crate) fn toggle_playback(&mut self) {
        if self.is_loading() || self.resource.is_none() {
            info!("Nothing to toggle");
            return;
        }
        if self.media.is_paused() {
            let _ = self
                .media
                .play()
                .tap_err(|e| warn!("Error resuming playback: {e}"));
            self.emit(PlayerEvent::Resume(self.state()));
        } else {
            self.media.pause();
            self.emit(PlayerEvent::Pause(self.state()));
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.emit(PlayerEvent::Visibility(visible));
    }

    pub(crate) fn close(&mut self) {
        info!("Closing player");
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
        self.set_visible(false);
        self.media.pause();
        self.release_resource();
        self.emit(PlayerEvent::Closed(self.state()));
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        self.pre_mute_volume = None;
        self.apply_volume(clamp_volume(volume, self.volume));
    }

    pub(crate) fn toggle_mute(&mut self) {
        let volume = if self.volume > 0.0 {
            self.pre_mute_volume = Some(self.volume);
            0.0
        } else {
            self.pre_mute_volume.take().unwrap_or(1.0)
        };
        self.apply_volume(volume);
    }

    fn apply_volume(&mut self, volume: f32) {
        info!("Setting volume to {volume}");
        self.volume = volume;
        self.media.set_volume(volume);
        save_volume(self.services.store.as_ref(), volume);
        self.emit(PlayerEvent::SetVolume(self.state()));
    }

    pub(crate) fn set_page_fallback(&mut self, page: PageMetadata) {
        self.page_fallback = page;
    }

    pub(crate) fn get_current_status(&self) -> PlayerStatus {
        let status = match &self.resource {
            None => AudioStatus::Stopped,
            Some(_) if self.media.is_paused() => AudioStatus::Paused,
            Some(_) => AudioStatus::Playing,
        };
        let position = self.resource.as_ref().map(|_| self.media.position());
        let duration = self.resource.as_ref().and_then(|_| self.media.duration());

        PlayerStatus {
            state: self.state(),
            status,
            position,
            duration,
            progress_percent: playback_progress(position, duration),
            time_display: time_display(self.is_loading(), position, duration),
        }
    }

    pub(crate) fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
        self.media.pause();
        self.release_resource();
    }
}
