pub mod click;
mod display;
mod dto;
mod event_loop;
mod loader;
pub mod media;
mod player;
mod queue;
mod services;
mod settings;
pub mod stats;
pub mod storage;
pub mod transport;
mod two_way_channel;
pub use display::{format_time, resolve_cover_url};

pub mod oversound_player {
    use std::time::Duration;

    use derivative::Derivative;
    use tap::TapFallible;
    use thiserror::Error;
    use tokio::sync::broadcast;
    use tokio::task::JoinHandle;
    use tracing::{info, warn};

    pub use crate::dto::audio_status::AudioStatus;
    use crate::dto::command::Command;
    pub use crate::dto::load_error::LoadError;
    pub use crate::dto::player_event::PlayerEvent;
    use crate::dto::player_response::PlayerResponse;
    pub use crate::dto::player_state::PlayerState;
    pub use crate::dto::player_status::PlayerStatus;
    pub use crate::dto::track::{
        CurrentTrack, DisplayMetadata, PageMetadata, PlayOptions, PlayRequest, QueueEntry,
    };
    use crate::event_loop::main_loop;
    use crate::media::MediaBackend;
    use crate::player::Player;
    pub use crate::services::Services;
    pub use crate::settings::Settings;
    use crate::two_way_channel::{TwoWaySender, two_way_channel};

    #[derive(Debug, Clone, Error)]
    #[error("{0}")]
    pub struct PlayerError(String);

    /// Handle to the radio player. All playback state lives on a background task;
    /// every method here just enqueues a command for it.
    #[derive(Derivative)]
    #[derivative(Debug)]
    pub struct RadioPlayer {
        cmd_sender: TwoWaySender<Command, PlayerResponse>,
        event_tx: broadcast::Sender<PlayerEvent>,
        #[derivative(Debug = "ignore")]
        main_handle: Option<JoinHandle<()>>,
        seek_step: Duration,
        joined: bool,
    }

    impl RadioPlayer {
        /// Spawns the controller task. Must be called from within a tokio runtime.
        pub fn new<M: MediaBackend>(media: M, services: Services, settings: Settings) -> Self {
            let (event_tx, _) = broadcast::channel(64);
            let (cmd_tx, cmd_rx) = two_way_channel();
            let seek_step = settings.seek_step;

            let player = Player::new(media, services, settings, event_tx.clone(), cmd_tx.clone());
            let main_handle = tokio::spawn(main_loop(cmd_rx, player));

            RadioPlayer {
                cmd_sender: cmd_tx,
                event_tx,
                main_handle: Some(main_handle),
                seek_step,
                joined: false,
            }
        }

        pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
            self.event_tx.subscribe()
        }

        async fn send(&self, command: Command) -> Result<(), PlayerError> {
            self.cmd_sender
                .send_async(command)
                .await
                .map_err(|e| PlayerError(format!("{e:?}")))
        }

        /// Starts loading a track. Blank track ids are ignored.
        pub async fn play_track(&self, request: PlayRequest) -> Result<(), PlayerError> {
            self.send(Command::PlayTrack(request)).await
        }

        /// Replays a queue entry without adding it to the queue again.
        pub async fn play_queue_index(&self, index: usize) -> Result<(), PlayerError> {
            self.send(Command::PlayQueueIndex(index)).await
        }

        pub async fn next(&self) -> Result<(), PlayerError> {
            self.send(Command::Next).await
        }

        pub async fn previous(&self) -> Result<(), PlayerError> {
            self.send(Command::Previous).await
        }

        pub async fn seek_forward(&self) -> Result<(), PlayerError> {
            self.seek_forward_by(self.seek_step).await
        }

        pub async fn seek_backward(&self) -> Result<(), PlayerError> {
            self.seek_backward_by(self.seek_step).await
        }

        pub async fn seek_forward_by(&self, step: Duration) -> Result<(), PlayerError> {
            self.send(Command::SeekForward(step)).await
        }

        pub async fn seek_backward_by(&self, step: Duration) -> Result<(), PlayerError> {
            self.send(Command::SeekBackward(step)).await
        }

        /// Seeks to a fraction of the track, e.g. from a click on the progress bar.
        pub async fn seek_to_fraction(&self, fraction: f64) -> Result<(), PlayerError> {
            self.send(Command::SeekToFraction(fraction)).await
        }

        pub async fn toggle_playback(&self) -> Result<(), PlayerError> {
            self.send(Command::TogglePlayback).await
        }

        pub async fn set_volume(&self, volume: f32) -> Result<(), PlayerError> {
            self.send(Command::SetVolume(volume)).await
        }

        pub async fn toggle_mute(&self) -> Result<(), PlayerError> {
            self.send(Command::ToggleMute).await
        }

        pub async fn show(&self) -> Result<(), PlayerError> {
            self.send(Command::Show).await
        }

        pub async fn hide(&self) -> Result<(), PlayerError> {
            self.send(Command::Hide).await
        }

        /// Hides the player and drops the loaded track.
        pub async fn close(&self) -> Result<(), PlayerError> {
            self.send(Command::Close).await
        }

        pub async fn set_page_fallback(&self, page: PageMetadata) -> Result<(), PlayerError> {
            self.send(Command::SetPageFallback(page)).await
        }

        pub async fn status(&self) -> Result<PlayerStatus, PlayerError> {
            match self
                .cmd_sender
                .get_response(Command::GetCurrentStatus)
                .await
            {
                Ok(PlayerResponse::StatusResponse(status)) => Ok(status),
                Err(e) => Err(PlayerError(format!("{e:?}"))),
            }
        }

        pub async fn join(mut self) -> Result<(), PlayerError> {
            info!("Joining player instance");
            self.send(Command::Shutdown).await?;
            info!("Sent shutdown command");
            self.joined = true;
            if let Some(handle) = self.main_handle.take() {
                handle
                    .await
                    .map_err(|e| PlayerError(format!("Error joining controller task: {e:?}")))?;
            }
            info!("Controller task terminated");
            Ok(())
        }
    }

    impl Drop for RadioPlayer {
        fn drop(&mut self) {
            if !self.joined {
                info!("join() not called, shutting down in the background");
                let _ = self
                    .cmd_sender
                    .send(Command::Shutdown)
                    .tap_err(|e| warn!("Error sending shutdown command: {e:?}"));
            }
        }
    }
}
