use std::time::Duration;

use strum::Display;

use super::player_state::PlayerState;

#[derive(Clone, Debug, Display)]
pub enum PlayerEvent {
    Visibility(bool),
    Loading { track_id: String },
    LoadProgress { track_id: String, percent: u8 },
    TrackStarted(PlayerState),
    LoadFailed { track_id: String, message: String },
    QueueUpdated(PlayerState),
    Pause(PlayerState),
    Resume(PlayerState),
    Seek(PlayerState, Duration),
    SetVolume(PlayerState),
    Closed(PlayerState),
}
