use std::time::Duration;

use super::audio_status::AudioStatus;
use super::player_state::PlayerState;

#[derive(Clone, Debug)]
pub struct PlayerStatus {
    pub state: PlayerState,
    pub status: AudioStatus,
    pub position: Option<Duration>,
    pub duration: Option<Duration>,
    pub progress_percent: f64,
    pub time_display: String,
}
