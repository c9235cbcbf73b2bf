use tracing::{error, info};

use crate::dto::command::Command;
use crate::dto::player_response::PlayerResponse;
use crate::media::MediaBackend;
use crate::player::Player;
use crate::two_way_channel::TwoWayReceiver;

pub(crate) async fn main_loop<M: MediaBackend>(
    mut receiver: TwoWayReceiver<Command, PlayerResponse>,
    mut player: Player<M>,
) {
    while let Ok(next_command) = receiver.recv_async().await {
        info!("Got command {next_command:?}");
        match next_command {
            Command::PlayTrack(request) => {
                player.play_track(request);
            }
            Command::PlayQueueIndex(index) => {
                player.play_queue_index(index);
            }
            Command::Next => {
                player.go_next();
            }
            Command::Previous => {
                player.go_previous();
            }
            Command::SeekForward(step) => {
                player.seek_forward(step);
            }
            Command::SeekBackward(step) => {
                player.seek_backward(step);
            }
            Command::SeekToFraction(fraction) => {
                player.seek_to_fraction(fraction);
            }
            Command::TogglePlayback => {
                player.toggle_playback();
            }
            Command::SetVolume(volume) => {
                player.set_volume(volume);
            }
            Command::ToggleMute => {
                player.toggle_mute();
            }
            Command::Show => {
                player.set_visible(true);
            }
            Command::Hide => {
                player.set_visible(false);
            }
            Command::Close => {
                player.close();
            }
            Command::SetPageFallback(page) => {
                player.set_page_fallback(page);
            }
            Command::LoadFinished(outcome) => {
                player.on_load_finished(outcome);
            }
            Command::GetCurrentStatus => {
                let current_status = player.get_current_status();
                if let Err(e) = receiver.respond(PlayerResponse::StatusResponse(current_status)) {
                    error!("Error sending player status: {e:?}");
                }
            }
            Command::Shutdown => {
                player.shutdown();
                info!("Player shut down");
                return;
            }
        }
        info!("Completed command");
    }
    info!("Request loop completed");
    player.shutdown();
}
