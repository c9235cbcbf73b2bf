use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{Result, eyre};
use liboversound_player::media::RodioMedia;
use liboversound_player::oversound_player::{
    PlayRequest, PlayerEvent, RadioPlayer, Services, Settings,
};
use liboversound_player::storage::FileStore;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Plays tracks from an OverSound track service through the default output device.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Track ids, played one after another
    #[arg(required = true)]
    tracks: Vec<String>,
    /// Seconds of each track to play before moving on
    #[arg(short, long, default_value_t = 30)]
    seconds: u64,
    #[arg(short, long)]
    volume: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let settings = Settings::from_env();
    let store = Arc::new(FileStore::try_new()?);
    let services = Services::http(&settings, store)?;
    let media = RodioMedia::try_new()?;
    let player = RadioPlayer::new(media, services, settings);
    let mut events = player.subscribe();

    if let Some(volume) = cli.volume {
        player.set_volume(volume).await?;
    }

    for track_id in cli.tracks {
        player.play_track(PlayRequest::new(track_id.clone())).await?;
        loop {
            match events.recv().await {
                Ok(PlayerEvent::TrackStarted(state)) => {
                    info!(
                        "Now playing {} - {}",
                        state.now_playing.artist, state.now_playing.title
                    );
                    tokio::time::sleep(Duration::from_secs(cli.seconds)).await;
                    break;
                }
                Ok(PlayerEvent::LoadFailed { track_id, message }) => {
                    warn!("Skipping track {track_id}: {message}");
                    break;
                }
                Ok(PlayerEvent::LoadProgress { percent, .. }) if percent > 0 => {
                    info!("Downloading {track_id}: {percent}%");
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return Err(eyre!("Player stopped unexpectedly")),
            }
        }
    }

    player.join().await?;
    Ok(())
}
