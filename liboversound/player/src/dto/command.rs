use std::fmt::Debug;
use std::time::Duration;

use super::track::{PageMetadata, PlayRequest};
use crate::loader::LoadOutcome;

#[derive(Debug)]
pub(crate) enum Command {
    PlayTrack(PlayRequest),
    PlayQueueIndex(usize),
    Next,
    Previous,
    SeekForward(Duration),
    SeekBackward(Duration),
    SeekToFraction(f64),
    TogglePlayback,
    SetVolume(f32),
    ToggleMute,
    Show,
    Hide,
    Close,
    SetPageFallback(PageMetadata),
    LoadFinished(LoadOutcome),
    GetCurrentStatus,
    Shutdown,
}
