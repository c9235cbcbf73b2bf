#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioStatus {
    Playing,
    Paused,
    Stopped,
}
