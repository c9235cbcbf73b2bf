pub(crate) mod audio_status;
pub(crate) mod command;
pub(crate) mod load_error;
pub(crate) mod player_event;
pub(crate) mod player_response;
pub(crate) mod player_state;
pub(crate) mod player_status;
pub(crate) mod track;
