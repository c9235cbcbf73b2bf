use super::player_status::PlayerStatus;

#[derive(Clone, Debug)]
pub(crate) enum PlayerResponse {
    StatusResponse(PlayerStatus),
}
