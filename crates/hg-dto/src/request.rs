use hg_core::Chips;
use hg_core::ID;
use hg_session::GameSettings;
use hg_session::Group;
use hg_session::Player;
use hg_session::Stacks;
use hg_session::Status;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub group_id: ID<Group>,
    pub created_by: ID<Player>,
    pub players: Vec<Player>,
    #[serde(default)]
    pub settings: GameSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuyRequest {
    pub player_id: ID<Player>,
    pub amount: Chips,
}

/// Final chip counts keyed by player id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndGameRequest {
    pub stacks: Stacks,
}
