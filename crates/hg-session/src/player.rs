use hg_core::ID;
use hg_core::Unique;
use serde::Deserialize;
use serde::Serialize;

/// Group member seated in a game. Owned by the group; a game only
/// references players by id and keeps the display name for results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    id: ID<Self>,
    #[serde(rename = "displayName")]
    name: String,
}

impl Player {
    pub fn new(id: ID<Self>, name: String) -> Self {
        Self { id, name }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Unique for Player {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    /// Roster rows: one per seated player, ordered by seat.
    impl Schema for Player {
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                SEATS,
                " (
                    game_id     UUID NOT NULL REFERENCES ",
                GAMES,
                "(id),
                    player_id   UUID NOT NULL,
                    seat        SMALLINT NOT NULL,
                    name        VARCHAR(",
                hg_core::MAX_NAME_CHARS,
                ") NOT NULL,
                    PRIMARY KEY (game_id, player_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_seats_player ON ",
                SEATS,
                " (player_id);"
            )
        }
    }
}
