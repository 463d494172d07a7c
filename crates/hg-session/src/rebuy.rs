use super::*;
use hg_core::*;
use serde::Deserialize;
use serde::Serialize;

/// One accepted rebuy. Entries are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rebuy {
    id: ID<Self>,
    #[serde(rename = "playerId")]
    player: ID<Player>,
    amount: Chips,
    #[serde(rename = "secondsFromStart")]
    offset: Seconds,
}

impl Rebuy {
    pub fn new(id: ID<Self>, player: ID<Player>, amount: Chips, offset: Seconds) -> Self {
        Self {
            id,
            player,
            amount,
            offset,
        }
    }
    pub fn player(&self) -> ID<Player> {
        self.player
    }
    pub fn amount(&self) -> Chips {
        self.amount
    }
    /// Seconds between game start and the rebuy.
    pub fn offset(&self) -> Seconds {
        self.offset
    }
}

impl Unique for Rebuy {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    /// Rebuy history; `seq` preserves insertion order within a game.
    impl Schema for Rebuy {
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                REBUYS,
                " (
                    id          UUID PRIMARY KEY,
                    game_id     UUID NOT NULL REFERENCES ",
                GAMES,
                "(id),
                    seq         BIGSERIAL,
                    player_id   UUID NOT NULL,
                    amount      BIGINT NOT NULL CHECK (amount > 0),
                    offset_secs BIGINT NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_rebuys_game ON ",
                REBUYS,
                " (game_id, seq);"
            )
        }
    }
}
