use super::*;
use hg_core::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;

/// Marker for the group a game belongs to. Groups live outside this crate.
#[derive(Debug, Clone, Copy)]
pub struct Group;

/// Persistent header of a game: who, where, and under which rules.
/// Fixed at creation; only the lifecycle around it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    id: ID<Self>,
    group: ID<Group>,
    created_by: ID<Player>,
    created_at: Timestamp,
    settings: GameSettings,
    players: Vec<Player>,
}

impl Game {
    /// Builds a game after checking its settings and roster.
    pub fn new(
        id: ID<Self>,
        group: ID<Group>,
        created_by: ID<Player>,
        created_at: Timestamp,
        settings: GameSettings,
        players: Vec<Player>,
    ) -> Result<Self, SessionError> {
        settings.validate()?;
        if players.is_empty() {
            return Err(SessionError::InvalidRoster("a game needs players".into()));
        }
        if players.len() > MAX_SEATS {
            return Err(SessionError::InvalidRoster(format!(
                "a game seats at most {} players",
                MAX_SEATS
            )));
        }
        if let Some(long) = players.iter().find(|p| p.name().chars().count() > MAX_NAME_CHARS) {
            return Err(SessionError::InvalidRoster(format!(
                "display name of player {} exceeds {} characters",
                long.id(),
                MAX_NAME_CHARS
            )));
        }
        if (players.len() as Chips).checked_mul(settings.buy_in).is_none() {
            return Err(SessionError::InvalidSettings(format!(
                "buy-in of {} is too large for {} players",
                settings.buy_in,
                players.len()
            )));
        }
        let ref mut seen = HashSet::new();
        if let Some(dupe) = players.iter().find(|p| !seen.insert(p.id())) {
            return Err(SessionError::InvalidRoster(format!(
                "player {} is seated twice",
                dupe.id()
            )));
        }
        Ok(Self {
            id,
            group,
            created_by,
            created_at,
            settings,
            players,
        })
    }
    pub fn group(&self) -> ID<Group> {
        self.group
    }
    pub fn created_by(&self) -> ID<Player> {
        self.created_by
    }
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
    /// Roster in seating order; results follow this order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn player(&self, id: ID<Player>) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }
    pub fn seats(&self, id: ID<Player>) -> bool {
        self.player(id).is_some()
    }
}

impl Unique for Game {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    /// Settings are stored as JSON text; lifecycle columns are filled in
    /// as the game starts and finishes.
    impl Schema for Game {
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                GAMES,
                " (
                    id          UUID PRIMARY KEY,
                    group_id    UUID NOT NULL,
                    created_by  UUID NOT NULL,
                    created_at  BIGINT NOT NULL,
                    game_type   VARCHAR(16) NOT NULL,
                    settings    TEXT NOT NULL,
                    status      VARCHAR(16) NOT NULL DEFAULT 'pending',
                    started_at  BIGINT,
                    duration    BIGINT
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_games_group ON ",
                GAMES,
                " (group_id, created_at);"
            )
        }
    }
}
