use super::*;
use hg_core::*;
use serde::Deserialize;
use serde::Serialize;

/// Durable form of a session: everything needed to resume it after a
/// restart. Elapsed time is never stored; it is recomputed from
/// `started_at`. A settling session is stored as active without results,
/// so an unconfirmed settlement does not survive a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub game: Game,
    pub status: Status,
    pub started_at: Option<Timestamp>,
    pub duration_seconds: Option<Seconds>,
    pub history: Vec<Rebuy>,
    pub results: Option<Vec<Standing>>,
}

/// One row of a group's games history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: ID<Game>,
    pub game_type: String,
    pub status: Status,
    pub currency: String,
    pub buy_in: Chips,
    pub players: usize,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub duration_seconds: Option<Seconds>,
}

impl Summary {
    pub fn new(
        settings: &GameSettings,
        id: ID<Game>,
        status: Status,
        players: usize,
        created_at: Timestamp,
        started_at: Option<Timestamp>,
        duration_seconds: Option<Seconds>,
    ) -> Self {
        Self {
            id,
            game_type: settings.game_type().to_string(),
            status,
            currency: settings.currency.clone(),
            buy_in: settings.buy_in,
            players,
            created_at,
            started_at,
            duration_seconds,
        }
    }
}

impl From<&Snapshot> for Summary {
    fn from(snapshot: &Snapshot) -> Self {
        Self::new(
            snapshot.game.settings(),
            snapshot.game.id(),
            snapshot.status,
            snapshot.game.players().len(),
            snapshot.game.created_at(),
            snapshot.started_at,
            snapshot.duration_seconds,
        )
    }
}

impl GameSession {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            game: self.game().clone(),
            status: self.status(),
            started_at: self.started(),
            duration_seconds: self.duration(),
            history: self.ledger().history().to_vec(),
            results: self.results().map(<[Standing]>::to_vec),
        }
    }
}

impl TryFrom<Snapshot> for GameSession {
    type Error = SessionError;
    /// Rebuilds a session, replaying the rebuy history through the same
    /// checks live rebuys pass. Any inconsistency is reported as corrupt.
    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        let corrupt = |s: &str| SessionError::Corrupt(s.to_string());
        let Snapshot {
            game,
            status,
            started_at,
            duration_seconds,
            history,
            results,
        } = snapshot;
        let mut session = GameSession::new(game);
        let started = match (status, started_at) {
            (Status::Pending, None) if history.is_empty() && results.is_none() => {
                return Ok(session);
            }
            (Status::Pending, _) => return Err(corrupt("pending game carries play data")),
            (_, None) => return Err(corrupt("started game has no start time")),
            (_, Some(started)) => started,
        };
        session.start(started)?;
        for rebuy in history {
            session
                .record(rebuy)
                .map_err(|e| SessionError::Corrupt(format!("rebuy replay failed: {}", e)))?;
        }
        match (status, results, duration_seconds) {
            (Status::Active, None, _) => Ok(session),
            (Status::Finished, Some(results), Some(duration)) => {
                let stacks = results
                    .iter()
                    .map(|s| (s.player(), s.money_out()))
                    .collect::<Stacks>();
                let settlement = session
                    .reconcile(&stacks)
                    .map_err(|e| SessionError::Corrupt(format!("stored results invalid: {}", e)))?;
                if settlement.standings() != results.as_slice() {
                    return Err(corrupt("stored results disagree with the ledger"));
                }
                session.settle(&stacks)?;
                session.confirm(started + duration)?;
                Ok(session)
            }
            (Status::Finished, _, _) => Err(corrupt("finished game lacks results or duration")),
            _ => Err(corrupt("active game carries results")),
        }
    }
}
