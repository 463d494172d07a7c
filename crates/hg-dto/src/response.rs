use hg_core::*;
use hg_session::*;
use serde::Deserialize;
use serde::Serialize;

/// Uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// Full view of one game as the client renders it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: ID<Game>,
    pub group_id: ID<Group>,
    pub created_by: ID<Player>,
    pub created_at: Timestamp,
    pub settings: GameSettings,
    pub players: Vec<Player>,
    pub status: Status,
    pub phase: Phase,
    pub locked: bool,
    pub started_at: Option<Timestamp>,
    pub elapsed_seconds: Seconds,
    /// Elapsed time as `HH:MM:SS`.
    pub elapsed: String,
    pub duration_seconds: Option<Seconds>,
    pub tallies: Vec<TallyView>,
    pub history: Vec<RebuyView>,
    /// Candidate results while settling, confirmed results once finished.
    pub results: Option<Vec<StandingView>>,
    pub level: Option<u32>,
    pub late_registration_open: bool,
}

impl GameView {
    pub fn new(session: &GameSession, now: Timestamp) -> Self {
        let game = session.game();
        let elapsed_seconds = session.elapsed(now);
        Self {
            id: game.id(),
            group_id: game.group(),
            created_by: game.created_by(),
            created_at: game.created_at(),
            settings: game.settings().clone(),
            players: game.players().to_vec(),
            status: session.status(),
            phase: session.phase(),
            locked: session.is_locked(),
            started_at: session.started(),
            elapsed_seconds,
            elapsed: hms(elapsed_seconds),
            duration_seconds: session.duration(),
            tallies: game
                .players()
                .iter()
                .map(|p| TallyView::new(p, session.ledger().tally(p.id())))
                .collect(),
            history: RebuyView::history(session),
            results: session.settlement().map(|s| StandingView::all(game, s.standings())),
            level: session.level(now),
            late_registration_open: session.late_registration_open(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyView {
    pub player_id: ID<Player>,
    pub display_name: String,
    pub count: u32,
    pub total_amount: Chips,
}

impl TallyView {
    pub fn new(player: &Player, tally: Tally) -> Self {
        Self {
            player_id: player.id(),
            display_name: player.name().to_string(),
            count: tally.count(),
            total_amount: tally.total(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuyView {
    pub id: ID<Rebuy>,
    pub player_id: ID<Player>,
    pub display_name: String,
    pub amount: Chips,
    pub seconds_from_start: Seconds,
    /// Offset as `HH:MM:SS`.
    pub time: String,
}

impl RebuyView {
    pub fn new(game: &Game, rebuy: &Rebuy) -> Self {
        Self {
            id: rebuy.id(),
            player_id: rebuy.player(),
            display_name: display(game, rebuy.player()),
            amount: rebuy.amount(),
            seconds_from_start: rebuy.offset(),
            time: hms(rebuy.offset()),
        }
    }
    /// Chronological history of a session.
    pub fn history(session: &GameSession) -> Vec<Self> {
        session
            .ledger()
            .history()
            .iter()
            .map(|r| Self::new(session.game(), r))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingView {
    pub player_id: ID<Player>,
    pub display_name: String,
    pub money_in: Chips,
    pub money_out: Chips,
    pub profit: Chips,
}

impl StandingView {
    pub fn new(game: &Game, standing: &Standing) -> Self {
        Self {
            player_id: standing.player(),
            display_name: display(game, standing.player()),
            money_in: standing.money_in(),
            money_out: standing.money_out(),
            profit: standing.profit(),
        }
    }
    pub fn all(game: &Game, standings: &[Standing]) -> Vec<Self> {
        standings.iter().map(|s| Self::new(game, s)).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuyReceipt {
    pub rebuy_id: ID<Rebuy>,
    pub player_id: ID<Player>,
    pub amount: Chips,
    pub seconds_from_start: Seconds,
    pub count: u32,
    pub total_amount: Chips,
}

impl RebuyReceipt {
    pub fn new(rebuy: &Rebuy, tally: Tally) -> Self {
        Self {
            rebuy_id: rebuy.id(),
            player_id: rebuy.player(),
            amount: rebuy.amount(),
            seconds_from_start: rebuy.offset(),
            count: tally.count(),
            total_amount: tally.total(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub amount: Chips,
}

fn display(game: &Game, player: ID<Player>) -> String {
    game.player(player)
        .map(Player::name)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn envelope_omits_missing_fields() {
        let ok = serde_json::to_value(ApiResponse::ok(Suggestion { amount: 10 })).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"]["amount"], 10);
        assert!(ok.get("error").is_none());
        let err = serde_json::to_value(ApiResponse::<()>::err("game is locked")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "game is locked");
        assert!(err.get("data").is_none());
    }
    #[test]
    fn view_names_players_and_formats_time() {
        let dana = Player::new(ID::default(), "Dana".into());
        let omer = Player::new(ID::default(), "Omer".into());
        let game = Game::new(
            ID::default(),
            ID::default(),
            dana.id(),
            0,
            GameSettings::cash(),
            vec![dana.clone(), omer],
        )
        .unwrap();
        let mut session = GameSession::new(game);
        session.start(1_000).unwrap();
        session.rebuy(dana.id(), 15, 1_000 + 3_725).unwrap();
        let view = GameView::new(&session, 1_000 + 3_726);
        assert_eq!(view.elapsed, "01:02:06");
        assert_eq!(view.history[0].display_name, "Dana");
        assert_eq!(view.history[0].time, "01:02:05");
        assert_eq!(view.tallies[0].total_amount, 15);
        assert_eq!(view.tallies[1].count, 0);
        assert!(view.results.is_none());
        assert_eq!(view.level, None);
    }
}
