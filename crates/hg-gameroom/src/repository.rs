use hg_core::*;
use hg_pg::*;
use hg_session::*;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::Row;

/// Durable storage for game sessions.
///
/// Writes are conditional on the stored status, so a write that races a
/// conflicting transition fails instead of corrupting the record.
#[allow(async_fn_in_trait)]
pub trait GameRepository {
    async fn create_game(&self, game: &Game) -> anyhow::Result<()>;
    async fn load_game(&self, id: ID<Game>) -> anyhow::Result<Option<Snapshot>>;
    async fn set_status(&self, id: ID<Game>, status: Status, at: Timestamp) -> anyhow::Result<()>;
    async fn append_rebuy(&self, id: ID<Game>, rebuy: &Rebuy) -> anyhow::Result<ID<Rebuy>>;
    async fn finish_game(
        &self,
        id: ID<Game>,
        results: &[Standing],
        duration: Seconds,
    ) -> anyhow::Result<()>;
    async fn list_rebuys(&self, id: ID<Game>) -> anyhow::Result<Vec<Rebuy>>;
    async fn list_games(&self, group: ID<Group>) -> anyhow::Result<Vec<Summary>>;
}

/// Creates every table and index the repository needs.
pub async fn migrate(client: &Client) -> Result<(), PgErr> {
    hg_pg::migrate(
        client,
        &[
            Game::creates(),
            Player::creates(),
            Rebuy::creates(),
            Standing::creates(),
            Game::indices(),
            Player::indices(),
            Rebuy::indices(),
            Standing::indices(),
        ],
    )
    .await
}

/// The status a game must hold before moving to `status`.
fn predecessor(status: Status) -> anyhow::Result<Status> {
    [Status::Pending, Status::Active, Status::Finished]
        .into_iter()
        .find(|s| s.successor() == Some(status))
        .ok_or_else(|| anyhow::anyhow!("no transition leads to {}", status))
}

impl GameRepository for Arc<Client> {
    /// Inserts the header and the roster in one statement.
    async fn create_game(&self, game: &Game) -> anyhow::Result<()> {
        let ids = game
            .players()
            .iter()
            .map(|p| p.id().inner())
            .collect::<Vec<uuid::Uuid>>();
        let seats = (0..i16::try_from(game.players().len())?).collect::<Vec<i16>>();
        let names = game
            .players()
            .iter()
            .map(|p| p.name().to_string())
            .collect::<Vec<String>>();
        let settings = serde_json::to_string(game.settings())?;
        self.execute(
            const_format::concatcp!(
                "WITH g AS (INSERT INTO ",
                GAMES,
                " (id, group_id, created_by, created_at, game_type, settings) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id) ",
                "INSERT INTO ",
                SEATS,
                " (game_id, player_id, seat, name) SELECT g.id, s.player_id, s.seat, s.name FROM g, UNNEST($7::uuid[], $8::smallint[], $9::text[]) AS s(player_id, seat, name)"
            ),
            &[
                &game.id().inner(),
                &game.group().inner(),
                &game.created_by().inner(),
                &(game.created_at() as i64),
                &game.settings().game_type(),
                &settings,
                &ids,
                &seats,
                &names,
            ],
        )
        .await
        .map(|_| ())
        .map_err(anyhow::Error::from)
    }
    async fn load_game(&self, id: ID<Game>) -> anyhow::Result<Option<Snapshot>> {
        let Some(row) = self
            .query_opt(
                const_format::concatcp!(
                    "SELECT group_id, created_by, created_at, settings, status, started_at, duration FROM ",
                    GAMES,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?
        else {
            return Ok(None);
        };
        let players = self
            .query(
                const_format::concatcp!(
                    "SELECT player_id, name FROM ",
                    SEATS,
                    " WHERE game_id = $1 ORDER BY seat"
                ),
                &[&id.inner()],
            )
            .await?
            .iter()
            .map(|r| Player::new(ID::from(r.get::<_, uuid::Uuid>(0)), r.get::<_, String>(1)))
            .collect::<Vec<Player>>();
        let game = Game::new(
            id,
            ID::from(row.get::<_, uuid::Uuid>(0)),
            ID::from(row.get::<_, uuid::Uuid>(1)),
            instant(row.get::<_, i64>(2))?,
            settings(&row.get::<_, String>(3))?,
            players,
        )
        .map_err(|e| corrupt(format!("game {}: {}", id, e)))?;
        let status = row.get::<_, String>(4).parse::<Status>()?;
        let results = match status {
            Status::Finished => Some(
                self.query(
                    const_format::concatcp!(
                        "SELECT player_id, money_in, money_out FROM ",
                        RESULTS,
                        " WHERE game_id = $1 ORDER BY seat"
                    ),
                    &[&id.inner()],
                )
                .await?
                .iter()
                .map(|r| {
                    standing(
                        ID::from(r.get::<_, uuid::Uuid>(0)),
                        r.get::<_, i64>(1),
                        r.get::<_, i64>(2),
                    )
                })
                .collect::<Result<Vec<Standing>, SessionError>>()?,
            ),
            _ => None,
        };
        Ok(Some(Snapshot {
            game,
            status,
            started_at: row.get::<_, Option<i64>>(5).map(instant).transpose()?,
            duration_seconds: row.get::<_, Option<i64>>(6).map(instant).transpose()?,
            history: self.list_rebuys(id).await?,
            results,
        }))
    }
    /// Only `pending → active` and `active → finished` match a row.
    async fn set_status(&self, id: ID<Game>, status: Status, at: Timestamp) -> anyhow::Result<()> {
        let from = predecessor(status)?;
        let n = self
            .execute(
                const_format::concatcp!(
                    "UPDATE ",
                    GAMES,
                    " SET status = $2, ",
                    "started_at = COALESCE(started_at, $4), ",
                    "duration = CASE WHEN $2 = 'finished' THEN $4 - started_at ELSE duration END ",
                    "WHERE id = $1 AND status = $3"
                ),
                &[&id.inner(), &status.as_str(), &from.as_str(), &(at as i64)],
            )
            .await?;
        match n {
            1 => Ok(()),
            _ => Err(anyhow::anyhow!("game {} is not {}", id, from)),
        }
    }
    /// Appends only while the stored game is active.
    async fn append_rebuy(&self, id: ID<Game>, rebuy: &Rebuy) -> anyhow::Result<ID<Rebuy>> {
        let n = self
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    REBUYS,
                    " (id, game_id, player_id, amount, offset_secs) SELECT $1, $2, $3, $4, $5 WHERE EXISTS (SELECT 1 FROM ",
                    GAMES,
                    " WHERE id = $2 AND status = 'active')"
                ),
                &[
                    &rebuy.id().inner(),
                    &id.inner(),
                    &rebuy.player().inner(),
                    &rebuy.amount(),
                    &(rebuy.offset() as i64),
                ],
            )
            .await?;
        match n {
            1 => Ok(rebuy.id()),
            _ => Err(anyhow::anyhow!("game {} is not active", id)),
        }
    }
    /// Marks the game finished and writes its results in one statement.
    async fn finish_game(
        &self,
        id: ID<Game>,
        results: &[Standing],
        duration: Seconds,
    ) -> anyhow::Result<()> {
        let players = results
            .iter()
            .map(|s| s.player().inner())
            .collect::<Vec<uuid::Uuid>>();
        let seats = (0..i16::try_from(results.len())?).collect::<Vec<i16>>();
        let ins = results.iter().map(Standing::money_in).collect::<Vec<i64>>();
        let outs = results.iter().map(Standing::money_out).collect::<Vec<i64>>();
        let profits = results.iter().map(Standing::profit).collect::<Vec<i64>>();
        let n = self
            .execute(
                const_format::concatcp!(
                    "WITH g AS (UPDATE ",
                    GAMES,
                    " SET status = 'finished', duration = $2 WHERE id = $1 AND status = 'active' RETURNING id) ",
                    "INSERT INTO ",
                    RESULTS,
                    " (game_id, player_id, seat, money_in, money_out, profit) ",
                    "SELECT g.id, r.player_id, r.seat, r.money_in, r.money_out, r.profit FROM g, ",
                    "UNNEST($3::uuid[], $4::smallint[], $5::bigint[], $6::bigint[], $7::bigint[]) ",
                    "AS r(player_id, seat, money_in, money_out, profit)"
                ),
                &[
                    &id.inner(),
                    &(duration as i64),
                    &players,
                    &seats,
                    &ins,
                    &outs,
                    &profits,
                ],
            )
            .await?;
        if n == 0 || n as usize != results.len() {
            return Err(anyhow::anyhow!("game {} is not active", id));
        }
        Ok(())
    }
    async fn list_rebuys(&self, id: ID<Game>) -> anyhow::Result<Vec<Rebuy>> {
        self.query(
            const_format::concatcp!(
                "SELECT id, player_id, amount, offset_secs FROM ",
                REBUYS,
                " WHERE game_id = $1 ORDER BY seq"
            ),
            &[&id.inner()],
        )
        .await?
        .iter()
        .map(rebuy)
        .collect::<Result<Vec<Rebuy>, SessionError>>()
        .map_err(anyhow::Error::from)
    }
    async fn list_games(&self, group: ID<Group>) -> anyhow::Result<Vec<Summary>> {
        self.query(
            const_format::concatcp!(
                "SELECT g.id, g.settings, g.status, g.created_at, g.started_at, g.duration, ",
                "(SELECT COUNT(*) FROM ",
                SEATS,
                " s WHERE s.game_id = g.id) FROM ",
                GAMES,
                " g WHERE g.group_id = $1 ORDER BY g.created_at DESC"
            ),
            &[&group.inner()],
        )
        .await?
        .iter()
        .map(summary)
        .collect()
    }
}

fn rebuy(row: &Row) -> Result<Rebuy, SessionError> {
    Ok(Rebuy::new(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        ID::from(row.get::<_, uuid::Uuid>(1)),
        row.get::<_, i64>(2),
        instant(row.get::<_, i64>(3))?,
    ))
}

fn summary(row: &Row) -> anyhow::Result<Summary> {
    Ok(Summary::new(
        &settings(&row.get::<_, String>(1))?,
        ID::from(row.get::<_, uuid::Uuid>(0)),
        row.get::<_, String>(2).parse::<Status>()?,
        usize::try_from(row.get::<_, i64>(6))?,
        instant(row.get::<_, i64>(3))?,
        row.get::<_, Option<i64>>(4).map(instant).transpose()?,
        row.get::<_, Option<i64>>(5).map(instant).transpose()?,
    ))
}

/// Stored columns that cannot be read back are corrupt, not unavailable.
fn corrupt(reason: String) -> SessionError {
    SessionError::Corrupt(reason)
}

/// Timestamps and durations are stored as BIGINT seconds.
fn instant(secs: i64) -> Result<u64, SessionError> {
    u64::try_from(secs).map_err(|_| corrupt(format!("negative time {}", secs)))
}

fn settings(json: &str) -> Result<GameSettings, SessionError> {
    serde_json::from_str(json).map_err(|e| corrupt(format!("unreadable settings: {}", e)))
}

fn standing(player: ID<Player>, money_in: i64, money_out: i64) -> Result<Standing, SessionError> {
    match money_in >= 0 && money_out >= 0 {
        true => Ok(Standing::new(player, money_in, money_out)),
        false => Err(corrupt(format!(
            "negative result for player {}: {} in, {} out",
            player, money_in, money_out
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn unreadable_columns_are_corrupt() {
        assert_eq!(instant(90), Ok(90));
        assert!(matches!(instant(-1), Err(SessionError::Corrupt(_))));
        assert!(matches!(settings("{"), Err(SessionError::Corrupt(_))));
        let json = serde_json::to_string(&GameSettings::cash()).unwrap();
        assert_eq!(settings(&json), Ok(GameSettings::cash()));
        assert!(matches!(
            standing(ID::default(), 20, -5),
            Err(SessionError::Corrupt(_))
        ));
        assert_eq!(standing(ID::default(), 20, 25).map(|s| s.profit()), Ok(5));
    }
    #[test]
    fn transitions_have_one_predecessor() {
        assert_eq!(predecessor(Status::Active).unwrap(), Status::Pending);
        assert_eq!(predecessor(Status::Finished).unwrap(), Status::Active);
        assert!(predecessor(Status::Pending).is_err());
    }
}
