use super::*;
use hg_core::*;
use hg_session::*;
use std::sync::Arc;

/// Imperative shell around one [`GameSession`].
///
/// Every state change runs in three steps: the session checks its
/// preconditions, the repository persists, and only then does the session
/// apply the change. A rejected check or a failed write leaves the local
/// session untouched.
///
/// The candidate settlement is local only. Until confirmation the stored
/// game stays active, so a reload drops an unconfirmed settlement.
pub struct Table<R> {
    repo: R,
    clock: Arc<dyn Clock>,
    session: GameSession,
}

impl<R> Table<R>
where
    R: GameRepository,
{
    /// Registers a new pending game.
    pub async fn create(
        repo: R,
        clock: Arc<dyn Clock>,
        group: ID<Group>,
        created_by: ID<Player>,
        players: Vec<Player>,
        settings: GameSettings,
    ) -> Result<Self, TableError> {
        let game = Game::new(ID::default(), group, created_by, clock.now(), settings, players)?;
        repo.create_game(&game).await.map_err(TableError::storage)?;
        log::info!(
            "[table {}] created {} game with {} players",
            game.id(),
            game.settings().game_type(),
            game.players().len()
        );
        Ok(Self {
            repo,
            clock,
            session: GameSession::new(game),
        })
    }
    /// Resumes a stored game. Elapsed time picks up from the stored start.
    pub async fn load(repo: R, clock: Arc<dyn Clock>, id: ID<Game>) -> Result<Self, TableError> {
        let snapshot = repo
            .load_game(id)
            .await
            .map_err(TableError::storage)?
            .ok_or(TableError::NotFound(id))?;
        let session = GameSession::try_from(snapshot)?;
        log::info!(
            "[table {}] resumed {} at {}",
            id,
            session.status(),
            hms(session.elapsed(clock.now()))
        );
        Ok(Self {
            repo,
            clock,
            session,
        })
    }
}

impl<R> Table<R> {
    pub fn id(&self) -> ID<Game> {
        self.session.game().id()
    }
    pub fn session(&self) -> &GameSession {
        &self.session
    }
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }
    pub fn elapsed(&self) -> Seconds {
        self.session.elapsed(self.now())
    }
    pub fn suggest(&self) -> Result<Chips, TableError> {
        Ok(self.session.suggest()?)
    }
    /// Reconciles final stacks and locks the candidate results.
    pub fn end(&mut self, stacks: &Stacks) -> Result<&Settlement, TableError> {
        let chips = self.session.settle(stacks)?.total();
        log::info!("[table {}] settlement locked, {} chips", self.id(), chips);
        self.session
            .settlement()
            .ok_or(TableError::Rejected(SessionError::NotLocked))
    }
    /// Discards the candidate results and resumes play.
    pub fn reopen(&mut self) -> Result<(), TableError> {
        self.session.reopen()?;
        log::info!("[table {}] reopened", self.id());
        Ok(())
    }
}

impl<R> Table<R>
where
    R: GameRepository,
{
    pub async fn start(&mut self) -> Result<(), TableError> {
        self.session.check_start()?;
        let at = self.now();
        self.repo
            .set_status(self.id(), Status::Active, at)
            .await
            .map_err(TableError::storage)?;
        self.session.start(at)?;
        Ok(())
    }
    /// Applies a requested status change: start or confirm.
    pub async fn transition(&mut self, to: Status) -> Result<(), TableError> {
        self.session.check_status(to)?;
        match to {
            Status::Active => self.start().await,
            _ => self.confirm().await.map(|_| ()),
        }
    }
    pub async fn rebuy(&mut self, player: ID<Player>, amount: Chips) -> Result<Rebuy, TableError> {
        self.session.check_rebuy(player, amount)?;
        let rebuy = Rebuy::new(ID::default(), player, amount, self.elapsed());
        self.repo
            .append_rebuy(self.id(), &rebuy)
            .await
            .map_err(TableError::storage)?;
        self.session.record(rebuy.clone())?;
        log::debug!(
            "[table {}] rebuy {} for {} (#{})",
            self.id(),
            amount,
            player,
            self.session.ledger().tally(player).count()
        );
        Ok(rebuy)
    }
    /// Persists the locked results and finishes the game.
    pub async fn confirm(&mut self) -> Result<&Settlement, TableError> {
        self.session.check_confirm()?;
        let at = self.now();
        let duration = self.session.elapsed(at);
        let results = self
            .session
            .settlement()
            .map(|s| s.standings().to_vec())
            .unwrap_or_default();
        self.repo
            .finish_game(self.id(), &results, duration)
            .await
            .map_err(TableError::storage)?;
        Ok(self.session.confirm(at)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;

    const T0: Timestamp = 1_700_000_000;

    /// Repository that fails every call while `down` is set.
    #[derive(Clone, Default)]
    struct Flaky {
        inner: Memory,
        down: Arc<AtomicBool>,
    }

    impl Flaky {
        fn check(&self) -> anyhow::Result<()> {
            match self.down.load(Ordering::SeqCst) {
                true => Err(anyhow::anyhow!("connection refused")),
                false => Ok(()),
            }
        }
    }

    impl GameRepository for Flaky {
        async fn create_game(&self, game: &Game) -> anyhow::Result<()> {
            self.check()?;
            self.inner.create_game(game).await
        }
        async fn load_game(&self, id: ID<Game>) -> anyhow::Result<Option<Snapshot>> {
            self.check()?;
            self.inner.load_game(id).await
        }
        async fn set_status(&self, id: ID<Game>, status: Status, at: Timestamp) -> anyhow::Result<()> {
            self.check()?;
            self.inner.set_status(id, status, at).await
        }
        async fn append_rebuy(&self, id: ID<Game>, rebuy: &Rebuy) -> anyhow::Result<ID<Rebuy>> {
            self.check()?;
            self.inner.append_rebuy(id, rebuy).await
        }
        async fn finish_game(
            &self,
            id: ID<Game>,
            results: &[Standing],
            duration: Seconds,
        ) -> anyhow::Result<()> {
            self.check()?;
            self.inner.finish_game(id, results, duration).await
        }
        async fn list_rebuys(&self, id: ID<Game>) -> anyhow::Result<Vec<Rebuy>> {
            self.check()?;
            self.inner.list_rebuys(id).await
        }
        async fn list_games(&self, group: ID<Group>) -> anyhow::Result<Vec<Summary>> {
            self.check()?;
            self.inner.list_games(group).await
        }
    }

    fn roster() -> Vec<Player> {
        vec![
            Player::new(ID::default(), "Dana".into()),
            Player::new(ID::default(), "Omer".into()),
        ]
    }
    async fn table<R: GameRepository>(repo: R, clock: Arc<Manual>) -> Table<R> {
        let players = roster();
        Table::create(
            repo,
            clock,
            ID::default(),
            players[0].id(),
            players,
            GameSettings::cash(),
        )
        .await
        .unwrap()
    }
    fn seat<R>(table: &Table<R>, i: usize) -> ID<Player> {
        table.session().game().players()[i].id()
    }
    fn even<R>(table: &Table<R>) -> Stacks {
        table
            .session()
            .game()
            .players()
            .iter()
            .map(|p| (p.id(), 20 + table.session().ledger().tally(p.id()).total()))
            .collect()
    }

    #[tokio::test]
    async fn game_runs_start_to_finish() {
        let clock = Arc::new(Manual::at(T0));
        let repo = Memory::default();
        let mut table = table(repo.clone(), clock.clone()).await;
        table.start().await.unwrap();
        clock.advance(600);
        let rebuy = table.rebuy(seat(&table, 0), 15).await.unwrap();
        assert_eq!(rebuy.offset(), 600);
        let ref stacks = even(&table);
        table.end(stacks).unwrap();
        clock.advance(3_000);
        table.transition(Status::Finished).await.unwrap();
        let stored = repo.load_game(table.id()).await.unwrap().unwrap();
        assert_eq!(stored.status, Status::Finished);
        assert_eq!(stored.duration_seconds, Some(3_600));
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.results.unwrap().len(), 2);
    }
    #[tokio::test]
    async fn resumed_table_continues_the_clock() {
        let clock = Arc::new(Manual::at(T0));
        let repo = Memory::default();
        let mut live = table(repo.clone(), clock.clone()).await;
        live.start().await.unwrap();
        live.rebuy(seat(&live, 1), 10).await.unwrap();
        clock.advance(5_400);
        let resumed = Table::load(repo, clock.clone(), live.id()).await.unwrap();
        assert_eq!(resumed.elapsed(), live.elapsed());
        assert_eq!(resumed.elapsed(), 5_400);
        assert_eq!(resumed.session().ledger(), live.session().ledger());
    }
    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let clock = Arc::new(Manual::at(T0));
        let id = ID::default();
        assert!(matches!(
            Table::load(Memory::default(), clock, id).await,
            Err(TableError::NotFound(missing)) if missing == id
        ));
    }
    #[tokio::test]
    async fn storage_failure_changes_nothing() {
        let clock = Arc::new(Manual::at(T0));
        let repo = Flaky::default();
        let mut table = table(repo.clone(), clock.clone()).await;
        repo.down.store(true, Ordering::SeqCst);
        let before = table.session().clone();
        assert!(table.start().await.unwrap_err().is_retryable());
        assert_eq!(table.session(), &before);
        repo.down.store(false, Ordering::SeqCst);
        table.start().await.unwrap();
        repo.down.store(true, Ordering::SeqCst);
        let before = table.session().clone();
        assert!(table.rebuy(seat(&table, 0), 10).await.unwrap_err().is_retryable());
        assert_eq!(table.session(), &before);
        let ref stacks = even(&table);
        table.end(stacks).unwrap();
        let before = table.session().clone();
        assert!(table.confirm().await.unwrap_err().is_retryable());
        assert_eq!(table.session(), &before);
        assert_eq!(table.session().phase(), Phase::Settling);
        repo.down.store(false, Ordering::SeqCst);
        table.confirm().await.unwrap();
        assert_eq!(table.session().status(), Status::Finished);
    }
    #[tokio::test]
    async fn rejected_rebuy_never_reaches_storage() {
        let clock = Arc::new(Manual::at(T0));
        let repo = Memory::default();
        let mut table = table(repo.clone(), clock).await;
        table.start().await.unwrap();
        assert_eq!(
            table.rebuy(seat(&table, 0), 30).await.unwrap_err(),
            TableError::Rejected(SessionError::RebuyOutOfRange {
                amount: 30,
                min: 10,
                max: 25
            })
        );
        assert!(repo.list_rebuys(table.id()).await.unwrap().is_empty());
    }
    #[tokio::test]
    async fn unconfirmed_settlement_is_dropped_on_reload() {
        let clock = Arc::new(Manual::at(T0));
        let repo = Memory::default();
        let mut table = table(repo.clone(), clock.clone()).await;
        table.start().await.unwrap();
        let ref stacks = even(&table);
        table.end(stacks).unwrap();
        let resumed = Table::load(repo, clock, table.id()).await.unwrap();
        assert_eq!(resumed.session().phase(), Phase::Active);
        assert!(resumed.session().settlement().is_none());
    }
}
