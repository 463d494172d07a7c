use hg_core::*;
use hg_dto::CreateGameRequest;
use hg_gameroom::*;
use hg_session::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

pub type Seat<R> = Arc<Mutex<Table<R>>>;

/// A live table and the last time a request reached it.
struct Berth<R> {
    seat: Seat<R>,
    seen: AtomicU64,
}

impl<R> Berth<R> {
    fn new(seat: Seat<R>, now: Timestamp) -> Self {
        Self {
            seat,
            seen: AtomicU64::new(now),
        }
    }
    fn touch(&self, now: Timestamp) -> Seat<R> {
        self.seen.fetch_max(now, Ordering::Relaxed);
        self.seat.clone()
    }
    /// Untouched for `idle` seconds, held by no request, and not holding
    /// candidate results that exist only in memory.
    fn idle(&self, now: Timestamp, idle: Seconds) -> bool {
        elapsed(self.seen.load(Ordering::Relaxed), now) >= idle
            && Arc::strong_count(&self.seat) == 1
            && self
                .seat
                .try_lock()
                .is_ok_and(|table| !table.session().is_locked())
    }
}

/// Registry of live tables.
///
/// Tables are loaded from the repository on first use and kept until they
/// finish or sit idle. Each table sits behind its own mutex, so requests
/// for one game run one at a time while different games proceed in
/// parallel.
pub struct Floor<R> {
    repo: R,
    clock: Arc<dyn Clock>,
    tables: RwLock<HashMap<ID<Game>, Berth<R>>>,
}

impl<R> Floor<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            tables: RwLock::new(HashMap::new()),
        }
    }
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }
    /// Number of tables currently held in memory.
    pub async fn live(&self) -> usize {
        self.tables.read().await.len()
    }
    /// Drops a table from memory; its stored record is untouched.
    pub async fn retire(&self, id: ID<Game>) {
        if self.tables.write().await.remove(&id).is_some() {
            log::debug!("[floor] retired table {}", id);
        }
    }
    /// Retires every table idle for at least `idle` seconds. Everything
    /// such a table knows is already stored, so the next request resumes
    /// it. Settling tables stay until confirmed or reopened.
    pub async fn sweep(&self, idle: Seconds) -> usize {
        let now = self.now();
        let mut tables = self.tables.write().await;
        let before = tables.len();
        tables.retain(|_, berth| !berth.idle(now, idle));
        let swept = before - tables.len();
        if swept > 0 {
            log::debug!("[floor] swept {} idle tables, {} live", swept, tables.len());
        }
        swept
    }
}

impl<R> Floor<R>
where
    R: GameRepository + Clone,
{
    /// Opens a new pending game.
    pub async fn open(&self, req: CreateGameRequest) -> Result<Seat<R>, TableError> {
        let table = Table::create(
            self.repo.clone(),
            self.clock.clone(),
            req.group_id,
            req.created_by,
            req.players,
            req.settings,
        )
        .await?;
        let id = table.id();
        let seat = Arc::new(Mutex::new(table));
        self.tables
            .write()
            .await
            .insert(id, Berth::new(seat.clone(), self.now()));
        log::debug!("[floor] opened table {}", id);
        Ok(seat)
    }
    /// Finds a live table, resuming it from storage if needed.
    pub async fn table(&self, id: ID<Game>) -> Result<Seat<R>, TableError> {
        if let Some(berth) = self.tables.read().await.get(&id) {
            return Ok(berth.touch(self.now()));
        }
        let table = Table::load(self.repo.clone(), self.clock.clone(), id).await?;
        let now = self.now();
        let seat = self
            .tables
            .write()
            .await
            .entry(id)
            .or_insert_with(|| Berth::new(Arc::new(Mutex::new(table)), now))
            .touch(now);
        log::debug!("[floor] resumed table {}", id);
        Ok(seat)
    }
    /// Games history of a group, newest first.
    pub async fn games(&self, group: ID<Group>) -> Result<Vec<Summary>, TableError> {
        self.repo
            .list_games(group)
            .await
            .map_err(TableError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hg_gameroom::Memory;

    const T0: Timestamp = 1_700_000_000;

    fn request() -> CreateGameRequest {
        CreateGameRequest {
            group_id: ID::default(),
            created_by: ID::default(),
            players: vec![
                Player::new(ID::default(), "Dana".to_string()),
                Player::new(ID::default(), "Omer".to_string()),
            ],
            settings: GameSettings::cash(),
        }
    }

    #[actix_web::test]
    async fn retired_tables_resume_from_storage() {
        let floor = Floor::new(Memory::default(), Arc::new(Manual::at(T0)));
        let id = floor.open(request()).await.unwrap().lock().await.id();
        assert_eq!(floor.live().await, 1);
        floor.retire(id).await;
        assert_eq!(floor.live().await, 0);
        let seat = floor.table(id).await.unwrap();
        assert_eq!(seat.lock().await.session().status(), Status::Pending);
        assert_eq!(floor.live().await, 1);
        assert!(matches!(
            floor.table(ID::default()).await,
            Err(TableError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn idle_tables_are_swept_unless_settling() {
        let clock = Arc::new(Manual::at(T0));
        let floor = Floor::new(Memory::default(), clock.clone());
        let quiet = floor.open(request()).await.unwrap().lock().await.id();
        let busy = floor.open(request()).await.unwrap().lock().await.id();
        let seat = floor.open(request()).await.unwrap();
        let settling = {
            let mut table = seat.lock().await;
            table.start().await.unwrap();
            let stacks = table
                .session()
                .game()
                .players()
                .iter()
                .map(|p| (p.id(), 20))
                .collect::<Stacks>();
            table.end(&stacks).unwrap();
            table.id()
        };
        drop(seat);
        clock.advance(600);
        floor.table(busy).await.unwrap();
        assert_eq!(floor.sweep(900).await, 0);
        clock.advance(300);
        assert_eq!(floor.sweep(900).await, 1);
        assert_eq!(floor.live().await, 2);
        let held = floor.table(busy).await.unwrap();
        clock.advance(3_600);
        assert_eq!(floor.sweep(900).await, 0);
        drop(held);
        assert_eq!(floor.sweep(900).await, 1);
        let seat = floor.table(settling).await.unwrap();
        assert!(seat.lock().await.session().is_locked());
        let resumed = floor.table(quiet).await.unwrap();
        assert_eq!(resumed.lock().await.session().status(), Status::Pending);
    }
}
