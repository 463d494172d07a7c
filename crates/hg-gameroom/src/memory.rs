use super::*;
use hg_core::*;
use hg_session::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process repository. Clones share the same store.
///
/// Enforces the same conditional writes as the PostgreSQL implementation.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    games: Arc<RwLock<HashMap<ID<Game>, Snapshot>>>,
}

impl GameRepository for Memory {
    async fn create_game(&self, game: &Game) -> anyhow::Result<()> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.id()) {
            return Err(anyhow::anyhow!("game {} already exists", game.id()));
        }
        games.insert(
            game.id(),
            Snapshot {
                game: game.clone(),
                status: Status::Pending,
                started_at: None,
                duration_seconds: None,
                history: Vec::new(),
                results: None,
            },
        );
        Ok(())
    }
    async fn load_game(&self, id: ID<Game>) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.games.read().await.get(&id).cloned())
    }
    async fn set_status(&self, id: ID<Game>, status: Status, at: Timestamp) -> anyhow::Result<()> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("game {} not found", id))?;
        if game.status.successor() != Some(status) {
            return Err(anyhow::anyhow!("game {} cannot move to {}", id, status));
        }
        game.started_at = game.started_at.or(Some(at));
        if status == Status::Finished {
            game.duration_seconds = game.started_at.map(|started| elapsed(started, at));
        }
        game.status = status;
        Ok(())
    }
    async fn append_rebuy(&self, id: ID<Game>, rebuy: &Rebuy) -> anyhow::Result<ID<Rebuy>> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(&id)
            .filter(|g| g.status == Status::Active)
            .ok_or_else(|| anyhow::anyhow!("game {} is not active", id))?;
        game.history.push(rebuy.clone());
        Ok(rebuy.id())
    }
    async fn finish_game(
        &self,
        id: ID<Game>,
        results: &[Standing],
        duration: Seconds,
    ) -> anyhow::Result<()> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(&id)
            .filter(|g| g.status == Status::Active)
            .ok_or_else(|| anyhow::anyhow!("game {} is not active", id))?;
        game.status = Status::Finished;
        game.duration_seconds = Some(duration);
        game.results = Some(results.to_vec());
        Ok(())
    }
    async fn list_rebuys(&self, id: ID<Game>) -> anyhow::Result<Vec<Rebuy>> {
        self.games
            .read()
            .await
            .get(&id)
            .map(|g| g.history.clone())
            .ok_or_else(|| anyhow::anyhow!("game {} not found", id))
    }
    async fn list_games(&self, group: ID<Group>) -> anyhow::Result<Vec<Summary>> {
        let mut games = self
            .games
            .read()
            .await
            .values()
            .filter(|s| s.game.group() == group)
            .map(Summary::from)
            .collect::<Vec<Summary>>();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(games)
    }
}
