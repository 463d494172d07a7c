//! Home game server binary.
//!
//! Serves the game API on `--bind` (or `BIND_ADDR`), backed by PostgreSQL
//! at `DB_URL` unless `--memory` is given.
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "homegame", about = "Home poker game server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8888")]
    bind: String,
    /// HTTP worker threads.
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    workers: usize,
    /// Keep games in process memory instead of PostgreSQL.
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() {
    hg_core::log();
    hg_core::kys();
    let args = Args::parse();
    if args.memory {
        log::warn!("games are kept in memory and lost on exit");
        let repo = hg_gameroom::Memory::default();
        hg_hosting::Server::run(repo, args.bind, args.workers)
            .await
            .unwrap();
    } else {
        let db = hg_pg::db().await;
        hg_gameroom::migrate(&db).await.expect("schema migration");
        hg_hosting::Server::run(db, args.bind, args.workers)
            .await
            .unwrap();
    }
}
