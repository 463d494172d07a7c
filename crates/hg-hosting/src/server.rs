use super::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use hg_core::SWEEP_SECS;
use hg_core::TABLE_IDLE_SECS;
use hg_gameroom::GameRepository;
use hg_session::Wall;
use std::sync::Arc;

pub struct Server;

impl Server {
    /// Serves the game API until the process is stopped.
    pub async fn run<R>(repo: R, bind: String, workers: usize) -> Result<(), std::io::Error>
    where
        R: GameRepository + Clone + Send + Sync + 'static,
    {
        let floor = web::Data::new(Floor::new(repo, Arc::new(Wall)));
        let sweeper = floor.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(std::time::Duration::from_secs(SWEEP_SECS));
            loop {
                ticks.tick().await;
                sweeper.sweep(TABLE_IDLE_SECS).await;
            }
        });
        log::info!("starting homegame server on {} ({} workers)", bind, workers);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(floor.clone())
                .configure(routes::<R>)
        })
        .workers(workers)
        .bind(bind)?
        .run()
        .await
    }
}
