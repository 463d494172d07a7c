use super::*;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use hg_core::ID;
use hg_dto::*;
use hg_gameroom::*;
use hg_session::*;

/// Registers every game route.
pub fn routes<R>(cfg: &mut web::ServiceConfig)
where
    R: GameRepository + Clone + 'static,
{
    cfg.route("/api/games/create", web::post().to(create::<R>))
        .route("/api/games/{id}", web::get().to(game::<R>))
        .route("/api/games/{id}/status", web::post().to(status::<R>))
        .route("/api/games/{id}/rebuys", web::post().to(rebuy::<R>))
        .route("/api/games/{id}/rebuys", web::get().to(rebuys::<R>))
        .route("/api/games/{id}/rebuys/suggested", web::get().to(suggested::<R>))
        .route("/api/games/{id}/end", web::post().to(end::<R>))
        .route("/api/games/{id}/reopen", web::post().to(reopen::<R>))
        .route("/api/groups/{group}/games", web::get().to(games::<R>));
}

pub async fn create<R>(floor: web::Data<Floor<R>>, req: web::Json<CreateGameRequest>) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    match floor.open(req.into_inner()).await {
        Ok(seat) => {
            let table = seat.lock().await;
            HttpResponse::Created().json(ApiResponse::ok(GameView::new(table.session(), table.now())))
        }
        Err(e) => failure(e),
    }
}

pub async fn game<R>(floor: web::Data<Floor<R>>, path: web::Path<ID<Game>>) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    match floor.table(path.into_inner()).await {
        Ok(seat) => {
            let table = seat.lock().await;
            HttpResponse::Ok().json(ApiResponse::ok(GameView::new(table.session(), table.now())))
        }
        Err(e) => failure(e),
    }
}

/// Starts or confirms a game. Finished tables leave the floor.
pub async fn status<R>(
    floor: web::Data<Floor<R>>,
    path: web::Path<ID<Game>>,
    req: web::Json<StatusRequest>,
) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    let id = path.into_inner();
    let seat = match floor.table(id).await {
        Ok(seat) => seat,
        Err(e) => return failure(e),
    };
    let mut table = seat.lock().await;
    if let Err(e) = table.transition(req.status).await {
        return failure(e);
    }
    let view = GameView::new(table.session(), table.now());
    drop(table);
    if view.status == Status::Finished {
        floor.retire(id).await;
    }
    HttpResponse::Ok().json(ApiResponse::ok(view))
}

pub async fn rebuy<R>(
    floor: web::Data<Floor<R>>,
    path: web::Path<ID<Game>>,
    req: web::Json<RebuyRequest>,
) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    let seat = match floor.table(path.into_inner()).await {
        Ok(seat) => seat,
        Err(e) => return failure(e),
    };
    let mut table = seat.lock().await;
    match table.rebuy(req.player_id, req.amount).await {
        Ok(rebuy) => {
            let tally = table.session().ledger().tally(rebuy.player());
            HttpResponse::Created().json(ApiResponse::ok(RebuyReceipt::new(&rebuy, tally)))
        }
        Err(e) => failure(e),
    }
}

pub async fn rebuys<R>(floor: web::Data<Floor<R>>, path: web::Path<ID<Game>>) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    match floor.table(path.into_inner()).await {
        Ok(seat) => {
            let table = seat.lock().await;
            HttpResponse::Ok().json(ApiResponse::ok(RebuyView::history(table.session())))
        }
        Err(e) => failure(e),
    }
}

pub async fn suggested<R>(floor: web::Data<Floor<R>>, path: web::Path<ID<Game>>) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    let seat = match floor.table(path.into_inner()).await {
        Ok(seat) => seat,
        Err(e) => return failure(e),
    };
    let table = seat.lock().await;
    match table.suggest() {
        Ok(amount) => HttpResponse::Ok().json(ApiResponse::ok(Suggestion { amount })),
        Err(e) => failure(e),
    }
}

/// Reconciles final stacks and locks the candidate results.
pub async fn end<R>(
    floor: web::Data<Floor<R>>,
    path: web::Path<ID<Game>>,
    req: web::Json<EndGameRequest>,
) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    let seat = match floor.table(path.into_inner()).await {
        Ok(seat) => seat,
        Err(e) => return failure(e),
    };
    let mut table = seat.lock().await;
    let standings = match table.end(&req.stacks) {
        Ok(settlement) => settlement.standings().to_vec(),
        Err(e) => return failure(e),
    };
    let views = StandingView::all(table.session().game(), &standings);
    HttpResponse::Ok().json(ApiResponse::ok(views))
}

pub async fn reopen<R>(floor: web::Data<Floor<R>>, path: web::Path<ID<Game>>) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    let seat = match floor.table(path.into_inner()).await {
        Ok(seat) => seat,
        Err(e) => return failure(e),
    };
    let mut table = seat.lock().await;
    match table.reopen() {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::ok(GameView::new(table.session(), table.now()))),
        Err(e) => failure(e),
    }
}

pub async fn games<R>(floor: web::Data<Floor<R>>, path: web::Path<ID<Group>>) -> impl Responder
where
    R: GameRepository + Clone + 'static,
{
    match floor.games(path.into_inner()).await {
        Ok(games) => HttpResponse::Ok().json(ApiResponse::ok(games)),
        Err(e) => failure(e),
    }
}

/// Maps a table error onto an HTTP status.
fn failure(e: TableError) -> HttpResponse {
    let body = ApiResponse::<()>::err(&e);
    match e {
        TableError::NotFound(_) => HttpResponse::NotFound().json(body),
        TableError::Unavailable(_) => HttpResponse::ServiceUnavailable().json(body),
        TableError::Rejected(SessionError::Corrupt(_)) => HttpResponse::InternalServerError().json(body),
        TableError::Rejected(ref rejection) => match rejection.kind() {
            ErrorKind::Validation => HttpResponse::UnprocessableEntity().json(body),
            ErrorKind::Invariant => HttpResponse::Conflict().json(body),
        },
    }
}
