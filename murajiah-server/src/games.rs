use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json,
};
use murajiah_core::NewGameRequest;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{GameActionSchema, JoinGameSchema, NewGameSchema, ValidatedJson},
    serialized::{ActiveGameCount, Game, GameJoin, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/games",
    tag = "games",
    request_body = NewGameSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Game)
    )
)]
pub(crate) async fn create_game(
    State(context): State<ServerContext>,
    session: Session,
    ValidatedJson(body): ValidatedJson<NewGameSchema>,
) -> ServerResult<Json<Game>> {
    let game = context
        .platform
        .games
        .create_game(NewGameRequest {
            quiz_id: body.quiz_id,
            host_id: session.user().id,
            is_preview: body.is_preview,
        })
        .await?;

    Ok(Json(game.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/games/join",
    tag = "games",
    request_body = JoinGameSchema,
    responses(
        (status = 200, body = GameJoin),
        (status = 404, description = "No such PIN, or the game already ended")
    )
)]
pub(crate) async fn join_game(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<JoinGameSchema>,
) -> ServerResult<Json<GameJoin>> {
    let game = context.platform.games.game_by_pin(&body.pin).await?;

    Ok(Json(GameJoin { game_id: game.id }))
}

#[utoipa::path(
    get,
    path = "/v1/games/{id}",
    tag = "games",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Game)
    )
)]
pub(crate) async fn game(
    State(context): State<ServerContext>,
    _session: Session,
    Path(game_id): Path<i32>,
) -> ServerResult<Json<Game>> {
    let game = context.platform.games.game_by_id(game_id).await?;

    Ok(Json(game.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/games/{id}/actions",
    tag = "games",
    request_body = GameActionSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Game, description = "Action was performed.")
    )
)]
pub(crate) async fn perform_game_action(
    State(context): State<ServerContext>,
    session: Session,
    Path(game_id): Path<i32>,
    Json(body): Json<GameActionSchema>,
) -> ServerResult<Json<Game>> {
    let caller = session.user().id;

    let game = match body {
        GameActionSchema::Start => context.platform.games.start_game(game_id, caller).await?,
        GameActionSchema::End => context.platform.games.end_game(game_id, caller).await?,
    };

    Ok(Json(game.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/games/hosted",
    tag = "games",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Game>)
    )
)]
pub(crate) async fn hosted_games(
    State(context): State<ServerContext>,
    session: Session,
) -> ServerResult<Json<Vec<Game>>> {
    let games = context
        .platform
        .games
        .games_by_host(session.user().id)
        .await?;

    Ok(Json(games.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/games/hosted/count",
    tag = "games",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = ActiveGameCount)
    )
)]
pub(crate) async fn active_game_count(
    State(context): State<ServerContext>,
    session: Session,
) -> ServerResult<Json<ActiveGameCount>> {
    let count = context
        .platform
        .games
        .count_active_games(session.user().id)
        .await?;

    Ok(Json(ActiveGameCount { count }))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_game))
        .route("/join", post(join_game))
        .route("/hosted", get(hosted_games))
        .route("/hosted/count", get(active_game_count))
        .route("/:id", get(game))
        .route("/:id/actions", post(perform_game_action))
}
