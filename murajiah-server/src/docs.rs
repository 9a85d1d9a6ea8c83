use axum::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{admin, auth, games, notifications, quizzes, schemas, serialized, sse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "murajiah API",
        description = "Exposes endpoints to interact with a murajiah server"
    ),
    paths(
        auth::login,
        auth::register,
        auth::register_owner,
        auth::logout,
        auth::user,
        auth::update_user,
        quizzes::list_quizzes,
        quizzes::create_quiz,
        quizzes::quiz,
        quizzes::update_quiz,
        quizzes::delete_quiz,
        games::create_game,
        games::join_game,
        games::game,
        games::perform_game_action,
        games::hosted_games,
        games::active_game_count,
        admin::list_users,
        admin::set_role,
        admin::delete_user,
        admin::announce,
        notifications::list_notifications,
        sse::event_stream,
    ),
    components(schemas(
        schemas::LoginSchema,
        schemas::RegisterSchema,
        schemas::UpdateUserSchema,
        schemas::NewQuizSchema,
        schemas::UpdateQuizSchema,
        schemas::NewGameSchema,
        schemas::JoinGameSchema,
        schemas::GameActionSchema,
        schemas::AnnouncementSchema,
        schemas::SetRoleSchema,
        serialized::User,
        serialized::LoginResult,
        serialized::Quiz,
        serialized::Game,
        serialized::GameJoin,
        serialized::ActiveGameCount,
        serialized::Notification,
        serialized::Role,
        serialized::GameStatus,
        serialized::NotificationKind,
        sse::ServerEvent,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

pub(crate) async fn serve_api() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
