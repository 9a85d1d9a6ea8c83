use axum::{extract::State, routing::get, Json};
use murajiah_core::Database;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    serialized::{Notification, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/notifications",
    tag = "notifications",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Notification>)
    )
)]
pub(crate) async fn list_notifications(
    State(context): State<ServerContext>,
    session: Session,
) -> ServerResult<Json<Vec<Notification>>> {
    let notifications = context
        .platform
        .database()
        .notifications_for_user(session.user().id)
        .await?;

    Ok(Json(notifications.to_serialized()))
}

pub fn router() -> Router {
    Router::new().route("/", get(list_notifications))
}
