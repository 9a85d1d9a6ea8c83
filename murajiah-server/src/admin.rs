use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json,
};
use murajiah_core::{Database, NewNotification};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{AnnouncementSchema, SetRoleSchema, ValidatedJson},
    serialized::{ToSerialized, User},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<User>),
        (status = 403, description = "Caller does not hold moderation rights")
    )
)]
pub(crate) async fn list_users(
    State(context): State<ServerContext>,
    session: Session,
) -> ServerResult<Json<Vec<User>>> {
    let caller = session.user();

    if !context.platform.roles.has_moderation_rights(caller.id).await {
        return Err(ServerError::Forbidden("Moderation rights are required"));
    }

    let users = context.platform.database().list_users().await?;

    Ok(Json(users.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}/role",
    tag = "admin",
    request_body = SetRoleSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = User),
        (status = 403, description = "Only the owner can change roles")
    )
)]
pub(crate) async fn set_role(
    State(context): State<ServerContext>,
    session: Session,
    Path(user_id): Path<i32>,
    Json(body): Json<SetRoleSchema>,
) -> ServerResult<Json<User>> {
    let caller = session.user();

    if !context.platform.roles.is_owner(caller.id).await {
        return Err(ServerError::Forbidden("Only the owner can change roles"));
    }

    let user = context
        .platform
        .database()
        .set_user_role(user_id, body.role.into())
        .await?;

    Ok(Json(user.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/admin/users/{id}",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "The account was deleted"),
        (status = 403, description = "Caller does not hold moderation rights")
    )
)]
pub(crate) async fn delete_user(
    State(context): State<ServerContext>,
    session: Session,
    Path(user_id): Path<i32>,
) -> ServerResult<()> {
    let caller = session.user();

    if !context.platform.roles.has_moderation_rights(caller.id).await {
        return Err(ServerError::Forbidden("Moderation rights are required"));
    }

    context.platform.auth.delete_user(user_id).await?;

    Ok(())
}

#[utoipa::path(
    post,
    path = "/v1/admin/announcements",
    tag = "admin",
    request_body = AnnouncementSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "The announcement was enqueued for delivery"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub(crate) async fn announce(
    State(context): State<ServerContext>,
    session: Session,
    ValidatedJson(body): ValidatedJson<AnnouncementSchema>,
) -> ServerResult<()> {
    let caller = session.user();

    if !context.platform.roles.is_admin(caller.id).await {
        return Err(ServerError::Forbidden("Only admins can post announcements"));
    }

    context.platform.notifier.enqueue(NewNotification {
        title: body.title,
        message: body.message,
        kind: body.kind.into(),
        target_user_id: body.target_user_id,
    });

    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/role", put(set_role))
        .route("/announcements", post(announce))
}
