use axum::{
    extract::{Path, State},
    routing::get,
    Json,
};
use murajiah_core::{NewQuiz, UpdatedQuiz};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewQuizSchema, UpdateQuizSchema, ValidatedJson},
    serialized::{Quiz, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/quizzes",
    tag = "quizzes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Quiz>)
    )
)]
pub(crate) async fn list_quizzes(
    State(context): State<ServerContext>,
    _session: Session,
) -> ServerResult<Json<Vec<Quiz>>> {
    let quizzes = context.platform.quizzes.list_quizzes().await?;

    Ok(Json(quizzes.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/quizzes",
    tag = "quizzes",
    request_body = NewQuizSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Quiz)
    )
)]
pub(crate) async fn create_quiz(
    State(context): State<ServerContext>,
    session: Session,
    ValidatedJson(body): ValidatedJson<NewQuizSchema>,
) -> ServerResult<Json<Quiz>> {
    let quiz = context
        .platform
        .quizzes
        .create_quiz(NewQuiz {
            title: body.title,
            description: body.description,
            owner_id: session.user().id,
        })
        .await?;

    Ok(Json(quiz.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/quizzes/{id}",
    tag = "quizzes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Quiz)
    )
)]
pub(crate) async fn quiz(
    State(context): State<ServerContext>,
    _session: Session,
    Path(quiz_id): Path<i32>,
) -> ServerResult<Json<Quiz>> {
    let quiz = context.platform.quizzes.quiz_by_id(quiz_id).await?;

    Ok(Json(quiz.to_serialized()))
}

#[utoipa::path(
    patch,
    path = "/v1/quizzes/{id}",
    tag = "quizzes",
    request_body = UpdateQuizSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Quiz)
    )
)]
pub(crate) async fn update_quiz(
    State(context): State<ServerContext>,
    session: Session,
    Path(quiz_id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateQuizSchema>,
) -> ServerResult<Json<Quiz>> {
    let quiz = context
        .platform
        .quizzes
        .update_quiz(
            session.user().id,
            UpdatedQuiz {
                id: quiz_id,
                title: body.title,
                description: body.description,
            },
        )
        .await?;

    Ok(Json(quiz.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/quizzes/{id}",
    tag = "quizzes",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "The quiz was deleted")
    )
)]
pub(crate) async fn delete_quiz(
    State(context): State<ServerContext>,
    session: Session,
    Path(quiz_id): Path<i32>,
) -> ServerResult<()> {
    context
        .platform
        .quizzes
        .delete_quiz(session.user().id, quiz_id)
        .await?;

    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/:id", get(quiz).patch(update_quiz).delete(delete_quiz))
}
