use async_trait::async_trait;
use thiserror::Error;

mod data;
pub use data::*;

mod pg;
pub use pg::*;

#[cfg(test)]
pub mod memory;

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type BoxedDatabase = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch murajiah data from a database
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn check_for_owner(&self) -> Result<bool>;
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_username(&self, username: &str) -> Result<UserData>;
    async fn list_users(&self) -> Result<Vec<UserData>>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;
    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData>;
    async fn set_user_role(&self, user_id: PrimaryKey, role: Role) -> Result<UserData>;
    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()>;

    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn clear_expired_sessions(&self) -> Result<()>;

    async fn quiz_by_id(&self, quiz_id: PrimaryKey) -> Result<QuizData>;
    async fn list_quizzes(&self) -> Result<Vec<QuizData>>;
    async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<QuizData>;
    async fn update_quiz(&self, updated_quiz: UpdatedQuiz) -> Result<QuizData>;
    async fn delete_quiz(&self, quiz_id: PrimaryKey) -> Result<()>;

    async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData>;
    /// Returns the most recent non-finished game with this exact pin
    async fn game_by_pin(&self, pin: &str) -> Result<GameData>;
    async fn games_by_host(&self, host_id: PrimaryKey) -> Result<Vec<GameData>>;
    async fn create_game(&self, new_game: NewGame) -> Result<GameData>;
    /// Sets the status of a game. `ended_at` is stamped when the new status
    /// is finished and cleared otherwise.
    async fn set_game_status(&self, game_id: PrimaryKey, status: GameStatus) -> Result<GameData>;
    /// Counts non-preview games of this host that are waiting or active
    async fn count_active_games(&self, host_id: PrimaryKey) -> Result<i64>;

    async fn create_notification(&self, new_notification: NewNotification)
        -> Result<NotificationData>;
    /// Notifications targeted at this user, plus broadcasts, newest first
    async fn notifications_for_user(&self, user_id: PrimaryKey) -> Result<Vec<NotificationData>>;
}
