//! All schemas that are exposed from endpoints are defined here
//! along with the conversion impls

use chrono::{DateTime, Utc};
use murajiah_core::{
    GameData, GameStatus as CoreGameStatus, NotificationData, NotificationKind as CoreKind,
    QuizData, Role as CoreRole, SessionData, UserData,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Moderator,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    id: i32,
    username: String,
    display_name: String,
    role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Quiz {
    id: i32,
    title: String,
    description: Option<String>,
    owner_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Game {
    id: i32,
    quiz_id: i32,
    host_id: i32,
    pin: String,
    status: GameStatus,
    is_preview: bool,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameJoin {
    pub(crate) game_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveGameCount {
    pub(crate) count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notification {
    id: i32,
    title: String,
    message: String,
    kind: NotificationKind,
    target_user_id: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<CoreRole> for Role {
    fn from(value: CoreRole) -> Self {
        match value {
            CoreRole::Owner => Self::Owner,
            CoreRole::Admin => Self::Admin,
            CoreRole::Moderator => Self::Moderator,
            CoreRole::User => Self::User,
        }
    }
}

impl From<Role> for CoreRole {
    fn from(value: Role) -> Self {
        match value {
            Role::Owner => Self::Owner,
            Role::Admin => Self::Admin,
            Role::Moderator => Self::Moderator,
            Role::User => Self::User,
        }
    }
}

impl From<CoreGameStatus> for GameStatus {
    fn from(value: CoreGameStatus) -> Self {
        match value {
            CoreGameStatus::Waiting => Self::Waiting,
            CoreGameStatus::Active => Self::Active,
            CoreGameStatus::Finished => Self::Finished,
        }
    }
}

impl From<CoreKind> for NotificationKind {
    fn from(value: CoreKind) -> Self {
        match value {
            CoreKind::Info => Self::Info,
            CoreKind::Warning => Self::Warning,
            CoreKind::Success => Self::Success,
        }
    }
}

impl From<NotificationKind> for CoreKind {
    fn from(value: NotificationKind) -> Self {
        match value {
            NotificationKind::Info => Self::Info,
            NotificationKind::Warning => Self::Warning,
            NotificationKind::Success => Self::Success,
        }
    }
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role.into(),
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Quiz> for QuizData {
    fn to_serialized(&self) -> Quiz {
        Quiz {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            owner_id: self.owner_id,
        }
    }
}

impl ToSerialized<Game> for GameData {
    fn to_serialized(&self) -> Game {
        Game {
            id: self.id,
            quiz_id: self.quiz_id,
            host_id: self.host_id,
            pin: self.pin.clone(),
            status: self.status.into(),
            is_preview: self.is_preview,
            created_at: self.created_at,
            ended_at: self.ended_at,
        }
    }
}

impl ToSerialized<Notification> for NotificationData {
    fn to_serialized(&self) -> Notification {
        Notification {
            id: self.id,
            title: self.title.clone(),
            message: self.message.clone(),
            kind: self.kind.into(),
            target_user_id: self.target_user_id,
            created_at: self.created_at,
        }
    }
}
