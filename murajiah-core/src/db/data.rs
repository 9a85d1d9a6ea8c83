use chrono::{DateTime, Utc};

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// Privilege tier of an account, stored as text in the `role` column.
///
/// Anything that is not a known elevated role resolves to [Role::User],
/// including a missing or null column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Owner,
    Admin,
    Moderator,
    #[default]
    User,
}

impl Role {
    /// Returns the role matching `name` exactly, if there is one
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "moderator" => Some(Self::Moderator),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Parses a stored role value, degrading unknown values to [Role::User]
    pub fn parse(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::User => "user",
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    pub fn has_moderation_rights(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Moderator)
    }
}

/// Lifecycle state of a live game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Waiting,
    Active,
    Finished,
}

impl GameStatus {
    /// Parses a stored status value. Rows with an unrecognized status are
    /// treated as ended so they can never be joined.
    pub fn parse(value: &str) -> Self {
        match value {
            "waiting" => Self::Waiting,
            "active" => Self::Active,
            _ => Self::Finished,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
}

impl NotificationKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "warning" => Self::Warning,
            "success" => Self::Success,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
        }
    }
}

/// A murajiah account
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: PrimaryKey,
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

/// Login session data for authentication
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    /// The session token, or key if you will
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The user that is logged in
    pub user: UserData,
}

/// A quiz in the library
#[derive(Debug, Clone)]
pub struct QuizData {
    pub id: PrimaryKey,
    pub title: String,
    pub description: Option<String>,
    /// The user that created and owns the quiz
    pub owner_id: PrimaryKey,
}

/// One live instance of a quiz being hosted, joinable via PIN
#[derive(Debug, Clone)]
pub struct GameData {
    pub id: PrimaryKey,
    pub quiz_id: PrimaryKey,
    /// The user that created and controls the game
    pub host_id: PrimaryKey,
    /// 6-digit join code, assigned once at creation
    pub pin: String,
    pub status: GameStatus,
    /// Preview games are excluded from active counts and listings
    pub is_preview: bool,
    pub created_at: DateTime<Utc>,
    /// Set if and only if the game is finished
    pub ended_at: Option<DateTime<Utc>>,
}

/// A delivered notification record
#[derive(Debug, Clone)]
pub struct NotificationData {
    pub id: PrimaryKey,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    /// When absent, the notification is a broadcast
    pub target_user_id: Option<PrimaryKey>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug)]
pub struct UpdatedUser {
    pub id: PrimaryKey,
    pub display_name: Option<String>,
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub user_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    /// The owner of the new quiz
    pub owner_id: PrimaryKey,
}

#[derive(Debug)]
pub struct UpdatedQuiz {
    pub id: PrimaryKey,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct NewGame {
    pub quiz_id: PrimaryKey,
    /// The host of the new game
    pub host_id: PrimaryKey,
    pub pin: String,
    pub is_preview: bool,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub target_user_id: Option<PrimaryKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_degrades_to_user() {
        assert_eq!(Role::parse("owner"), Role::Owner);
        assert_eq!(Role::parse("moderator"), Role::Moderator);
        assert_eq!(Role::parse("superuser"), Role::User, "unknown roles resolve to user");
        assert_eq!(Role::parse(""), Role::User, "empty role resolves to user");
        assert_eq!(Role::from_name("superuser"), None);
    }

    #[test]
    fn test_role_predicates() {
        assert!(Role::Owner.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Moderator.is_admin());
        assert!(Role::Owner.is_owner());
        assert!(!Role::Admin.is_owner());
        assert!(Role::Moderator.has_moderation_rights());
        assert!(!Role::User.has_moderation_rights());
    }

    #[test]
    fn test_unknown_status_counts_as_finished() {
        assert_eq!(GameStatus::parse("waiting"), GameStatus::Waiting);
        assert_eq!(GameStatus::parse("paused"), GameStatus::Finished);
    }
}
