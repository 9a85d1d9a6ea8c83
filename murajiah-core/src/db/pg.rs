use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, Error as SqlxError, FromRow, PgPool};

use crate::{
    Database, DatabaseError, DatabaseResult, GameData, GameStatus, IntoDatabaseError, NewGame,
    NewNotification, NewQuiz, NewSession, NewUser, NotificationData, NotificationKind, PrimaryKey,
    QuizData, Result, Role, SessionData, UpdatedQuiz, UpdatedUser, UserData,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// A postgres database implementation for murajiah
pub struct PgDatabase {
    pool: PgPool,
}

#[derive(FromRow)]
struct UserRow {
    id: PrimaryKey,
    username: String,
    password: String,
    display_name: String,
    role: Option<String>,
}

#[derive(FromRow)]
struct SessionRow {
    id: PrimaryKey,
    token: String,
    user_id: PrimaryKey,
    expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct QuizRow {
    id: PrimaryKey,
    title: String,
    description: Option<String>,
    owner_id: PrimaryKey,
}

#[derive(FromRow)]
struct GameRow {
    id: PrimaryKey,
    quiz_id: PrimaryKey,
    host_id: PrimaryKey,
    pin: String,
    status: String,
    is_preview: bool,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct NotificationRow {
    id: PrimaryKey,
    title: String,
    message: String,
    kind: String,
    target_user_id: Option<PrimaryKey>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_data(self) -> UserData {
        UserData {
            id: self.id,
            username: self.username,
            password: self.password,
            display_name: self.display_name,
            role: self.role.as_deref().map(Role::parse).unwrap_or_default(),
        }
    }
}

impl QuizRow {
    fn into_data(self) -> QuizData {
        QuizData {
            id: self.id,
            title: self.title,
            description: self.description,
            owner_id: self.owner_id,
        }
    }
}

impl GameRow {
    fn into_data(self) -> GameData {
        GameData {
            id: self.id,
            quiz_id: self.quiz_id,
            host_id: self.host_id,
            pin: self.pin,
            status: GameStatus::parse(&self.status),
            is_preview: self.is_preview,
            created_at: self.created_at,
            ended_at: self.ended_at,
        }
    }
}

impl NotificationRow {
    fn into_data(self) -> NotificationData {
        NotificationData {
            id: self.id,
            title: self.title,
            message: self.message,
            kind: NotificationKind::parse(&self.kind),
            target_user_id: self.target_user_id,
            created_at: self.created_at,
        }
    }
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn check_for_owner(&self) -> Result<bool> {
        let result = sqlx::query("SELECT id FROM users WHERE role = 'owner'")
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => match e {
                SqlxError::RowNotFound => Ok(false),
                e => Err(e.any()),
            },
        }
    }

    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))
            .map(UserRow::into_data)
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "username"))
            .map(UserRow::into_data)
    }

    async fn list_users(&self) -> Result<Vec<UserData>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(rows.into_iter().map(UserRow::into_data).collect())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_username(&new_user.username)
            .await
            .conflict_or_ok("user", "username", &new_user.username)?;

        sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, password, display_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(&new_user.display_name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
        .map(UserRow::into_data)
    }

    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData> {
        let user = self.user_by_id(updated_user.id).await?;

        sqlx::query("UPDATE users SET display_name = $1 WHERE id = $2")
            .bind(updated_user.display_name.unwrap_or(user.display_name))
            .bind(updated_user.id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.user_by_id(updated_user.id).await
    }

    async fn set_user_role(&self, user_id: PrimaryKey, role: Role) -> Result<UserData> {
        // Ensure user exists
        let _ = self.user_by_id(user_id).await?;

        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.user_by_id(user_id).await
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        // Ensure user exists
        let _ = self.user_by_id(user_id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("session", "token"))?;

        let user = self.user_by_id(row.user_id).await?;

        Ok(SessionData {
            id: row.id,
            token: row.token,
            expires_at: row.expires_at,
            user,
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let row = sqlx::query_as::<_, SessionRow>(
            "INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *",
        )
        .bind(&new_session.token)
        .bind(new_session.user_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.session_by_token(&row.token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE timezone('UTC', now()) > expires_at")
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn quiz_by_id(&self, quiz_id: PrimaryKey) -> Result<QuizData> {
        sqlx::query_as::<_, QuizRow>("SELECT * FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("quiz", "id"))
            .map(QuizRow::into_data)
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizData>> {
        let rows = sqlx::query_as::<_, QuizRow>("SELECT * FROM quizzes ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(rows.into_iter().map(QuizRow::into_data).collect())
    }

    async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<QuizData> {
        // Ensure the owner exists
        let owner = self.user_by_id(new_quiz.owner_id).await?;

        sqlx::query_as::<_, QuizRow>(
            "INSERT INTO quizzes (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING *",
        )
        .bind(&new_quiz.title)
        .bind(&new_quiz.description)
        .bind(owner.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
        .map(QuizRow::into_data)
    }

    async fn update_quiz(&self, updated_quiz: UpdatedQuiz) -> Result<QuizData> {
        let quiz = self.quiz_by_id(updated_quiz.id).await?;

        sqlx::query(
            "UPDATE quizzes SET
                title = $1,
                description = $2
            WHERE id = $3",
        )
        .bind(updated_quiz.title.unwrap_or(quiz.title))
        .bind(updated_quiz.description.or(quiz.description))
        .bind(updated_quiz.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.quiz_by_id(updated_quiz.id).await
    }

    async fn delete_quiz(&self, quiz_id: PrimaryKey) -> Result<()> {
        // Ensure quiz exists
        let _ = self.quiz_by_id(quiz_id).await?;

        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData> {
        sqlx::query_as::<_, GameRow>("SELECT * FROM games WHERE id = $1")
            .bind(game_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("game", "id"))
            .map(GameRow::into_data)
    }

    async fn game_by_pin(&self, pin: &str) -> Result<GameData> {
        sqlx::query_as::<_, GameRow>(
            "SELECT * FROM games
            WHERE pin = $1 AND status <> 'finished'
            ORDER BY created_at DESC
            LIMIT 1",
        )
        .bind(pin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("game", "pin"))
        .map(GameRow::into_data)
    }

    async fn games_by_host(&self, host_id: PrimaryKey) -> Result<Vec<GameData>> {
        let rows = sqlx::query_as::<_, GameRow>(
            "SELECT * FROM games WHERE host_id = $1 ORDER BY created_at DESC",
        )
        .bind(host_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(rows.into_iter().map(GameRow::into_data).collect())
    }

    async fn create_game(&self, new_game: NewGame) -> Result<GameData> {
        self.game_by_pin(&new_game.pin)
            .await
            .conflict_or_ok("game", "pin", &new_game.pin)?;

        // The partial unique index on live pins backstops the check above, so
        // a racing insert surfaces as a conflict the caller can retry.
        sqlx::query_as::<_, GameRow>(
            "INSERT INTO games (quiz_id, host_id, pin, status, is_preview)
            VALUES ($1, $2, $3, 'waiting', $4)
            RETURNING *",
        )
        .bind(new_game.quiz_id)
        .bind(new_game.host_id)
        .bind(&new_game.pin)
        .bind(new_game.is_preview)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            SqlxError::Database(db) if db.is_unique_violation() => DatabaseError::Conflict {
                resource: "game",
                field: "pin",
                value: new_game.pin.clone(),
            },
            _ => e.any(),
        })
        .map(GameRow::into_data)
    }

    async fn set_game_status(&self, game_id: PrimaryKey, status: GameStatus) -> Result<GameData> {
        // Ensure game exists
        let _ = self.game_by_id(game_id).await?;

        sqlx::query(
            "UPDATE games SET
                status = $1,
                ended_at = CASE WHEN $1 = 'finished' THEN timezone('UTC', now()) ELSE NULL END
            WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(game_id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.game_by_id(game_id).await
    }

    async fn count_active_games(&self, host_id: PrimaryKey) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM games
            WHERE host_id = $1
                AND status IN ('waiting', 'active')
                AND is_preview = false",
        )
        .bind(host_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData> {
        sqlx::query_as::<_, NotificationRow>(
            "INSERT INTO notifications (title, message, kind, target_user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *",
        )
        .bind(&new_notification.title)
        .bind(&new_notification.message)
        .bind(new_notification.kind.as_str())
        .bind(new_notification.target_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
        .map(NotificationRow::into_data)
    }

    async fn notifications_for_user(&self, user_id: PrimaryKey) -> Result<Vec<NotificationData>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications
            WHERE target_user_id = $1 OR target_user_id IS NULL
            ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(rows.into_iter().map(NotificationRow::into_data).collect())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}
