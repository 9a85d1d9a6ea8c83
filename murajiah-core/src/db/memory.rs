//! An in-memory [Database] used by the unit tests.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::{
    Database, DatabaseError, GameData, GameStatus, NewGame, NewNotification, NewQuiz, NewSession,
    NewUser, NotificationData, PrimaryKey, QuizData, Result, Role, SessionData, UpdatedQuiz,
    UpdatedUser, UserData,
};

#[derive(Debug, Clone)]
struct StoredSession {
    id: PrimaryKey,
    token: String,
    user_id: PrimaryKey,
    expires_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: Vec<UserData>,
    sessions: Vec<StoredSession>,
    quizzes: Vec<QuizData>,
    games: Vec<GameData>,
    notifications: Vec<NotificationData>,
    next_id: PrimaryKey,
}

#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

impl State {
    fn next_id(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn check_for_owner(&self) -> Result<bool> {
        let state = self.state.lock();
        Ok(state.users.iter().any(|u| u.role == Role::Owner))
    }

    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        let state = self.state.lock();

        state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        let state = self.state.lock();

        state
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "username",
            })
    }

    async fn list_users(&self) -> Result<Vec<UserData>> {
        Ok(self.state.lock().users.clone())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut state = self.state.lock();

        if state.users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field: "username",
                value: new_user.username,
            });
        }

        let user = UserData {
            id: state.next_id(),
            username: new_user.username,
            password: new_user.password,
            display_name: new_user.display_name,
            role: new_user.role,
        };

        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData> {
        let mut state = self.state.lock();

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == updated_user.id)
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        if let Some(display_name) = updated_user.display_name {
            user.display_name = display_name;
        }

        Ok(user.clone())
    }

    async fn set_user_role(&self, user_id: PrimaryKey, role: Role) -> Result<UserData> {
        let mut state = self.state.lock();

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        user.role = role;
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            });
        }

        state.users.retain(|u| u.id != user_id);
        Ok(())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let state = self.state.lock();

        let session = state
            .sessions
            .iter()
            .find(|s| s.token == token)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            })?;

        let user = state
            .users
            .iter()
            .find(|u| u.id == session.user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        Ok(SessionData {
            id: session.id,
            token: session.token,
            expires_at: session.expires_at,
            user,
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        let mut state = self.state.lock();

        if state.sessions.iter().any(|s| s.token == new_session.token) {
            return Err(DatabaseError::Conflict {
                resource: "session",
                field: "token",
                value: new_session.token,
            });
        }

        let user = state
            .users
            .iter()
            .find(|u| u.id == new_session.user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        let session = StoredSession {
            id: state.next_id(),
            token: new_session.token,
            user_id: new_session.user_id,
            expires_at: new_session.expires_at,
        };

        let data = SessionData {
            id: session.id,
            token: session.token.clone(),
            expires_at: session.expires_at,
            user,
        };

        state.sessions.push(session);
        Ok(data)
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        let mut state = self.state.lock();

        if !state.sessions.iter().any(|s| s.token == token) {
            return Err(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            });
        }

        state.sessions.retain(|s| s.token != token);
        Ok(())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        let now = Utc::now();
        self.state.lock().sessions.retain(|s| s.expires_at > now);
        Ok(())
    }

    async fn quiz_by_id(&self, quiz_id: PrimaryKey) -> Result<QuizData> {
        let state = self.state.lock();

        state
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "quiz",
                identifier: "id",
            })
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizData>> {
        Ok(self.state.lock().quizzes.clone())
    }

    async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<QuizData> {
        let mut state = self.state.lock();

        if !state.users.iter().any(|u| u.id == new_quiz.owner_id) {
            return Err(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            });
        }

        let quiz = QuizData {
            id: state.next_id(),
            title: new_quiz.title,
            description: new_quiz.description,
            owner_id: new_quiz.owner_id,
        };

        state.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn update_quiz(&self, updated_quiz: UpdatedQuiz) -> Result<QuizData> {
        let mut state = self.state.lock();

        let quiz = state
            .quizzes
            .iter_mut()
            .find(|q| q.id == updated_quiz.id)
            .ok_or(DatabaseError::NotFound {
                resource: "quiz",
                identifier: "id",
            })?;

        if let Some(title) = updated_quiz.title {
            quiz.title = title;
        }

        if let Some(description) = updated_quiz.description {
            quiz.description = Some(description);
        }

        Ok(quiz.clone())
    }

    async fn delete_quiz(&self, quiz_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.quizzes.iter().any(|q| q.id == quiz_id) {
            return Err(DatabaseError::NotFound {
                resource: "quiz",
                identifier: "id",
            });
        }

        state.quizzes.retain(|q| q.id != quiz_id);
        Ok(())
    }

    async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData> {
        let state = self.state.lock();

        state
            .games
            .iter()
            .find(|g| g.id == game_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "game",
                identifier: "id",
            })
    }

    async fn game_by_pin(&self, pin: &str) -> Result<GameData> {
        let state = self.state.lock();

        state
            .games
            .iter()
            .filter(|g| g.pin == pin && !g.status.is_finished())
            .max_by_key(|g| g.created_at)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "game",
                identifier: "pin",
            })
    }

    async fn games_by_host(&self, host_id: PrimaryKey) -> Result<Vec<GameData>> {
        let state = self.state.lock();

        let mut games: Vec<_> = state
            .games
            .iter()
            .filter(|g| g.host_id == host_id)
            .cloned()
            .collect();

        games.sort_by_key(|g| std::cmp::Reverse(g.created_at));
        Ok(games)
    }

    async fn create_game(&self, new_game: NewGame) -> Result<GameData> {
        let mut state = self.state.lock();

        let live_pin_taken = state
            .games
            .iter()
            .any(|g| g.pin == new_game.pin && !g.status.is_finished());

        if live_pin_taken {
            return Err(DatabaseError::Conflict {
                resource: "game",
                field: "pin",
                value: new_game.pin,
            });
        }

        let game = GameData {
            id: state.next_id(),
            quiz_id: new_game.quiz_id,
            host_id: new_game.host_id,
            pin: new_game.pin,
            status: GameStatus::Waiting,
            is_preview: new_game.is_preview,
            created_at: Utc::now(),
            ended_at: None,
        };

        state.games.push(game.clone());
        Ok(game)
    }

    async fn set_game_status(&self, game_id: PrimaryKey, status: GameStatus) -> Result<GameData> {
        let mut state = self.state.lock();

        let game = state
            .games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or(DatabaseError::NotFound {
                resource: "game",
                identifier: "id",
            })?;

        game.status = status;
        game.ended_at = status.is_finished().then(Utc::now);

        Ok(game.clone())
    }

    async fn count_active_games(&self, host_id: PrimaryKey) -> Result<i64> {
        let state = self.state.lock();

        let count = state
            .games
            .iter()
            .filter(|g| g.host_id == host_id && !g.status.is_finished() && !g.is_preview)
            .count();

        Ok(count as i64)
    }

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData> {
        let mut state = self.state.lock();

        let notification = NotificationData {
            id: state.next_id(),
            title: new_notification.title,
            message: new_notification.message,
            kind: new_notification.kind,
            target_user_id: new_notification.target_user_id,
            created_at: Utc::now(),
        };

        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn notifications_for_user(&self, user_id: PrimaryKey) -> Result<Vec<NotificationData>> {
        let state = self.state.lock();

        let mut notifications: Vec<_> = state
            .notifications
            .iter()
            .filter(|n| n.target_user_id.is_none() || n.target_user_id == Some(user_id))
            .cloned()
            .collect();

        notifications.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        Ok(notifications)
    }
}
