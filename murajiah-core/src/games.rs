use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use thiserror::Error;

use crate::{
    util::random_pin, Database, DatabaseError, GameData, GameStatus, NewGame, NewNotification,
    NotificationKind, PlatformContext, PlatformEvent, PrimaryKey,
};

lazy_static! {
    static ref PIN_REGEX: Regex = Regex::new(r"^[0-9]{6}$").expect("pin pattern compiles");
}

/// How many fresh pins creation tries when the generated one collides with a
/// live game
const PIN_ATTEMPTS: usize = 5;

/// Shown in the creation notification when the quiz row cannot be read
const UNKNOWN_QUIZ_TITLE: &str = "a quiz";

pub struct GameManager<Db> {
    context: PlatformContext<Db>,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Only the host can start this game")]
    NotGameHost,
    #[error("This game has already ended")]
    GameEnded,
    #[error("This game is already running")]
    AlreadyStarted,
    #[error("Only the host or a moderator can end this game")]
    EndNotPermitted,
    #[error(transparent)]
    Db(DatabaseError),
}

#[derive(Debug)]
pub struct NewGameRequest {
    pub quiz_id: PrimaryKey,
    /// The host of the new game, the authenticated caller
    pub host_id: PrimaryKey,
    pub is_preview: bool,
}

impl<Db> GameManager<Db>
where
    Db: Database,
{
    pub fn new(context: &PlatformContext<Db>) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Creates a new game in the waiting state with a freshly allocated pin.
    ///
    /// The pin is unique among live games. A collision with a concurrently
    /// created game surfaces as a conflict and is retried with a new pin a
    /// bounded number of times.
    pub async fn create_game(&self, request: NewGameRequest) -> Result<GameData, GameError> {
        let mut attempts = 0;

        let game = loop {
            let new_game = NewGame {
                quiz_id: request.quiz_id,
                host_id: request.host_id,
                pin: random_pin(),
                is_preview: request.is_preview,
            };

            match self.context.database.create_game(new_game).await {
                Ok(game) => break game,
                Err(e @ DatabaseError::Conflict { .. }) => {
                    attempts += 1;

                    if attempts >= PIN_ATTEMPTS {
                        return Err(GameError::Db(e));
                    }
                }
                Err(e) => return Err(GameError::Db(e)),
            }
        };

        info!("Game {} created with pin {}", game.id, game.pin);

        // The notification text tolerates an unreadable quiz row, the game
        // itself does not depend on it
        let quiz_title = self
            .context
            .database
            .quiz_by_id(game.quiz_id)
            .await
            .map(|quiz| quiz.title)
            .unwrap_or_else(|_| UNKNOWN_QUIZ_TITLE.to_string());

        self.context.notifier.enqueue(NewNotification {
            title: "New live game".to_string(),
            message: format!("{} is live, join with PIN {}", quiz_title, game.pin),
            kind: NotificationKind::Info,
            target_user_id: None,
        });

        self.context.emit(PlatformEvent::GameCreated {
            game_id: game.id,
            quiz_id: game.quiz_id,
            host_id: game.host_id,
            pin: game.pin.clone(),
        });

        Ok(game)
    }

    /// Resolves a pin to the game it currently joins. Malformed pins resolve
    /// to not found without touching the database.
    pub async fn game_by_pin(&self, pin: &str) -> Result<GameData, DatabaseError> {
        if !PIN_REGEX.is_match(pin) {
            return Err(DatabaseError::NotFound {
                resource: "game",
                identifier: "pin",
            });
        }

        self.context.database.game_by_pin(pin).await
    }

    pub async fn game_by_id(&self, game_id: PrimaryKey) -> Result<GameData, DatabaseError> {
        self.context.database.game_by_id(game_id).await
    }

    /// Moves a waiting game into play. Only the host may start their game.
    pub async fn start_game(
        &self,
        game_id: PrimaryKey,
        caller: PrimaryKey,
    ) -> Result<GameData, GameError> {
        let game = self
            .context
            .database
            .game_by_id(game_id)
            .await
            .map_err(GameError::Db)?;

        if game.host_id != caller {
            return Err(GameError::NotGameHost);
        }

        match game.status {
            GameStatus::Waiting => {}
            GameStatus::Active => return Err(GameError::AlreadyStarted),
            GameStatus::Finished => return Err(GameError::GameEnded),
        }

        let game = self
            .context
            .database
            .set_game_status(game.id, GameStatus::Active)
            .await
            .map_err(GameError::Db)?;

        info!("Game {} started", game.id);
        self.context.emit(PlatformEvent::GameStarted { game_id: game.id });

        Ok(game)
    }

    /// Ends a game, releasing its pin. The caller must be the host or hold
    /// moderation rights. Ending an already finished game is accepted and
    /// leaves it finished, with `ended_at` stamped again.
    pub async fn end_game(
        &self,
        game_id: PrimaryKey,
        caller: PrimaryKey,
    ) -> Result<GameData, GameError> {
        let game = self
            .context
            .database
            .game_by_id(game_id)
            .await
            .map_err(GameError::Db)?;

        if game.host_id != caller && !self.context.roles.has_moderation_rights(caller).await {
            return Err(GameError::EndNotPermitted);
        }

        let game = self
            .context
            .database
            .set_game_status(game.id, GameStatus::Finished)
            .await
            .map_err(GameError::Db)?;

        info!("Game {} ended", game.id);
        self.context.emit(PlatformEvent::GameEnded { game_id: game.id });

        Ok(game)
    }

    /// Counts this host's non-preview games that are waiting or active
    pub async fn count_active_games(&self, host_id: PrimaryKey) -> Result<i64, DatabaseError> {
        self.context.database.count_active_games(host_id).await
    }

    pub async fn games_by_host(&self, host_id: PrimaryKey) -> Result<Vec<GameData>, DatabaseError> {
        self.context.database.games_by_host(host_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::{NewQuiz, NewUser, Notifier, RolePolicy, Role};
    use std::sync::Arc;

    struct Fixture {
        db: Arc<MemoryDatabase>,
        games: GameManager<MemoryDatabase>,
        host: PrimaryKey,
        quiz: PrimaryKey,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(MemoryDatabase::default());
        let (sender, _receiver) = crossbeam::channel::unbounded();

        let context = PlatformContext {
            database: db.clone(),
            events: sender.clone(),
            notifier: Notifier::spawn(&db, sender),
            roles: RolePolicy::new(&db),
        };

        let host = user(&db, "host", Role::User).await;
        let quiz = db
            .create_quiz(NewQuiz {
                title: "Tajweed basics".to_string(),
                description: None,
                owner_id: host,
            })
            .await
            .expect("creates quiz")
            .id;

        Fixture {
            games: GameManager::new(&context),
            db,
            host,
            quiz,
        }
    }

    async fn user(db: &Arc<MemoryDatabase>, username: &str, role: Role) -> PrimaryKey {
        db.create_user(NewUser {
            username: username.to_string(),
            password: "hash".to_string(),
            display_name: username.to_string(),
            role,
        })
        .await
        .expect("creates user")
        .id
    }

    fn request(f: &Fixture) -> NewGameRequest {
        NewGameRequest {
            quiz_id: f.quiz,
            host_id: f.host,
            is_preview: false,
        }
    }

    #[tokio::test]
    async fn test_created_games_wait_with_a_six_digit_pin() {
        let f = fixture().await;
        let game = f.games.create_game(request(&f)).await.expect("creates");

        assert_eq!(game.quiz_id, f.quiz);
        assert_eq!(game.host_id, f.host);
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.ended_at, None);
        assert_eq!(game.pin.len(), 6);
        assert!(game.pin.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_pin_resolution_skips_finished_games() {
        let f = fixture().await;
        let game = f.games.create_game(request(&f)).await.expect("creates");

        let resolved = f.games.game_by_pin(&game.pin).await.expect("resolves");
        assert_eq!(resolved.id, game.id);

        f.games.end_game(game.id, f.host).await.expect("ends");

        assert!(
            f.games.game_by_pin(&game.pin).await.is_err(),
            "a finished game should not be joinable"
        );
    }

    #[tokio::test]
    async fn test_malformed_pins_resolve_to_not_found() {
        let f = fixture().await;

        for pin in ["12345", "1234567", "12a456", "", "½23456"] {
            assert!(
                f.games.game_by_pin(pin).await.is_err(),
                "pin {pin:?} should not resolve"
            );
        }
    }

    #[tokio::test]
    async fn test_live_pins_are_unique() {
        let f = fixture().await;
        let game = f.games.create_game(request(&f)).await.expect("creates");

        let taken = f
            .db
            .create_game(NewGame {
                quiz_id: f.quiz,
                host_id: f.host,
                pin: game.pin.clone(),
                is_preview: false,
            })
            .await;

        assert!(
            matches!(taken, Err(DatabaseError::Conflict { .. })),
            "a live pin cannot be reused"
        );

        f.games.end_game(game.id, f.host).await.expect("ends");

        f.db.create_game(NewGame {
            quiz_id: f.quiz,
            host_id: f.host,
            pin: game.pin.clone(),
            is_preview: false,
        })
        .await
        .expect("a finished game frees its pin");
    }

    #[tokio::test]
    async fn test_only_the_host_starts_a_game() {
        let f = fixture().await;
        let other = user(&f.db, "other", Role::User).await;

        let game = f.games.create_game(request(&f)).await.expect("creates");

        let result = f.games.start_game(game.id, other).await;
        assert!(matches!(result, Err(GameError::NotGameHost)));

        let game = f.games.start_game(game.id, f.host).await.expect("starts");
        assert_eq!(game.status, GameStatus::Active);

        let result = f.games.start_game(game.id, f.host).await;
        assert!(matches!(result, Err(GameError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_finished_is_terminal() {
        let f = fixture().await;
        let game = f.games.create_game(request(&f)).await.expect("creates");

        f.games.end_game(game.id, f.host).await.expect("ends");

        let result = f.games.start_game(game.id, f.host).await;
        assert!(matches!(result, Err(GameError::GameEnded)));
    }

    #[tokio::test]
    async fn test_ending_twice_is_accepted() {
        let f = fixture().await;
        let game = f.games.create_game(request(&f)).await.expect("creates");

        let first = f.games.end_game(game.id, f.host).await.expect("ends");
        assert_eq!(first.status, GameStatus::Finished);
        assert!(first.ended_at.is_some());

        let second = f.games.end_game(game.id, f.host).await.expect("ends again");
        assert_eq!(second.status, GameStatus::Finished);
        assert!(second.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_ending_requires_host_or_moderator() {
        let f = fixture().await;
        let stranger = user(&f.db, "stranger", Role::User).await;
        let moderator = user(&f.db, "moderator", Role::Moderator).await;

        let game = f.games.create_game(request(&f)).await.expect("creates");

        let result = f.games.end_game(game.id, stranger).await;
        assert!(matches!(result, Err(GameError::EndNotPermitted)));

        let game = f
            .games
            .end_game(game.id, moderator)
            .await
            .expect("a moderator may end any game");
        assert_eq!(game.status, GameStatus::Finished);
    }

    #[tokio::test]
    async fn test_active_count_skips_previews_and_finished_games() {
        let f = fixture().await;

        let counted = f.games.create_game(request(&f)).await.expect("creates");
        f.games
            .create_game(NewGameRequest {
                quiz_id: f.quiz,
                host_id: f.host,
                is_preview: true,
            })
            .await
            .expect("creates preview");
        let ended = f.games.create_game(request(&f)).await.expect("creates");

        f.games.start_game(counted.id, f.host).await.expect("starts");
        f.games.end_game(ended.id, f.host).await.expect("ends");

        let count = f.games.count_active_games(f.host).await.expect("counts");
        assert_eq!(count, 1, "only the live non-preview game counts");
    }
}
