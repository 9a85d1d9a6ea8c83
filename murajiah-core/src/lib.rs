mod auth;
mod db;
mod events;
mod games;
mod notifications;
mod quizzes;
mod roles;
mod util;

use std::sync::Arc;

use log::debug;

pub use auth::*;
pub use db::*;
pub use events::*;
pub use games::*;
pub use notifications::*;
pub use quizzes::*;
pub use roles::*;

/// The murajiah platform, facilitating live games, the quiz library,
/// authentication, and more.
pub struct Platform<Db> {
    database: Arc<Db>,
    events: EventReceiver,

    pub auth: Auth<Db>,
    pub roles: RolePolicy<Db>,
    pub games: GameManager<Db>,
    pub quizzes: QuizLibrary<Db>,
    pub notifier: Notifier,
}

/// A type passed to various components of the platform, to access state,
/// emit events, and enqueue notifications.
pub struct PlatformContext<Db> {
    pub database: Arc<Db>,
    pub events: EventSender,
    pub notifier: Notifier,
    pub roles: RolePolicy<Db>,
}

impl<Db> Platform<Db>
where
    Db: Database,
{
    pub fn new(database: Db) -> Self {
        let database = Arc::new(database);
        let (event_sender, event_receiver) = crossbeam::channel::unbounded();

        let notifier = Notifier::spawn(&database, event_sender.clone());
        let roles = RolePolicy::new(&database);

        let context = PlatformContext {
            database: database.clone(),
            events: event_sender,
            notifier: notifier.clone(),
            roles: roles.clone(),
        };

        Self {
            auth: Auth::new(&database),
            games: GameManager::new(&context),
            quizzes: QuizLibrary::new(&context),
            roles,
            notifier,
            events: event_receiver,
            database,
        }
    }

    /// Returns a receiver for the platform event stream
    pub fn events(&self) -> EventReceiver {
        self.events.clone()
    }

    pub fn database(&self) -> &Arc<Db> {
        &self.database
    }
}

impl<Db> PlatformContext<Db>
where
    Db: Database,
{
    pub fn emit(&self, event: PlatformEvent) {
        if self.events.send(event).is_err() {
            debug!("Event dropped, nothing is listening");
        }
    }
}

impl<Db> Clone for PlatformContext<Db>
where
    Db: Database,
{
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            events: self.events.clone(),
            notifier: self.notifier.clone(),
            roles: self.roles.clone(),
        }
    }
}
