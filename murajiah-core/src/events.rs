use crossbeam::channel::{Receiver, Sender};

use crate::{NotificationData, PrimaryKey};

pub type EventSender = Sender<PlatformEvent>;
pub type EventReceiver = Receiver<PlatformEvent>;

/// Events emitted by the platform, fanned out to connected clients so they
/// can refresh game listings and active-game counts without polling.
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    /// A host created a new game
    GameCreated {
        game_id: PrimaryKey,
        quiz_id: PrimaryKey,
        host_id: PrimaryKey,
        /// The join code players enter
        pin: String,
    },
    /// A waiting game started play
    GameStarted { game_id: PrimaryKey },
    /// A game ended and its pin is no longer joinable
    GameEnded { game_id: PrimaryKey },
    /// A notification record was written
    NotificationCreated { notification: NotificationData },
}
