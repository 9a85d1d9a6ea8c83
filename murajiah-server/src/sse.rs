use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    routing::get,
};
use futures_util::Stream;
use murajiah_core::PlatformEvent;
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    convert::Infallible,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    task::{Context, Poll, Waker},
};
use utoipa::ToSchema;

use crate::{
    context::ServerContext,
    serialized::{Notification, ToSerialized},
    Router,
};

type ConnectionId = u64;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(0);

/// Events pushed to connected clients. Game events let clients refresh
/// listings and recompute active-game counts without polling.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum ServerEvent {
    /// A host created a new game
    GameCreated {
        game_id: i32,
        quiz_id: i32,
        host_id: i32,
        /// The join code players enter
        pin: String,
    },
    /// A waiting game started play
    GameStarted { game_id: i32 },
    /// A game ended and its pin is no longer joinable
    GameEnded { game_id: i32 },
    /// A notification record was written
    NotificationCreated { notification: Notification },
}

impl From<PlatformEvent> for ServerEvent {
    fn from(value: PlatformEvent) -> Self {
        match value {
            PlatformEvent::GameCreated {
                game_id,
                quiz_id,
                host_id,
                pin,
            } => Self::GameCreated {
                game_id,
                quiz_id,
                host_id,
                pin,
            },
            PlatformEvent::GameStarted { game_id } => Self::GameStarted { game_id },
            PlatformEvent::GameEnded { game_id } => Self::GameEnded { game_id },
            PlatformEvent::NotificationCreated { notification } => Self::NotificationCreated {
                notification: notification.to_serialized(),
            },
        }
    }
}

/// Manages server sent event connections
pub struct ServerSentEvents {
    me: Weak<Self>,
    connections: Mutex<Vec<Connection>>,
}

struct Connection {
    id: ConnectionId,
    pending_messages: Arc<Mutex<Vec<ServerEvent>>>,
    waker: Arc<Mutex<Option<Waker>>>,
}

pub struct ConnectionHandle {
    id: ConnectionId,
    /// A reference to [Connection]'s pending messages
    pending_messages: Arc<Mutex<Vec<ServerEvent>>>,
    /// A reference to [Connection]'s stored [Waker]
    waker: Arc<Mutex<Option<Waker>>>,
    /// Required to remove connection when dropped
    manager: Weak<ServerSentEvents>,
}

impl ServerSentEvents {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            connections: Default::default(),
        })
    }

    pub fn broadcast(&self, event: ServerEvent) {
        let connections = self.connections.lock();

        for connection in connections.iter() {
            connection.send(event.clone())
        }
    }

    fn connect(&self) -> ConnectionHandle {
        let connection = Connection::new();
        let handle = connection.handle(self.me.clone());

        self.connections.lock().push(connection);
        handle
    }

    fn disconnect(&self, id: ConnectionId) {
        self.connections.lock().retain(|c| c.id != id)
    }
}

impl Connection {
    fn new() -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            pending_messages: Default::default(),
            waker: Default::default(),
        }
    }

    fn send(&self, message: ServerEvent) {
        self.pending_messages.lock().push(message);

        if let Some(waker) = self.waker.lock().take() {
            waker.wake()
        }
    }

    fn handle(&self, manager: Weak<ServerSentEvents>) -> ConnectionHandle {
        ConnectionHandle {
            id: self.id,
            pending_messages: self.pending_messages.clone(),
            waker: self.waker.clone(),
            manager,
        }
    }
}

impl Stream for ConnectionHandle {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut pending_messages = self.pending_messages.lock();

        let next_event = pending_messages
            .pop()
            .map(|m| serde_json::to_string(&m).expect("serializes properly"));

        if let Some(event) = next_event {
            return Poll::Ready(Some(Ok(Event::default().data(event))));
        }

        *self.waker.lock() = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.disconnect(self.id)
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/events",
    tag = "events",
    responses(
        (
            status = 200,
            content_type = "text/event-stream",
            description = "A stream of events from murajiah",
            body = ServerEvent
        )
    )
)]
pub(crate) async fn event_stream(State(context): State<ServerContext>) -> Sse<ConnectionHandle> {
    Sse::new(context.sse.connect()).keep_alive(KeepAlive::default())
}

pub fn router() -> Router {
    Router::new().route("/", get(event_stream))
}
