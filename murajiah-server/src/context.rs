use std::sync::Arc;

use axum::extract::FromRef;
use murajiah_core::{PgDatabase, Platform};

use crate::sse::ServerSentEvents;

/// The platform as served over HTTP
pub type ServerPlatform = Platform<PgDatabase>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub platform: Arc<ServerPlatform>,
    pub sse: Arc<ServerSentEvents>,
}
