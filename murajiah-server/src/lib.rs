mod admin;
mod auth;
mod context;
mod docs;
mod errors;
mod games;
mod notifications;
mod quizzes;
mod schemas;
mod serialized;
mod sse;

pub mod config;
pub mod logging;

use axum::routing::get;
use log::info;
use std::{
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use config::{Config, ConfigError};
pub use context::{ServerContext, ServerPlatform};

use sse::ServerSentEvents;

pub type Router = axum::Router<ServerContext>;

/// Starts the murajiah server
pub async fn run_server(config: Config, platform: ServerPlatform) {
    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, config.port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let platform = Arc::new(platform);
    let sse = ServerSentEvents::new();

    // Bridge the platform event stream onto connected clients
    let events = platform.events();
    let event_fanout = sse.clone();
    tokio::task::spawn_blocking(move || {
        while let Ok(event) = events.recv() {
            event_fanout.broadcast(event.into())
        }
    });

    let context = ServerContext { platform, sse };

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/quizzes", quizzes::router())
        .nest("/games", games::router())
        .nest("/admin", admin::router())
        .nest("/notifications", notifications::router())
        .nest("/events", sse::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::serve_api))
        .with_state(context)
        .layer(cors);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    info!("Listening on port {}", config.port);

    axum::serve(listener, root_router.into_make_service())
        .await
        .expect("server runs");
}
