use server::config::ServerConfig;
use server::matchmaking::MatchmakingQueue;
use server::recorder::NullRecorder;
use server::registry::RoomRegistry;
use server::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let config = Arc::new(ServerConfig::from_env());
    let recorder = Arc::new(NullRecorder);
    let registry = RoomRegistry::new(config.clone(), recorder);
    let matchmaking = Arc::new(MatchmakingQueue::new(registry.clone()));
    let app_state = AppState { registry, matchmaking };
    let app = server::router(app_state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|err| panic!("failed to bind {bind_addr}: {err}"));

    tracing::info!(addr = %bind_addr, "Flip Seven server listening.");
    axum::serve(listener, app).await.unwrap();
}
