//! Process entry point: parses configuration and serves the router built
//! by the library crate. See `lib.rs` for the actual HTTP surface.

use clap::Parser;
use exchange_service::{build_app, Config};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    let port = config.port;
    let (app, auth_enabled) = build_app(&config).await;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();

    info!("exchange service starting up...");
    if !auth_enabled {
        info!("-----> Warning: running WITHOUT AUTHENTICATION! <-----");
    }
    info!("listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await.unwrap();
}
