use std::net::SocketAddr;

use blogapi::{make_router, run_app};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogapi=info".into()),
        )
        .init();

    let addr = std::env::var("BIND_ADDR")
        .ok()
        .and_then(|addr| addr.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3001)));
    let router = make_router();
    tracing::info!("server started on {}", addr);
    if let Err(error) = run_app(router, addr).await {
        tracing::error!("server exited: {}", error);
    }
}
