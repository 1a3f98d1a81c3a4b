use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zaiko_api::{app, state::{AppState, AuthConfig}};
use zaiko_core::ProductService;
use zaiko_store::{DbClient, PgProductStore, PgUserStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zaiko_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = zaiko_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Zaiko API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let products = Arc::new(ProductService::new(Arc::new(PgProductStore::new(
        db.pool.clone(),
    ))));
    let users = Arc::new(PgUserStore::new(db.pool.clone()));

    let app_state = AppState {
        products,
        users,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
