use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod middleware;
pub mod products;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Every /products route sits behind the bearer-token check;
    // register/login stay open.
    let products = products::routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::require_auth,
    ));

    Router::new()
        .merge(auth::routes())
        .nest("/products", products)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
