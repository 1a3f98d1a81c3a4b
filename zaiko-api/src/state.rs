use std::sync::Arc;

use zaiko_core::{ProductService, UserStore};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService>,
    pub users: Arc<dyn UserStore>,
    pub auth: AuthConfig,
}
