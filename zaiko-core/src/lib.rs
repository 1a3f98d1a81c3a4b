pub mod export;
pub mod product;
pub mod repository;
pub mod service;
pub mod user;

pub use product::{total, Product};
pub use repository::{ProductPage, ProductStore, StoreError, UserStore};
pub use service::ProductService;
pub use user::User;
