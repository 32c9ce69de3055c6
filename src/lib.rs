pub mod access;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use access::{Actor, Identity};
pub use app::{create_app, ApiDoc};
pub use error::{AppError, AppResult};
pub use response::ApiResponse;
pub use state::AppState;
