use crate::config::forum::HierarchyLayout;
use crate::utils::{CookieSettings, CredentialStore, TokenCodec};
use sea_orm::DatabaseConnection;

/// Everything a request handler depends on, built once at startup and shared
/// through an axum `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub credentials: CredentialStore,
    pub tokens: TokenCodec,
    pub cookies: CookieSettings,
    pub layout: HierarchyLayout,
}
