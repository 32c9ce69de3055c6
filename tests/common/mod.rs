#![allow(dead_code)]

use agora::config::{forum::HierarchyLayout, session::SessionConfig};
use agora::middleware::SecurityHeaders;
use agora::utils::{CookieSettings, CredentialStore, TokenCodec};
use agora::AppState;
use reqwest::{redirect::Policy, Client};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use std::net::SocketAddr;

pub const PASSWORD: &str = "password_123";

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub state: AppState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

/// A fresh in-memory database with the schema applied.
pub async fn test_db() -> DatabaseConnection {
    // One connection: every pooled connection to `:memory:` would be its own database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    agora::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn test_state(db: DatabaseConnection, layout: HierarchyLayout) -> AppState {
    let session = SessionConfig::new(
        "integration_test_secret_that_is_at_least_32_characters_long",
        3600,
    )
    .unwrap();

    AppState {
        db,
        // Lowest bcrypt cost keeps the suite fast.
        credentials: CredentialStore::new(4).unwrap(),
        tokens: TokenCodec::new(&session),
        cookies: CookieSettings::default(),
        layout,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_layout(HierarchyLayout::Nested).await
}

pub async fn spawn_app_with_layout(layout: HierarchyLayout) -> TestApp {
    let db = test_db().await;
    let state = test_state(db.clone(), layout);
    let app = agora::create_app(state.clone(), SecurityHeaders::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    // Login-required answers are redirects; tests inspect them instead of following.
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client,
        state,
    }
}

/// Register a user and return its id.
pub async fn register(app: &TestApp, username: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD,
            "confirm_password": PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(status, 200, "register '{}' failed: {}", username, body);
    body["data"]["id"].as_i64().unwrap() as i32
}

/// Log in and return the session token.
pub async fn login(app: &TestApp, username: &str) -> String {
    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to log in");

    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(status, 200, "login '{}' failed: {}", username, body);
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Register and log in a regular user; returns (user_id, token).
pub async fn create_user(app: &TestApp, username: &str) -> (i32, String) {
    let id = register(app, username).await;
    let token = login(app, username).await;
    (id, token)
}

/// Register a user, grant admin directly in the store, and log in.
pub async fn create_admin(app: &TestApp, username: &str) -> (i32, String) {
    let id = register(app, username).await;
    app.db
        .execute(Statement::from_sql_and_values(
            app.db.get_database_backend(),
            "UPDATE users SET is_admin = ? WHERE id = ?",
            [true.into(), id.into()],
        ))
        .await
        .expect("Failed to promote user");
    let token = login(app, username).await;
    (id, token)
}

pub async fn post_json(app: &TestApp, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
    let mut req = app.client.post(app.url(path)).json(&body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    req.send().await.unwrap()
}

pub async fn get_json(app: &TestApp, path: &str) -> (u16, Value) {
    let resp = app.client.get(app.url(path)).send().await.unwrap();
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Create a category as admin and return its id.
pub async fn create_category(app: &TestApp, admin_token: &str, name: &str) -> i32 {
    let resp = post_json(
        app,
        "/categories",
        Some(admin_token),
        json!({ "name": name, "description": format!("All about {}", name) }),
    )
    .await;
    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(status, 200, "create category failed: {}", body);
    body["data"]["id"].as_i64().unwrap() as i32
}

/// Create the level below a category (forum or flat post) and return its id.
pub async fn create_child(app: &TestApp, token: &str, category_id: i32, title: &str) -> i32 {
    let resp = post_json(
        app,
        &format!("/categories/{}/children", category_id),
        Some(token),
        json!({ "title": title, "content": format!("{} description", title) }),
    )
    .await;
    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(status, 200, "create child failed: {}", body);
    body["data"]["id"].as_i64().unwrap() as i32
}

/// Open a topic; returns (topic_id, first_post_id).
pub async fn create_topic(app: &TestApp, token: &str, forum_id: i32, title: &str, content: &str) -> (i32, i32) {
    let resp = post_json(
        app,
        &format!("/forums/{}/topics", forum_id),
        Some(token),
        json!({ "title": title, "content": content }),
    )
    .await;
    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(status, 200, "create topic failed: {}", body);
    (
        body["data"]["topic"]["id"].as_i64().unwrap() as i32,
        body["data"]["first_post"]["id"].as_i64().unwrap() as i32,
    )
}

/// Reply inside a topic and return the new post id.
pub async fn reply(app: &TestApp, token: &str, topic_id: i32, content: &str) -> i32 {
    let resp = post_json(
        app,
        &format!("/topics/{}/posts", topic_id),
        Some(token),
        json!({ "content": content }),
    )
    .await;
    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(status, 200, "reply failed: {}", body);
    body["data"]["id"].as_i64().unwrap() as i32
}

pub async fn count_rows(db: &DatabaseConnection, sql: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await
        .unwrap()
        .unwrap();
    row.try_get_by_index::<i64>(0).unwrap()
}

/// Insert a user straight into the store, bypassing the HTTP layer.
pub async fn insert_user(db: &DatabaseConnection, username: &str, is_admin: bool) -> i32 {
    use agora::models::user;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set};

    let hash = CredentialStore::new(4).unwrap().hash(PASSWORD).unwrap();
    let model = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set(hash),
        is_admin: Set(is_admin),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    model.id
}
