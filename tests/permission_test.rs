mod common;

use serde_json::{json, Value};

struct Thread {
    topic: i32,
    opening_post: i32,
    reply: i32,
}

/// Admin-made category and forum, a topic by `author`, and one reply by `author`.
async fn thread_by(app: &common::TestApp, admin: &str, author: &str) -> Thread {
    let category = common::create_category(app, admin, "Hardware").await;
    let forum = common::create_child(app, admin, category, "CPUs").await;
    let (topic, opening_post) = common::create_topic(app, author, forum, "Topic", "opening").await;
    let reply = common::reply(app, author, topic, "reply").await;
    Thread {
        topic,
        opening_post,
        reply,
    }
}

async fn delete(app: &common::TestApp, path: &str, token: Option<&str>) -> reqwest::Response {
    let mut req = app.client.delete(app.url(path));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    req.send().await.unwrap()
}

#[tokio::test]
async fn non_owner_cannot_delete() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let (_, owner) = common::create_user(&app, "owner").await;
    let (_, intruder) = common::create_user(&app, "intruder").await;
    let thread = thread_by(&app, &admin, &owner).await;

    let (_, before) = common::get_json(&app, &format!("/posts/{}", thread.reply)).await;

    let resp = delete(&app, &format!("/posts/{}", thread.reply), Some(&intruder)).await;
    assert_eq!(resp.status(), 403);

    let (status, after) = common::get_json(&app, &format!("/posts/{}", thread.reply)).await;
    assert_eq!(status, 200);
    assert_eq!(before["data"]["node"], after["data"]["node"]);
}

#[tokio::test]
async fn anonymous_delete_redirects() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let thread = thread_by(&app, &admin, &admin).await;

    let resp = delete(&app, &format!("/posts/{}", thread.reply), None).await;
    assert_eq!(resp.status(), 303);

    let (status, _) = common::get_json(&app, &format!("/posts/{}", thread.reply)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn admin_can_delete_any_reply() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let (_, owner) = common::create_user(&app, "owner").await;
    let thread = thread_by(&app, &admin, &owner).await;

    let resp = delete(&app, &format!("/posts/{}", thread.reply), Some(&admin)).await;
    assert_eq!(resp.status(), 200);

    let (status, _) = common::get_json(&app, &format!("/posts/{}", thread.reply)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn opening_post_cannot_be_deleted() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let (_, owner) = common::create_user(&app, "owner").await;
    let thread = thread_by(&app, &admin, &owner).await;

    let resp = delete(&app, &format!("/posts/{}", thread.opening_post), Some(&owner)).await;
    assert_eq!(resp.status(), 409);

    let (_, body) = common::get_json(&app, &format!("/topics/{}", thread.topic)).await;
    assert_eq!(body["data"]["children"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_route_pins_the_kind() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let thread = thread_by(&app, &admin, &admin).await;

    let resp = delete(&app, &format!("/comments/{}", thread.reply), Some(&admin)).await;
    assert_eq!(resp.status(), 404);

    // Topics are not deletable content at all.
    let resp = delete(&app, &format!("/posts/{}", thread.topic), Some(&admin)).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn only_admins_create_categories() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_user(&app, "regular").await;

    let resp = common::post_json(&app, "/categories", Some(&token), json!({ "name": "Mine" })).await;
    assert_eq!(resp.status(), 403);

    // Anonymous callers are refused outright rather than sent to log in.
    let resp = common::post_json(&app, "/categories", None, json!({ "name": "Mine" })).await;
    assert_eq!(resp.status(), 403);

    let count = common::count_rows(&app.db, "SELECT COUNT(*) FROM nodes").await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn admin_panel_access() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let (_, token) = common::create_user(&app, "regular").await;
    let category = common::create_category(&app, &admin, "Hardware").await;
    common::create_child(&app, &admin, category, "CPUs").await;

    let resp = app.client.get(app.url("/admin")).send().await.unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .get(app.url("/admin"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .get(app.url("/admin"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["categories"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["stats"]["total_users"], 2);
    assert_eq!(body["data"]["stats"]["total_categories"], 1);
    assert_eq!(body["data"]["stats"]["total_forums"], 1);
    assert_eq!(body["data"]["stats"]["total_topics"], 0);
}

#[tokio::test]
async fn permission_checked_before_body() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let (_, token) = common::create_user(&app, "regular").await;
    let category = common::create_category(&app, &admin, "Hardware").await;
    let forum = common::create_child(&app, &admin, category, "CPUs").await;
    let (topic, _) = common::create_topic(&app, &admin, forum, "Topic", "body").await;

    // Admin-only actions: 403 whoever asks, whatever the body.
    for caller in [None, Some(token.as_str())] {
        let resp = common::post_json(&app, "/categories", caller, json!({ "name": "" })).await;
        assert_eq!(resp.status(), 403);

        let resp = common::post_json(
            &app,
            &format!("/categories/{}/children", category),
            caller,
            json!({ "title": "" }),
        )
        .await;
        assert_eq!(resp.status(), 403);
    }

    // Login-only actions: anonymous callers are sent to log in first.
    let cases = [
        (format!("/forums/{}/topics", forum), json!({ "title": "", "content": "x" })),
        (format!("/forums/{}/topics", forum), json!({})),
        (format!("/topics/{}/posts", topic), json!({ "content": "" })),
    ];
    for (path, body) in cases {
        let resp = common::post_json(&app, &path, None, body).await;
        assert_eq!(resp.status(), 303, "POST {}", path);
        assert_eq!(resp.headers().get("location").unwrap(), "/api/v1/auth/login");
    }

    let resp = app
        .client
        .post(app.url(&format!("/forums/{}/topics", forum)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);

    // Once allowed, a bad body is a validation error.
    let resp = common::post_json(
        &app,
        &format!("/forums/{}/topics", forum),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let count = common::count_rows(&app.db, "SELECT COUNT(*) FROM nodes").await;
    assert_eq!(count, 4);
}
