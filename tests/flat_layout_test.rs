mod common;

use agora::config::forum::HierarchyLayout;
use serde_json::{json, Value};

#[tokio::test]
async fn posts_hang_off_categories_and_take_comments() {
    let app = common::spawn_app_with_layout(HierarchyLayout::Flat).await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let (author_id, author) = common::create_user(&app, "author").await;
    let (_, reader) = common::create_user(&app, "reader").await;

    let category = common::create_category(&app, &admin, "Mobile").await;

    // Any logged-in user may post directly under a category.
    let post = common::create_child(&app, &author, category, "Nokia 3310").await;
    let (_, body) = common::get_json(&app, &format!("/posts/{}", post)).await;
    assert_eq!(body["data"]["node"]["kind"], "post");
    assert_eq!(body["data"]["node"]["author_id"], author_id);

    let resp = common::post_json(
        &app,
        &format!("/posts/{}/comments", post),
        Some(&reader),
        json!({ "content": "Indestructible." }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let first: Value = resp.json().await.unwrap();
    assert_eq!(first["data"]["kind"], "comment");
    let first = first["data"]["id"].as_i64().unwrap();

    let resp = common::post_json(
        &app,
        &format!("/posts/{}/comments", post),
        Some(&author),
        json!({ "content": "Snake!" }),
    )
    .await;
    let second: Value = resp.json().await.unwrap();
    let second = second["data"]["id"].as_i64().unwrap();

    let (_, body) = common::get_json(&app, &format!("/posts/{}", post)).await;
    let ids: Vec<i64> = body["data"]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);

    // A post with comments stays.
    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post)))
        .bearer_auth(&author)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let resp = app
        .client
        .delete(app.url(&format!("/comments/{}", first)))
        .bearer_auth(&author)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/comments/{}", first)))
        .bearer_auth(&reader)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn comments_are_capped_and_not_nested() {
    let app = common::spawn_app_with_layout(HierarchyLayout::Flat).await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let category = common::create_category(&app, &admin, "Mobile").await;
    let post = common::create_child(&app, &admin, category, "Motorola RAZR").await;

    let resp = common::post_json(
        &app,
        &format!("/posts/{}/comments", post),
        Some(&admin),
        json!({ "content": "x".repeat(501) }),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let resp = common::post_json(
        &app,
        &format!("/posts/{}/comments", post),
        Some(&admin),
        json!({ "content": "   " }),
    )
    .await;
    assert_eq!(resp.status(), 400);

    // Forums do not exist in this layout.
    let (status, _) = common::get_json(&app, &format!("/forums/{}", post)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn anonymous_post_redirects_to_login() {
    let app = common::spawn_app_with_layout(HierarchyLayout::Flat).await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let category = common::create_category(&app, &admin, "Mobile").await;

    let resp = common::post_json(
        &app,
        &format!("/categories/{}/children", category),
        None,
        json!({ "title": "Hello", "content": "world" }),
    )
    .await;
    assert_eq!(resp.status(), 303);
}
