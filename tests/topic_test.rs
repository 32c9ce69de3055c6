mod common;

use agora::access::{Actor, Identity};
use agora::config::forum::HierarchyLayout;
use agora::models::NodeKind;
use agora::services::hierarchy::{HierarchyService, ListOrder};
use agora::AppError;
use sea_orm::{ConnectionTrait, Statement};
use serde_json::json;

async fn install_failing_post_trigger(db: &sea_orm::DatabaseConnection) {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE TRIGGER fail_boom_post BEFORE INSERT ON nodes \
         WHEN NEW.kind = 'post' AND NEW.body = 'boom' \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
            .to_string(),
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn failed_first_post_leaves_no_topic() {
    let app = common::spawn_app().await;
    let (_, admin) = common::create_admin(&app, "admin").await;
    let (_, token) = common::create_user(&app, "writer").await;
    let category = common::create_category(&app, &admin, "Hardware").await;
    let forum = common::create_child(&app, &admin, category, "CPUs").await;

    install_failing_post_trigger(&app.db).await;

    let resp = common::post_json(
        &app,
        &format!("/forums/{}/topics", forum),
        Some(&token),
        json!({ "title": "Doomed", "content": "boom" }),
    )
    .await;
    assert_eq!(resp.status(), 500);

    let topics = common::count_rows(&app.db, "SELECT COUNT(*) FROM nodes WHERE kind = 'topic'").await;
    let posts = common::count_rows(&app.db, "SELECT COUNT(*) FROM nodes WHERE kind = 'post'").await;
    assert_eq!(topics, 0);
    assert_eq!(posts, 0);

    // The store is still usable afterwards.
    let (topic, _) = common::create_topic(&app, &token, forum, "Fine", "works").await;
    let (status, _) = common::get_json(&app, &format!("/topics/{}", topic)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn service_rolls_back_topic_on_failure() {
    let db = common::test_db().await;
    let state = common::test_state(db.clone(), HierarchyLayout::Nested);
    let service = HierarchyService::from_state(&state);

    let admin_id = common::insert_user(&db, "admin", true).await;
    let admin = Actor::User(Identity {
        user_id: admin_id,
        username: "admin".to_string(),
        is_admin: true,
    });

    let category = service
        .create_category(&admin, "Hardware", "Chips and boards")
        .await
        .unwrap();
    let forum = service
        .create_forum_or_post(&admin, category.id, "CPUs", "Processors")
        .await
        .unwrap();
    assert_eq!(forum.kind, NodeKind::Forum);

    install_failing_post_trigger(&db).await;

    let err = service
        .create_topic(&admin, forum.id, "Doomed", "boom")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    let topics = service
        .list_children(forum.id, ListOrder::default_for(NodeKind::Forum))
        .await
        .unwrap();
    assert!(topics.is_empty());
}

#[tokio::test]
async fn anonymous_topic_creation_needs_login() {
    let db = common::test_db().await;
    let state = common::test_state(db.clone(), HierarchyLayout::Nested);
    let service = HierarchyService::from_state(&state);

    let err = service
        .create_topic(&Actor::Anonymous, 1, "Title", "body")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LoginRequired));
}
