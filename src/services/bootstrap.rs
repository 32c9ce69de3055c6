use crate::config::{auth::BootstrapAdminConfig, forum::HierarchyLayout};
use crate::error::AppResult;
use crate::models::{node, user, Node, NodeKind, User};
use crate::utils::CredentialStore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};

/// Categories and the forums inside them, seeded into an empty forum.
const DEMO_CONTENT: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "Computer technology of the 90s",
        "PCs, peripherals and software from the nineties",
        &[
            (
                "Hardware and peripherals",
                "Processors, graphics cards, modems",
            ),
            ("Operating systems", "Windows 95/98/ME, DOS, OS/2"),
        ],
    ),
    (
        "Mobile technology of the 2000s",
        "Phones and gadgets of the early millennium",
        &[("Feature phones", "Nokia, Siemens, Ericsson")],
    ),
];

/// Create the configured admin account at startup:
/// - no config: nothing happens
/// - the username or email is already taken: left untouched (accounts are never promoted)
/// - otherwise a new admin is created
pub async fn ensure_bootstrap_admin(
    db: &DatabaseConnection,
    credentials: &CredentialStore,
    cfg: Option<BootstrapAdminConfig>,
) -> AppResult<()> {
    let Some(cfg) = cfg else {
        return Ok(());
    };

    let existing = User::find()
        .filter(
            sea_orm::Condition::any()
                .add(user::Column::Email.eq(cfg.email.clone()))
                .add(user::Column::Username.eq(cfg.username.clone())),
        )
        .one(db)
        .await?;

    if let Some(user) = existing {
        if !user.is_admin {
            tracing::warn!(
                username = %user.username,
                "Bootstrap admin name is taken by a regular account; not promoting it"
            );
        }
        return Ok(());
    }

    let password_hash = credentials.hash(&cfg.password)?;
    let now = chrono::Utc::now().naive_utc();

    let new_user = user::ActiveModel {
        username: sea_orm::ActiveValue::Set(cfg.username),
        email: sea_orm::ActiveValue::Set(cfg.email),
        password_hash: sea_orm::ActiveValue::Set(password_hash),
        is_admin: sea_orm::ActiveValue::Set(true),
        created_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };

    let admin = new_user.insert(db).await?;
    tracing::info!(user_id = admin.id, "Bootstrap admin created");
    Ok(())
}

/// Fill an empty forum with a few categories (and forums, in the nested layout).
pub async fn seed_demo_content(db: &DatabaseConnection, layout: HierarchyLayout) -> AppResult<()> {
    let has_categories = Node::find()
        .filter(node::Column::Kind.eq(NodeKind::Category))
        .one(db)
        .await?
        .is_some();
    if has_categories {
        return Ok(());
    }

    let now = chrono::Utc::now().naive_utc();
    let txn = db.begin().await?;

    for (name, description, forums) in DEMO_CONTENT {
        let category = node::ActiveModel {
            kind: sea_orm::ActiveValue::Set(NodeKind::Category),
            parent_id: sea_orm::ActiveValue::Set(None),
            title: sea_orm::ActiveValue::Set(Some(name.to_string())),
            body: sea_orm::ActiveValue::Set(description.to_string()),
            author_id: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if layout != HierarchyLayout::Nested {
            continue;
        }

        for (forum_name, forum_description) in forums.iter() {
            node::ActiveModel {
                kind: sea_orm::ActiveValue::Set(NodeKind::Forum),
                parent_id: sea_orm::ActiveValue::Set(Some(category.id)),
                title: sea_orm::ActiveValue::Set(Some(forum_name.to_string())),
                body: sea_orm::ActiveValue::Set(forum_description.to_string()),
                author_id: sea_orm::ActiveValue::Set(None),
                created_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    tracing::info!(%layout, "Seeded demo content");
    Ok(())
}
