use crate::{
    access::{authorize, require_identity, Action, Actor},
    config::forum::HierarchyLayout,
    error::{AppError, AppResult},
    models::{node, Node, NodeKind, NodeModel},
    state::AppState,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    NewestFirst,
    OldestFirst,
}

impl ListOrder {
    /// Conversations inside a topic read top to bottom; every other listing shows
    /// the latest activity first.
    pub fn default_for(parent_kind: NodeKind) -> Self {
        match parent_kind {
            NodeKind::Topic => ListOrder::OldestFirst,
            NodeKind::Category | NodeKind::Forum | NodeKind::Post | NodeKind::Comment => {
                ListOrder::NewestFirst
            }
        }
    }
}

/// A topic together with the post that opened it.
#[derive(Debug, Clone)]
pub struct TopicWithPost {
    pub topic: NodeModel,
    pub first_post: NodeModel,
}

pub struct HierarchyService {
    db: DatabaseConnection,
    layout: HierarchyLayout,
}

impl HierarchyService {
    pub fn new(db: DatabaseConnection, layout: HierarchyLayout) -> Self {
        Self { db, layout }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.layout)
    }

    pub fn layout(&self) -> HierarchyLayout {
        self.layout
    }

    /// What creating a node directly under a category means in this layout.
    pub fn category_child(&self) -> (Action, NodeKind) {
        match self.layout {
            HierarchyLayout::Nested => (Action::CreateForum, NodeKind::Forum),
            HierarchyLayout::Flat => (Action::CreatePost, NodeKind::Post),
        }
    }

    pub async fn list_categories(&self) -> AppResult<Vec<NodeModel>> {
        let categories = Node::find()
            .filter(node::Column::Kind.eq(NodeKind::Category))
            .order_by_asc(node::Column::CreatedAt)
            .order_by_asc(node::Column::Id)
            .all(&self.db)
            .await?;
        Ok(categories)
    }

    /// Fetch a node, insisting on its kind.
    pub async fn get_node(&self, id: i32, kind: NodeKind) -> AppResult<NodeModel> {
        let node = self.find_node(id).await?;
        if node.kind != kind {
            return Err(AppError::NotFound);
        }
        Ok(node)
    }

    pub async fn find_node(&self, id: i32) -> AppResult<NodeModel> {
        Node::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn list_children(
        &self,
        parent_id: i32,
        order: ListOrder,
    ) -> AppResult<Vec<NodeModel>> {
        self.find_node(parent_id).await?;

        let query = Node::find().filter(node::Column::ParentId.eq(parent_id));
        let query = match order {
            ListOrder::NewestFirst => query
                .order_by_desc(node::Column::CreatedAt)
                .order_by_desc(node::Column::Id),
            ListOrder::OldestFirst => query
                .order_by_asc(node::Column::CreatedAt)
                .order_by_asc(node::Column::Id),
        };

        Ok(query.all(&self.db).await?)
    }

    pub async fn create_category(
        &self,
        actor: &Actor,
        name: &str,
        description: &str,
    ) -> AppResult<NodeModel> {
        authorize(Action::CreateCategory, actor, None)?;

        let category = insert_node(
            &self.db,
            NodeKind::Category,
            None,
            Some(name.to_string()),
            description.to_string(),
            actor.user_id(),
        )
        .await?;

        tracing::info!(category_id = category.id, "Category created");
        Ok(category)
    }

    /// Create the level directly below a category: a forum in the nested layout,
    /// a titled post in the flat one.
    pub async fn create_forum_or_post(
        &self,
        actor: &Actor,
        category_id: i32,
        title: &str,
        content: &str,
    ) -> AppResult<NodeModel> {
        let (action, kind) = self.category_child();
        authorize(action, actor, None)?;

        let category = self.get_node(category_id, NodeKind::Category).await?;

        let node = insert_node(
            &self.db,
            kind,
            Some(category.id),
            Some(title.to_string()),
            content.to_string(),
            actor.user_id(),
        )
        .await?;

        tracing::info!(node_id = node.id, kind = ?kind, category_id, "Created node under category");
        Ok(node)
    }

    /// Open a topic in a forum. The topic and its first post are written in one
    /// transaction, so neither exists without the other.
    pub async fn create_topic(
        &self,
        actor: &Actor,
        forum_id: i32,
        title: &str,
        first_post_content: &str,
    ) -> AppResult<TopicWithPost> {
        authorize(Action::CreateTopic, actor, None)?;
        let author_id = require_identity(actor)?.user_id;

        let forum = self.get_node(forum_id, NodeKind::Forum).await?;

        let txn = self.db.begin().await?;
        let topic = insert_node(
            &txn,
            NodeKind::Topic,
            Some(forum.id),
            Some(title.to_string()),
            String::new(),
            Some(author_id),
        )
        .await?;
        let first_post = insert_node(
            &txn,
            NodeKind::Post,
            Some(topic.id),
            None,
            first_post_content.to_string(),
            Some(author_id),
        )
        .await?;
        txn.commit().await?;

        tracing::info!(topic_id = topic.id, forum_id, "Topic created");
        Ok(TopicWithPost { topic, first_post })
    }

    /// Reply to a thread: a post inside a topic, or a comment on a category-level post.
    pub async fn create_comment(
        &self,
        actor: &Actor,
        parent_id: i32,
        content: &str,
    ) -> AppResult<NodeModel> {
        self.reply(actor, parent_id, None, content).await
    }

    /// Like [`Self::create_comment`], but the parent must be of `parent_kind`.
    pub async fn create_reply_in(
        &self,
        actor: &Actor,
        parent_kind: NodeKind,
        parent_id: i32,
        content: &str,
    ) -> AppResult<NodeModel> {
        self.reply(actor, parent_id, Some(parent_kind), content).await
    }

    async fn reply(
        &self,
        actor: &Actor,
        parent_id: i32,
        parent_kind: Option<NodeKind>,
        content: &str,
    ) -> AppResult<NodeModel> {
        authorize(Action::CreateComment, actor, None)?;
        let author_id = require_identity(actor)?.user_id;

        let parent = match parent_kind {
            Some(kind) => self.get_node(parent_id, kind).await?,
            None => self.find_node(parent_id).await?,
        };
        let kind = self.reply_kind_for(&parent).await?;

        let reply = insert_node(
            &self.db,
            kind,
            Some(parent.id),
            None,
            content.to_string(),
            Some(author_id),
        )
        .await?;

        tracing::info!(node_id = reply.id, parent_id, kind = ?kind, "Reply created");
        Ok(reply)
    }

    /// Remove one post or comment. Only its author or an admin may do so, and only
    /// when nothing hangs off it. A node of another kind than `kind` is reported as
    /// missing.
    pub async fn delete_content(
        &self,
        actor: &Actor,
        kind: NodeKind,
        node_id: i32,
    ) -> AppResult<()> {
        require_identity(actor)?;

        let node = self.find_node(node_id).await?;
        if node.kind != kind || !node.kind.is_deletable_content() {
            return Err(AppError::NotFound);
        }

        authorize(Action::DeleteContent, actor, node.author_id)?;

        let children = Node::find()
            .filter(node::Column::ParentId.eq(node.id))
            .count(&self.db)
            .await?;
        if children > 0 {
            return Err(AppError::Conflict(
                "Content with replies cannot be deleted".to_string(),
            ));
        }

        if self.is_opening_post(&node).await? {
            return Err(AppError::Conflict(
                "The opening post of a topic cannot be deleted".to_string(),
            ));
        }

        let result = Node::delete_by_id(node.id)
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                // A reply landed after the check above.
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Conflict(
                    "Content with replies cannot be deleted".to_string(),
                ),
                _ => AppError::from(e),
            })?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::info!(node_id, by = ?actor.user_id(), "Content deleted");
        Ok(())
    }

    async fn reply_kind_for(&self, parent: &NodeModel) -> AppResult<NodeKind> {
        match parent.kind {
            NodeKind::Topic => Ok(NodeKind::Post),
            NodeKind::Post => {
                // Only category-level posts are threads; posts inside topics are replies.
                let grandparent = match parent.parent_id {
                    Some(id) => Node::find_by_id(id).one(&self.db).await?,
                    None => None,
                };
                match grandparent {
                    Some(g) if g.kind == NodeKind::Category => Ok(NodeKind::Comment),
                    _ => Err(AppError::NotFound),
                }
            }
            NodeKind::Category | NodeKind::Forum | NodeKind::Comment => Err(AppError::NotFound),
        }
    }

    async fn is_opening_post(&self, node: &NodeModel) -> AppResult<bool> {
        if node.kind != NodeKind::Post {
            return Ok(false);
        }
        let Some(parent_id) = node.parent_id else {
            return Ok(false);
        };

        let parent = Node::find_by_id(parent_id).one(&self.db).await?;
        if !matches!(parent, Some(ref p) if p.kind == NodeKind::Topic) {
            return Ok(false);
        }

        let first = Node::find()
            .filter(node::Column::ParentId.eq(parent_id))
            .order_by_asc(node::Column::CreatedAt)
            .order_by_asc(node::Column::Id)
            .one(&self.db)
            .await?;
        Ok(first.is_some_and(|f| f.id == node.id))
    }
}

async fn insert_node<C: ConnectionTrait>(
    conn: &C,
    kind: NodeKind,
    parent_id: Option<i32>,
    title: Option<String>,
    body: String,
    author_id: Option<i32>,
) -> AppResult<NodeModel> {
    let now = chrono::Utc::now().naive_utc();

    let new_node = node::ActiveModel {
        kind: sea_orm::ActiveValue::Set(kind),
        parent_id: sea_orm::ActiveValue::Set(parent_id),
        title: sea_orm::ActiveValue::Set(title),
        body: sea_orm::ActiveValue::Set(body),
        author_id: sea_orm::ActiveValue::Set(author_id),
        created_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };

    Ok(new_node.insert(conn).await?)
}
