use crate::{
    error::AppResult,
    models::{node, Node, NodeKind, User},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

pub struct AdminService {
    db: DatabaseConnection,
}

impl AdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_stats(&self) -> AppResult<AdminStats> {
        let total_users = User::find().count(&self.db).await?;
        let total_categories = self.count_kind(NodeKind::Category).await?;
        let total_forums = self.count_kind(NodeKind::Forum).await?;
        let total_topics = self.count_kind(NodeKind::Topic).await?;
        let total_posts = self.count_kind(NodeKind::Post).await?;
        let total_comments = self.count_kind(NodeKind::Comment).await?;

        Ok(AdminStats {
            total_users,
            total_categories,
            total_forums,
            total_topics,
            total_posts,
            total_comments,
        })
    }

    async fn count_kind(&self, kind: NodeKind) -> AppResult<u64> {
        let count = Node::find()
            .filter(node::Column::Kind.eq(kind))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}

pub struct AdminStats {
    pub total_users: u64,
    pub total_categories: u64,
    pub total_forums: u64,
    pub total_topics: u64,
    pub total_posts: u64,
    pub total_comments: u64,
}
