use crate::models::{NodeKind, NodeModel};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct NodeResponse {
    pub id: i32,
    /// category, forum, topic, post or comment
    pub kind: NodeKind,
    pub parent_id: Option<i32>,
    pub title: Option<String>,
    pub body: String,
    pub author_id: Option<i32>,
    pub created_at: String,
}

impl From<NodeModel> for NodeResponse {
    fn from(node: NodeModel) -> Self {
        Self {
            id: node.id,
            kind: node.kind,
            parent_id: node.parent_id,
            title: node.title,
            body: node.body,
            author_id: node.author_id,
            created_at: node.created_at.to_string(),
        }
    }
}

/// A node page: the node itself and its direct children in listing order.
#[derive(Debug, Serialize, ToSchema)]
pub struct NodeWithChildren {
    pub node: NodeResponse,
    pub children: Vec<NodeResponse>,
}

impl NodeWithChildren {
    pub fn new(node: NodeModel, children: Vec<NodeModel>) -> Self {
        Self {
            node: node.into(),
            children: children.into_iter().map(NodeResponse::from).collect(),
        }
    }
}
