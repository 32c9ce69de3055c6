pub mod admin;
pub mod auth;
pub mod category;
pub mod forum;
pub mod node;
pub mod payload;
pub mod post;
pub mod topic;

pub use node::{NodeResponse, NodeWithChildren};
