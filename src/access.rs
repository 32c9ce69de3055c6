//! Permission rules for every forum action.
//!
//! `can_perform` is a pure decision over the actor and the resource's owner.
//! `authorize` additionally decides how a denial is presented: actions that only
//! need a login send anonymous callers to the login page, while admin-only actions
//! answer `Forbidden` whether or not anyone is logged in.

use crate::error::{AppError, AppResult};
use serde::Serialize;
use utoipa::ToSchema;

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
    pub is_admin: bool,
}

/// Who is performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(Identity),
}

impl Actor {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Actor::Anonymous => None,
            Actor::User(identity) => Some(identity),
        }
    }

    pub fn user_id(&self) -> Option<i32> {
        self.identity().map(|i| i.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn is_admin(&self) -> bool {
        self.identity().is_some_and(|i| i.is_admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    CreateCategory,
    CreateForum,
    CreateTopic,
    CreatePost,
    CreateComment,
    DeleteContent,
    AccessAdminPanel,
}

/// `resource_author` is the owner of the node the action targets, when it has one.
pub fn can_perform(action: Action, actor: &Actor, resource_author: Option<i32>) -> bool {
    match action {
        Action::View => true,
        Action::CreateCategory | Action::CreateForum | Action::AccessAdminPanel => actor.is_admin(),
        Action::CreateTopic | Action::CreatePost | Action::CreateComment => {
            actor.is_authenticated()
        }
        Action::DeleteContent => match actor.identity() {
            None => false,
            Some(identity) => {
                identity.is_admin || resource_author == Some(identity.user_id)
            }
        },
    }
}

pub fn authorize(action: Action, actor: &Actor, resource_author: Option<i32>) -> AppResult<()> {
    if can_perform(action, actor, resource_author) {
        return Ok(());
    }

    match action {
        Action::CreateCategory | Action::CreateForum | Action::AccessAdminPanel => {
            Err(AppError::Forbidden)
        }
        _ if !actor.is_authenticated() => Err(AppError::LoginRequired),
        _ => Err(AppError::Forbidden),
    }
}

/// Shorthand for handlers that need a logged-in user before doing anything else.
pub fn require_identity(actor: &Actor) -> AppResult<&Identity> {
    actor.identity().ok_or(AppError::LoginRequired)
}
