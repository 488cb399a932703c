use async_trait::async_trait;
use thiserror::Error;

use super::models::{Comment, NewUser, User};
use crate::schemas::{TeaCreate, TeaUpdate, TeaView};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Tea not found")]
    TeaNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Operation forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Only the owner of a tea may change it.
pub fn ensure_owner(owner_id: i64, requester_id: i64) -> Result<(), StoreError> {
    if owner_id == requester_id {
        Ok(())
    } else {
        Err(StoreError::Forbidden)
    }
}

/// Repository over teas, users and comments.
///
/// Mutations that check ownership take the requester's id and perform the
/// existence check, the ownership check and the write as one unit, so a tea
/// that is missing yields `TeaNotFound` before any `Forbidden`.
#[async_trait]
pub trait TeaStore: Send + Sync {
    async fn list_teas(&self) -> Result<Vec<TeaView>, StoreError>;

    async fn find_tea(&self, id: i64) -> Result<Option<TeaView>, StoreError>;

    async fn create_tea(&self, owner_id: i64, tea: TeaCreate) -> Result<TeaView, StoreError>;

    async fn update_tea(
        &self,
        id: i64,
        requester_id: i64,
        patch: TeaUpdate,
    ) -> Result<TeaView, StoreError>;

    async fn delete_tea(&self, id: i64, requester_id: i64) -> Result<(), StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn list_comments(&self) -> Result<Vec<Comment>, StoreError>;

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, StoreError>;

    async fn create_comment(&self, tea_id: i64, content: String) -> Result<Comment, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
