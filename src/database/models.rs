use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row in `users`. The hash never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Tea {
    pub id: i64,
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub tea_id: i64,
}

/// Insert payload for `users`, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Tea row joined with its owner, as read for the view queries.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct TeaWithOwner {
    pub id: i64,
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
    pub user_id: i64,
    pub username: String,
    pub email: String,
}
