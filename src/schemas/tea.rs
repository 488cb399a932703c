use serde::{Deserialize, Serialize};

use super::{CommentView, UserResponse};

/// Outward shape of a tea, with its owner and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeaView {
    pub id: i64,
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
    pub user: UserResponse,
    #[serde(default)]
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeaCreate {
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
}

impl TeaCreate {
    pub fn validate(&self) -> Result<(), String> {
        validate_tea_name(&self.name)
    }
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeaUpdate {
    pub name: Option<String>,
    pub in_stock: Option<bool>,
    pub rating: Option<i32>,
}

impl TeaUpdate {
    pub fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) => validate_tea_name(name),
            None => Ok(()),
        }
    }
}

fn validate_tea_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Tea name cannot be empty".to_string());
    }
    Ok(())
}
