use serde::{Deserialize, Serialize};

use crate::database::Comment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub content: String,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentCreate {
    pub content: String,
}

impl CommentCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("Comment content cannot be empty".to_string());
        }
        Ok(())
    }
}
