use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Comment, NewUser, Tea, User};
use super::store::{ensure_owner, StoreError, TeaStore};
use crate::schemas::{CommentView, TeaCreate, TeaUpdate, TeaView, UserResponse};

/// In-process store with the same constraints as the PostgreSQL schema.
///
/// Used by `serve --store memory` and by the HTTP test-suite. One write lock
/// covers each mutation, which plays the role of the per-request transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    teas: Vec<Tea>,
    comments: Vec<Comment>,
    next_user_id: i64,
    next_tea_id: i64,
    next_comment_id: i64,
}

impl Tables {
    fn view(&self, tea: &Tea) -> TeaView {
        // user_id is a foreign key, the owner row always exists
        let user = self
            .users
            .iter()
            .find(|u| u.id == tea.user_id)
            .map(UserResponse::from)
            .unwrap_or_else(|| UserResponse {
                username: String::new(),
                email: String::new(),
            });

        let comments = self
            .comments
            .iter()
            .filter(|c| c.tea_id == tea.id)
            .cloned()
            .map(CommentView::from)
            .collect();

        TeaView {
            id: tea.id,
            name: tea.name.clone(),
            in_stock: tea.in_stock,
            rating: tea.rating,
            user,
            comments,
        }
    }

    fn name_taken(&self, name: &str, except_id: Option<i64>) -> bool {
        self.teas
            .iter()
            .any(|t| t.name == name && Some(t.id) != except_id)
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeaStore for MemoryStore {
    async fn list_teas(&self) -> Result<Vec<TeaView>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables.teas.iter().map(|t| tables.view(t)).collect())
    }

    async fn find_tea(&self, id: i64) -> Result<Option<TeaView>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables.teas.iter().find(|t| t.id == id).map(|t| tables.view(t)))
    }

    async fn create_tea(&self, owner_id: i64, tea: TeaCreate) -> Result<TeaView, StoreError> {
        let mut tables = self.inner.write().await;

        if !tables.users.iter().any(|u| u.id == owner_id) {
            return Err(StoreError::Conflict(format!("User {} does not exist", owner_id)));
        }
        if tables.name_taken(&tea.name, None) {
            return Err(StoreError::Conflict("Tea name already exists".to_string()));
        }

        let row = Tea {
            id: next_id(&mut tables.next_tea_id),
            name: tea.name,
            in_stock: tea.in_stock,
            rating: tea.rating,
            user_id: owner_id,
        };
        let view = tables.view(&row);
        tables.teas.push(row);
        Ok(view)
    }

    async fn update_tea(
        &self,
        id: i64,
        requester_id: i64,
        patch: TeaUpdate,
    ) -> Result<TeaView, StoreError> {
        let mut tables = self.inner.write().await;

        let index = tables
            .teas
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TeaNotFound)?;
        ensure_owner(tables.teas[index].user_id, requester_id)?;

        if let Some(name) = &patch.name {
            if tables.name_taken(name, Some(id)) {
                return Err(StoreError::Conflict("Tea name already exists".to_string()));
            }
        }

        let tea = &mut tables.teas[index];
        if let Some(name) = patch.name {
            tea.name = name;
        }
        if let Some(in_stock) = patch.in_stock {
            tea.in_stock = in_stock;
        }
        if let Some(rating) = patch.rating {
            tea.rating = rating;
        }

        let updated = tea.clone();
        Ok(tables.view(&updated))
    }

    async fn delete_tea(&self, id: i64, requester_id: i64) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;

        let index = tables
            .teas
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TeaNotFound)?;
        ensure_owner(tables.teas[index].user_id, requester_id)?;

        tables.teas.remove(index);
        tables.comments.retain(|c| c.tea_id != id);
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.inner.write().await;

        if tables
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict("Username or email already exists".to_string()));
        }

        let row = User {
            id: next_id(&mut tables.next_user_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, StoreError> {
        Ok(self.inner.read().await.comments.clone())
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create_comment(&self, tea_id: i64, content: String) -> Result<Comment, StoreError> {
        let mut tables = self.inner.write().await;

        if !tables.teas.iter().any(|t| t.id == tea_id) {
            return Err(StoreError::TeaNotFound);
        }

        let row = Comment {
            id: next_id(&mut tables.next_comment_id),
            content,
            tea_id,
        };
        tables.comments.push(row.clone());
        Ok(row)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
