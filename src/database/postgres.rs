use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

use super::manager::DatabaseManager;
use super::models::{Comment, NewUser, TeaWithOwner, User};
use super::store::{ensure_owner, StoreError, TeaStore};
use crate::schemas::{CommentView, TeaCreate, TeaUpdate, TeaView, UserResponse};

const TEAS_WITH_OWNER: &str = r#"
    SELECT t.id, t.name, t.in_stock, t.rating, t.user_id, u.username, u.email
    FROM teas t
    JOIN users u ON u.id = t.user_id
    ORDER BY t.id
"#;

const TEA_WITH_OWNER_BY_ID: &str = r#"
    SELECT t.id, t.name, t.in_stock, t.rating, t.user_id, u.username, u.email
    FROM teas t
    JOIN users u ON u.id = t.user_id
    WHERE t.id = $1
"#;

const LOCK_TEA_OWNER: &str = "SELECT user_id FROM teas WHERE id = $1 FOR UPDATE";

/// `TeaStore` backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_view(row: TeaWithOwner, comments: Vec<Comment>) -> TeaView {
    TeaView {
        id: row.id,
        name: row.name,
        in_stock: row.in_stock,
        rating: row.rating,
        user: UserResponse {
            username: row.username,
            email: row.email,
        },
        comments: comments.into_iter().map(CommentView::from).collect(),
    }
}

/// Turn constraint violations into domain errors, pass everything else through.
fn map_constraint(err: sqlx::Error, unique: &str, foreign_key: StoreError) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(unique.to_string()),
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => foreign_key,
        _ => StoreError::Sqlx(err),
    }
}

async fn load_view(conn: &mut PgConnection, id: i64) -> Result<Option<TeaView>, StoreError> {
    let row = sqlx::query_as::<_, TeaWithOwner>(TEA_WITH_OWNER_BY_ID)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let comments = sqlx::query_as::<_, Comment>(
        "SELECT id, content, tea_id FROM comments WHERE tea_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(into_view(row, comments)))
}

/// Lock the tea row for the rest of the transaction and check who owns it.
async fn lock_owned_tea(conn: &mut PgConnection, id: i64, requester_id: i64) -> Result<(), StoreError> {
    let owner_id = sqlx::query_scalar::<_, i64>(LOCK_TEA_OWNER)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::TeaNotFound)?;

    if let Err(e) = ensure_owner(owner_id, requester_id) {
        tracing::warn!("User {} attempted to modify tea {} owned by {}", requester_id, id, owner_id);
        return Err(e);
    }
    Ok(())
}

#[async_trait]
impl TeaStore for PgStore {
    async fn list_teas(&self) -> Result<Vec<TeaView>, StoreError> {
        let rows = sqlx::query_as::<_, TeaWithOwner>(TEAS_WITH_OWNER)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, tea_id FROM comments WHERE tea_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_tea: HashMap<i64, Vec<Comment>> = HashMap::new();
        for comment in comments {
            by_tea.entry(comment.tea_id).or_default().push(comment);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let comments = by_tea.remove(&row.id).unwrap_or_default();
                into_view(row, comments)
            })
            .collect())
    }

    async fn find_tea(&self, id: i64) -> Result<Option<TeaView>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        load_view(&mut conn, id).await
    }

    async fn create_tea(&self, owner_id: i64, tea: TeaCreate) -> Result<TeaView, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO teas (name, in_stock, rating, user_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&tea.name)
        .bind(tea.in_stock)
        .bind(tea.rating)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_constraint(
                e,
                "Tea name already exists",
                StoreError::Conflict(format!("User {} does not exist", owner_id)),
            )
        })?;

        let view = load_view(&mut tx, id).await?.ok_or(StoreError::TeaNotFound)?;
        tx.commit().await?;
        Ok(view)
    }

    async fn update_tea(
        &self,
        id: i64,
        requester_id: i64,
        patch: TeaUpdate,
    ) -> Result<TeaView, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_owned_tea(&mut tx, id, requester_id).await?;

        sqlx::query(
            r#"
            UPDATE teas
            SET name = COALESCE($2, name),
                in_stock = COALESCE($3, in_stock),
                rating = COALESCE($4, rating)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.in_stock)
        .bind(patch.rating)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "Tea name already exists", StoreError::TeaNotFound))?;

        let view = load_view(&mut tx, id).await?.ok_or(StoreError::TeaNotFound)?;
        tx.commit().await?;
        Ok(view)
    }

    async fn delete_tea(&self, id: i64, requester_id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_owned_tea(&mut tx, id, requester_id).await?;

        sqlx::query("DELETE FROM teas WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_constraint(
                e,
                "Username or email already exists",
                StoreError::Conflict("Invalid user reference".to_string()),
            )
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, StoreError> {
        Ok(
            sqlx::query_as::<_, Comment>("SELECT id, content, tea_id FROM comments ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, StoreError> {
        Ok(
            sqlx::query_as::<_, Comment>("SELECT id, content, tea_id FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_comment(&self, tea_id: i64, content: String) -> Result<Comment, StoreError> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (content, tea_id) VALUES ($1, $2) RETURNING id, content, tea_id",
        )
        .bind(&content)
        .bind(tea_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "Comment already exists", StoreError::TeaNotFound))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
