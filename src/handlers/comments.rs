use axum::{extract::State, Json};

use crate::database::StoreError;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, JsonBody, PathParam};
use crate::schemas::{CommentCreate, CommentView};
use crate::state::AppState;

/// GET /api/comments
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<CommentView>>> {
    let comments = state.store.list_comments().await?;
    Ok(Json(comments.into_iter().map(CommentView::from).collect()))
}

/// GET /api/comments/:id
pub async fn get(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<CommentView>> {
    let comment = state
        .store
        .find_comment(id)
        .await?
        .ok_or(StoreError::CommentNotFound)?;
    Ok(Json(CommentView::from(comment)))
}

/// POST /api/teas/:id/comments
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(tea_id): PathParam<i64>,
    JsonBody(payload): JsonBody<CommentCreate>,
) -> ApiResult<Json<CommentView>> {
    payload.validate().map_err(ApiError::validation_error)?;

    let comment = state.store.create_comment(tea_id, payload.content).await?;
    tracing::debug!("User '{}' commented on tea {}", user.username, tea_id);
    Ok(Json(CommentView::from(comment)))
}
