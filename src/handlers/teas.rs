use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult, TEA_NOT_FOUND};
use crate::middleware::{AuthUser, JsonBody, PathParam};
use crate::schemas::{TeaCreate, TeaUpdate, TeaView};
use crate::state::AppState;

/// GET /api/teas - All teas with owner and comments
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<TeaView>>> {
    Ok(Json(state.store.list_teas().await?))
}

/// GET /api/teas/:id
pub async fn get(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<TeaView>> {
    state
        .store
        .find_tea(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(TEA_NOT_FOUND))
}

/// POST /api/teas - The authenticated user becomes the owner
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<TeaCreate>,
) -> ApiResult<Json<TeaView>> {
    payload.validate().map_err(ApiError::validation_error)?;

    let tea = state.store.create_tea(user.id, payload).await?;
    tracing::info!("User '{}' created tea {} ({})", user.username, tea.id, tea.name);
    Ok(Json(tea))
}

/// PUT /api/teas/:id - Owner only; absent fields are left unchanged
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i64>,
    JsonBody(payload): JsonBody<TeaUpdate>,
) -> ApiResult<Json<TeaView>> {
    payload.validate().map_err(ApiError::validation_error)?;

    let tea = state.store.update_tea(id, user.id, payload).await?;
    Ok(Json(tea))
}

/// DELETE /api/teas/:id - Owner only
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<i64>,
) -> ApiResult<Json<Value>> {
    state.store.delete_tea(id, user.id).await?;
    tracing::info!("User '{}' deleted tea {}", user.username, id);

    Ok(Json(json!({ "message": format!("Tea with ID {} has been deleted", id) })))
}
