use axum::{extract::State, Json};

use crate::database::NewUser;
use crate::error::{ApiError, ApiResult};
use crate::middleware::JsonBody;
use crate::schemas::{LoginResponse, RegisteredUser, UserLogin, UserRegistration};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserRegistration>,
) -> ApiResult<Json<RegisteredUser>> {
    payload.validate().map_err(ApiError::validation_error)?;

    let password_hash = state.credentials.hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user '{}' ({})", user.username, user.id);
    Ok(Json(RegisteredUser::from(user)))
}

/// POST /api/login - Exchange username and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserLogin>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.store.find_user_by_username(&payload.username).await?;

    // Same answer for unknown user and wrong password
    let user = match user {
        Some(user) if state.credentials.verify_password(&payload.password, &user.password_hash) => user,
        _ => {
            tracing::warn!("Failed login attempt for '{}'", payload.username);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let token = state.credentials.issue_token(user.id)?;
    Ok(Json(LoginResponse {
        token,
        message: "Login successful".to_string(),
    }))
}
