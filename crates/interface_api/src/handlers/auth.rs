//! Registration and login handlers

use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use domain_claims::users::validate_registration;
use domain_claims::NewUser;

use crate::auth::{create_token, hash_password, verify_password, AuthError};
use crate::dto::auth::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::error::ApiError;
use crate::handlers::validate_request;
use crate::AppState;

/// Creates a user; usernames are unique
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_request(&request)?;
    validate_registration(
        &request.username,
        &request.email,
        &request.password,
        &request.password_confirmation,
    )
    .into_result()?;

    let user = state
        .users
        .create_user(NewUser {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash: hash_password(&request.password)?,
        })
        .await?;

    info!(username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchanges credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_request(&request)?;

    let user = state
        .users
        .find_user_by_username(request.username.trim())
        .await?
        .filter(|user| user.is_active);

    let Some(user) = user.filter(|user| verify_password(&request.password, &user.password_hash)) else {
        warn!(username = %request.username.trim(), "Failed login");
        return Err(AuthError::InvalidCredentials.into());
    };

    let access_token = create_token(
        &user.id.to_string(),
        &user.username,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs,
    )?;

    info!(username = %user.username, "User logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt_expiration_secs,
    }))
}
