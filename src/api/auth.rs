use axum::{Json, extract::State, http::StatusCode};
use sea_orm::EntityTrait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::Claims;
use crate::domain::{DomainError, Role};
use crate::infrastructure::AppState;
use crate::models::user::Entity as User;
use crate::services::account_service::{self, NewAccount};
use crate::services::ledger_service;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    #[serde(default)]
    role: Role,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    responses(
        (status = 201, description = "Account created with the signup bonus"),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Invalid username or password")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let (user, balance) = account_service::register(
        state.db(),
        NewAccount {
            username: payload.username,
            password: payload.password,
            role: payload.role,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": user,
            "stars": balance.balance,
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Bearer token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, DomainError> {
    let (user, token) = account_service::login(state.db(), &payload.username, &payload.password).await?;
    Ok(Json(json!({
        "token": token,
        "user": user,
    })))
}

pub async fn get_me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let user = User::find_by_id(claims.uid)
        .one(state.db())
        .await?
        .ok_or_else(|| DomainError::Unauthorized("Account no longer exists".to_string()))?;
    let balance = ledger_service::balance_of(state.db(), user.id).await?;

    Ok(Json(json!({
        "user": user,
        "stars": balance.balance,
    })))
}
