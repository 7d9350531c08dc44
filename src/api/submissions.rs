//! Book submission wizard handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::Book;
use crate::services::submission_service::{self, StepResult};

pub async fn start_submission(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let submission = submission_service::start(state.db(), claims.uid).await?;
    Ok((StatusCode::CREATED, Json(json!({ "submission": submission }))))
}

pub async fn get_submission(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<Value>, DomainError> {
    let submission = submission_service::get(state.db(), claims.uid, &id).await?;
    Ok(Json(json!({ "submission": submission })))
}

pub async fn submit_step(
    State(state): State<AppState>,
    claims: Claims,
    Path((id, step)): Path<(String, u8)>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    match submission_service::submit_step(state.db(), claims.uid, &id, step, payload).await? {
        StepResult::Saved(submission) => Ok((
            StatusCode::OK,
            Json(json!({ "submission": submission })),
        )),
        StepResult::Committed(book) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "Book submitted successfully",
                "book": Book::from(book),
            })),
        )),
    }
}

pub async fn discard_submission(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<Value>, DomainError> {
    submission_service::discard(state.db(), claims.uid, &id).await?;
    Ok(Json(json!({ "message": "Submission discarded" })))
}
