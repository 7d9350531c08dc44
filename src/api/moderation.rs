//! Moderator handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::auth::Claims;
use crate::domain::{DomainError, STAFF_ROLES};
use crate::infrastructure::AppState;
use crate::models::Book;
use crate::services::catalog_service;

pub async fn list_queue(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    claims.require_role(STAFF_ROLES)?;

    let books: Vec<Book> = catalog_service::moderation_queue(state.db())
        .await?
        .into_iter()
        .map(Book::from)
        .collect();

    Ok(Json(json!({
        "total": books.len(),
        "books": books,
    })))
}

async fn decide(
    state: &AppState,
    claims: &Claims,
    book_id: i32,
    approve: bool,
) -> Result<Json<Value>, DomainError> {
    claims.require_role(STAFF_ROLES)?;

    let book = catalog_service::moderate(state.db(), book_id, approve).await?;
    tracing::info!(
        "🛡️ {} {} book {}",
        claims.sub,
        if approve { "approved" } else { "rejected" },
        book.id
    );

    Ok(Json(json!({ "book": Book::from(book) })))
}

pub async fn approve(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    decide(&state, &claims, id, true).await
}

pub async fn reject(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    decide(&state, &claims, id, false).await
}
