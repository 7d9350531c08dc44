//! Author-side book handlers

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::api::error::insufficient_funds;
use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::Book;
use crate::services::catalog_service::{self, ReviewRequest, ReviewRequestOutcome};
use crate::services::assignment_service;

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "Books owned by the current user"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let books: Vec<Book> = catalog_service::list_owned(state.db(), claims.uid)
        .await?
        .into_iter()
        .map(Book::from)
        .collect();

    Ok(Json(json!({
        "total": books.len(),
        "books": books,
    })))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book details"),
        (status = 404, description = "Book not found or not owned")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let book = catalog_service::get_owned(state.db(), claims.uid, id).await?;
    Ok(Json(json!({ "book": Book::from(book) })))
}

pub async fn submit_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let book = catalog_service::submit_for_moderation(state.db(), claims.uid, id).await?;
    Ok(Json(json!({
        "message": "Book sent to moderation",
        "book": Book::from(book),
    })))
}

pub async fn cancel_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let book = catalog_service::cancel(state.db(), claims.uid, id).await?;
    Ok(Json(json!({
        "message": "Book canceled",
        "book": Book::from(book),
    })))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/request-reviews",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Stars debited and reviews requested"),
        (status = 402, description = "Not enough stars; body has required and available"),
        (status = 404, description = "Book not found or not owned"),
        (status = 409, description = "Book is not live")
    )
)]
pub async fn request_reviews(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Response, DomainError> {
    match catalog_service::request_reviews(state.db(), claims.uid, id, payload).await? {
        ReviewRequestOutcome::Requested { book, balance } => Ok(Json(json!({
            "message": "Reviews requested",
            "book": Book::from(book),
            "balance": balance.balance,
        }))
        .into_response()),
        ReviewRequestOutcome::InsufficientFunds {
            required,
            available,
        } => Ok(insufficient_funds(required, available)),
    }
}

pub async fn list_book_assignments(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let assignments = assignment_service::list_for_book(state.db(), claims.uid, id).await?;
    Ok(Json(json!({
        "total": assignments.len(),
        "assignments": assignments,
    })))
}
