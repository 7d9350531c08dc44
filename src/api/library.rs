//! Reader library: live books available for review

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::IntoParams;

use crate::auth::Claims;
use crate::domain::assignment::REVIEW_WINDOW_DAYS;
use crate::domain::{
    BookStatus, DomainError, FieldError, LibraryFilter, LibrarySort, UnknownChoice,
};
use crate::infrastructure::AppState;
use crate::services::assignment_service;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LibraryQuery {
    /// standard, kindle_unlimited, verified_ebook or verified_print
    pub reading_type: Option<String>,
    /// Marketplace code, e.g. US
    pub marketplace: Option<String>,
    pub language: Option<String>,
    /// Genre slug
    pub genre: Option<String>,
    /// created_at (default) or stars_cost
    pub sort: Option<String>,
    /// 1-based page number
    pub page: Option<u64>,
}

/// Parse an optional choice query parameter; blank means "any".
pub(crate) fn choice_param<T>(
    field: &str,
    raw: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<T>
where
    T: FromStr<Err = UnknownChoice>,
{
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(FieldError::new(field, e.to_string()));
            None
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/library",
    params(LibraryQuery),
    responses(
        (status = 200, description = "One page of live books"),
        (status = 422, description = "Unknown filter value")
    )
)]
pub async fn list_library(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<LibraryQuery>,
) -> Result<Json<Value>, DomainError> {
    let mut errors = Vec::new();
    let filter = LibraryFilter {
        reading_type: choice_param("reading_type", query.reading_type.as_deref(), &mut errors),
        marketplace: choice_param("marketplace", query.marketplace.as_deref(), &mut errors),
        language: choice_param("language", query.language.as_deref(), &mut errors),
        genre: choice_param("genre", query.genre.as_deref(), &mut errors),
        sort: LibrarySort::from_param(query.sort.as_deref()),
        page: query.page.unwrap_or(1),
        viewer: Some(claims.uid),
    };
    if !errors.is_empty() {
        return Err(DomainError::InvalidFields(errors));
    }

    let page = state.book_repo.find_live(filter).await?;
    Ok(Json(json!(page)))
}

pub async fn get_library_book(
    State(state): State<AppState>,
    _claims: Claims,
    Path(book_id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let book = state
        .book_repo
        .find_by_id(book_id)
        .await?
        .filter(|b| b.status == BookStatus::Live.as_str())
        .ok_or(DomainError::NotFound)?;
    Ok(Json(json!({ "book": book })))
}

#[utoipa::path(
    post,
    path = "/api/library/{book_id}/assign",
    params(("book_id" = i32, Path, description = "Live book to take")),
    responses(
        (status = 201, description = "Assignment created"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Already taken, or book not live")
    )
)]
pub async fn assign_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(book_id): Path<i32>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let assignment = assignment_service::create(state.db(), claims.uid, book_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!(
                "Book assigned. Your review is due in {} days.",
                REVIEW_WINDOW_DAYS
            ),
            "assignment": assignment,
        })),
    ))
}
