//! Staff overview handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::library::choice_param;
use crate::auth::Claims;
use crate::domain::{AdminBookFilter, DomainError, STAFF_ROLES};
use crate::infrastructure::AppState;
use crate::services::{account_service, ledger_service};

#[derive(Debug, Default, Deserialize)]
pub struct AdminBooksQuery {
    pub status: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub marketplace: Option<String>,
    pub q: Option<String>,
    pub page: Option<u64>,
}

pub async fn list_books(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<AdminBooksQuery>,
) -> Result<Json<Value>, DomainError> {
    claims.require_role(STAFF_ROLES)?;

    let mut errors = Vec::new();
    let filter = AdminBookFilter {
        status: choice_param("status", query.status.as_deref(), &mut errors),
        genre: choice_param("genre", query.genre.as_deref(), &mut errors),
        language: choice_param("language", query.language.as_deref(), &mut errors),
        marketplace: choice_param("marketplace", query.marketplace.as_deref(), &mut errors),
        search: query.q,
        page: query.page.unwrap_or(1),
    };
    if !errors.is_empty() {
        return Err(DomainError::InvalidFields(errors));
    }

    let page = state.book_repo.find_for_staff(filter).await?;
    Ok(Json(json!(page)))
}

pub async fn list_users(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    claims.require_role(STAFF_ROLES)?;

    let users: Vec<Value> = account_service::list_with_balances(state.db())
        .await?
        .into_iter()
        .map(|(user, stars)| {
            json!({
                "id": user.id,
                "username": user.username,
                "role": user.role,
                "stars": stars,
                "created_at": user.created_at,
            })
        })
        .collect();

    Ok(Json(json!({
        "total": users.len(),
        "users": users,
    })))
}

/// Balance, totals and transaction log of one user, with a consistency check.
pub async fn user_ledger(
    State(state): State<AppState>,
    claims: Claims,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    claims.require_role(STAFF_ROLES)?;

    let reconciliation = ledger_service::reconcile(state.db(), user_id).await?;
    let transactions = ledger_service::recent_transactions(
        state.db(),
        user_id,
        reconciliation.transaction_count as u64,
    )
    .await?;

    Ok(Json(json!({
        "reconciliation": reconciliation,
        "transactions": transactions,
    })))
}
