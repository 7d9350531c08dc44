//! Stars balance handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::ledger_service::{self, RECENT_TRANSACTIONS};

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/stars",
    responses(
        (status = 200, description = "Balance with the latest transactions"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let balance = ledger_service::balance_of(state.db(), claims.uid).await?;
    let recent =
        ledger_service::recent_transactions(state.db(), claims.uid, RECENT_TRANSACTIONS).await?;

    Ok(Json(json!({
        "balance": balance.balance,
        "total_earned": balance.total_earned,
        "total_spent": balance.total_spent,
        "recent_transactions": recent,
    })))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Value>, DomainError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let transactions = ledger_service::recent_transactions(state.db(), claims.uid, limit).await?;

    Ok(Json(json!({
        "total": transactions.len(),
        "transactions": transactions,
    })))
}
