//! Ledger Service - Stars balances and the append-only transaction log
//!
//! Every mutation updates the balance row and appends a transaction record
//! on the same connection. The `*_in` variants run on a caller-provided
//! transaction so that other workflows (registration, review requests,
//! review submission) commit their own changes and the ledger entry together.

use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;

use crate::domain::{DomainError, TransactionType};
use crate::models::star_balance::{self, Entity as StarBalance};
use crate::models::star_transaction::{self, Entity as StarTransaction};
use crate::models::user::Entity as User;

/// Stars granted to every new account.
pub const SIGNUP_BONUS: i32 = 2000;

/// Transactions shown alongside the balance.
pub const RECENT_TRANSACTIONS: u64 = 10;

/// Result of a debit attempt. Running short of stars is an expected outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum DebitOutcome {
    Debited(star_balance::Model),
    InsufficientFunds { required: i32, available: i32 },
}

/// Consistency report for one user's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub user_id: i32,
    pub balance: i32,
    pub total_earned: i32,
    pub total_spent: i32,
    pub ledger_sum: i64,
    pub transaction_count: usize,
    pub consistent: bool,
}

fn check_amount(amount: i32) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::Validation(format!(
            "Star amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

async fn fetch_balance<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<star_balance::Model>, DomainError> {
    Ok(StarBalance::find()
        .filter(star_balance::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// Create the zero balance row for a user if it does not exist yet.
pub async fn open_account_in<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<star_balance::Model, DomainError> {
    if let Some(existing) = fetch_balance(conn, user_id).await? {
        return Ok(existing);
    }

    User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(DomainError::NotFound)?;

    let now = chrono::Utc::now().to_rfc3339();
    let row = star_balance::ActiveModel {
        user_id: Set(user_id),
        balance: Set(0),
        total_earned: Set(0),
        total_spent: Set(0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(row.insert(conn).await?)
}

async fn record<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    amount: i32,
    transaction_type: TransactionType,
    reason: &str,
    now: &str,
) -> Result<star_transaction::Model, DomainError> {
    let entry = star_transaction::ActiveModel {
        user_id: Set(user_id),
        amount: Set(amount),
        transaction_type: Set(transaction_type.as_str().to_owned()),
        reason: Set(reason.chars().take(255).collect()),
        created_at: Set(now.to_owned()),
        ..Default::default()
    };

    Ok(entry.insert(conn).await?)
}

/// Add stars to a user's balance on an open transaction.
pub async fn credit_in<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    amount: i32,
    reason: &str,
) -> Result<star_balance::Model, DomainError> {
    check_amount(amount)?;
    open_account_in(conn, user_id).await?;

    let now = chrono::Utc::now().to_rfc3339();
    StarBalance::update_many()
        .col_expr(
            star_balance::Column::Balance,
            Expr::col(star_balance::Column::Balance).add(amount),
        )
        .col_expr(
            star_balance::Column::TotalEarned,
            Expr::col(star_balance::Column::TotalEarned).add(amount),
        )
        .col_expr(star_balance::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(star_balance::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;

    record(conn, user_id, amount, TransactionType::Earned, reason, &now).await?;

    tracing::info!("⭐ Credited {} stars to user {}: {}", amount, user_id, reason);

    fetch_balance(conn, user_id)
        .await?
        .ok_or_else(|| DomainError::Internal(format!("balance row vanished for user {}", user_id)))
}

/// Remove stars from a user's balance on an open transaction.
///
/// The balance guard is part of the UPDATE, so concurrent debits cannot
/// take the balance below zero. On insufficient funds nothing is written.
pub async fn debit_in<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    amount: i32,
    reason: &str,
) -> Result<DebitOutcome, DomainError> {
    check_amount(amount)?;
    open_account_in(conn, user_id).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let result = StarBalance::update_many()
        .col_expr(
            star_balance::Column::Balance,
            Expr::col(star_balance::Column::Balance).sub(amount),
        )
        .col_expr(
            star_balance::Column::TotalSpent,
            Expr::col(star_balance::Column::TotalSpent).add(amount),
        )
        .col_expr(star_balance::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(star_balance::Column::UserId.eq(user_id))
        .filter(star_balance::Column::Balance.gte(amount))
        .exec(conn)
        .await?;

    let balance = fetch_balance(conn, user_id)
        .await?
        .ok_or_else(|| DomainError::Internal(format!("balance row vanished for user {}", user_id)))?;

    if result.rows_affected == 0 {
        tracing::warn!(
            "Insufficient stars for user {}: required {}, available {}",
            user_id,
            amount,
            balance.balance
        );
        return Ok(DebitOutcome::InsufficientFunds {
            required: amount,
            available: balance.balance,
        });
    }

    record(conn, user_id, -amount, TransactionType::Spent, reason, &now).await?;

    tracing::info!("💸 Debited {} stars from user {}: {}", amount, user_id, reason);

    Ok(DebitOutcome::Debited(balance))
}

/// Credit stars atomically (balance update and transaction record).
pub async fn credit(
    db: &DatabaseConnection,
    user_id: i32,
    amount: i32,
    reason: &str,
) -> Result<star_balance::Model, DomainError> {
    let txn = db.begin().await?;
    let balance = credit_in(&txn, user_id, amount, reason).await?;
    txn.commit().await?;
    Ok(balance)
}

/// Debit stars atomically (balance update and transaction record).
pub async fn debit(
    db: &DatabaseConnection,
    user_id: i32,
    amount: i32,
    reason: &str,
) -> Result<DebitOutcome, DomainError> {
    let txn = db.begin().await?;
    let outcome = debit_in(&txn, user_id, amount, reason).await?;
    txn.commit().await?;
    Ok(outcome)
}

/// Current balance, creating an empty one for users that have none yet.
pub async fn balance_of(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<star_balance::Model, DomainError> {
    open_account_in(db, user_id).await
}

/// Latest transactions, newest first
pub async fn recent_transactions(
    db: &DatabaseConnection,
    user_id: i32,
    limit: u64,
) -> Result<Vec<star_transaction::Model>, DomainError> {
    Ok(StarTransaction::find()
        .filter(star_transaction::Column::UserId.eq(user_id))
        .order_by_desc(star_transaction::Column::CreatedAt)
        .order_by_desc(star_transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}

/// Check that the balance, the running totals and the transaction log agree.
pub async fn reconcile(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Reconciliation, DomainError> {
    let balance = fetch_balance(db, user_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let entries = StarTransaction::find()
        .filter(star_transaction::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    let ledger_sum: i64 = entries.iter().map(|t| i64::from(t.amount)).sum();
    let consistent = i64::from(balance.balance) == ledger_sum
        && balance.balance == balance.total_earned - balance.total_spent
        && balance.balance >= 0;

    if !consistent {
        tracing::error!(
            "Ledger mismatch for user {}: balance {}, earned {}, spent {}, log sum {}",
            user_id,
            balance.balance,
            balance.total_earned,
            balance.total_spent,
            ledger_sum
        );
    }

    Ok(Reconciliation {
        user_id,
        balance: balance.balance,
        total_earned: balance.total_earned,
        total_spent: balance.total_spent,
        ledger_sum,
        transaction_count: entries.len(),
        consistent,
    })
}
