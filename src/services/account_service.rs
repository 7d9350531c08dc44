//! Account Service - Registration and login
//!
//! Registration is one ordered transaction: create the user, open the stars
//! ledger, grant the signup bonus. Either all three happen or none does.

use sea_orm::*;

use crate::auth::{create_jwt, hash_password, verify_password};
use crate::domain::{DomainError, FieldError, Role};
use crate::models::star_balance;
use crate::models::user::{self, Entity as User};
use crate::services::ledger_service::{self, SIGNUP_BONUS};

/// Roles a visitor may pick when signing up.
pub const PUBLIC_ROLES: &[Role] = &[Role::Author, Role::Reader];

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub role: Role,
}

fn validate(account: &NewAccount) -> Result<String, DomainError> {
    let mut errors = Vec::new();
    let username = account.username.trim();

    if username.is_empty() || username.chars().count() > 150 {
        errors.push(FieldError::new(
            "username",
            "Required. 150 characters or fewer.",
        ));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push(FieldError::new(
            "username",
            "Letters, digits and @/./+/-/_ only.",
        ));
    }

    if account.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LEN
            ),
        ));
    }

    if errors.is_empty() {
        Ok(username.to_string())
    } else {
        Err(DomainError::InvalidFields(errors))
    }
}

/// Public sign-up: only author and reader accounts.
pub async fn register(
    db: &DatabaseConnection,
    account: NewAccount,
) -> Result<(user::Model, star_balance::Model), DomainError> {
    if !PUBLIC_ROLES.contains(&account.role) {
        return Err(DomainError::Forbidden(format!(
            "Cannot self-register as {}",
            account.role
        )));
    }
    create_account(db, account).await
}

/// Create a user of any role together with its ledger and signup bonus.
pub async fn create_account(
    db: &DatabaseConnection,
    account: NewAccount,
) -> Result<(user::Model, star_balance::Model), DomainError> {
    let username = validate(&account)?;

    let taken = User::find()
        .filter(user::Column::Username.eq(&username))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(DomainError::Duplicate(format!(
            "Username '{}' is already taken",
            username
        )));
    }

    let password_hash = hash_password(&account.password).map_err(DomainError::Internal)?;
    let now = chrono::Utc::now().to_rfc3339();

    let txn = db.begin().await?;

    // 1. User
    let user = user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        role: Set(account.role.as_str().to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Duplicate("Username is already taken".to_string())
        }
        _ => DomainError::from(e),
    })?;

    // 2. Ledger row
    ledger_service::open_account_in(&txn, user.id).await?;

    // 3. Signup bonus
    let balance = ledger_service::credit_in(&txn, user.id, SIGNUP_BONUS, "Signup bonus").await?;

    txn.commit().await?;

    tracing::info!(
        "👤 Registered {} ({}) with {} stars",
        user.username,
        user.role,
        balance.balance
    );

    Ok((user, balance))
}

/// Verify credentials and issue a bearer token.
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<(user::Model, String), DomainError> {
    tracing::info!("Login attempt for user: {}", username);

    let invalid = || DomainError::Unauthorized("Invalid credentials".to_string());

    let Some(user) = User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(db)
        .await?
    else {
        tracing::warn!("User not found: {}", username);
        return Err(invalid());
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => {
            let token =
                create_jwt(user.id, &user.username, &user.role).map_err(DomainError::Internal)?;
            tracing::info!("Password verified successfully for user: {}", user.username);
            Ok((user, token))
        }
        _ => {
            tracing::warn!("Password verification failed for user: {}", user.username);
            Err(invalid())
        }
    }
}

/// Users with their current balance, for the staff overview.
pub async fn list_with_balances(
    db: &DatabaseConnection,
) -> Result<Vec<(user::Model, i32)>, DomainError> {
    let rows = User::find()
        .find_also_related(star_balance::Entity)
        .order_by_asc(user::Column::Username)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(user, balance)| {
            let stars = balance.map(|b| b.balance).unwrap_or(0);
            (user, stars)
        })
        .collect())
}
