//! Services Layer
//!
//! Business logic behind the HTTP handlers. Every operation takes the
//! database connection explicitly; workflows that touch several tables open
//! one transaction and pass it down to the `*_in` helpers.

pub mod account_service;
pub mod assignment_service;
pub mod catalog_service;
pub mod ledger_service;
pub mod submission_service;

/// Who is acting on a resource that several roles may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub is_staff: bool,
}

impl Actor {
    pub fn from_claims(claims: &crate::auth::Claims) -> Self {
        Self {
            user_id: claims.uid,
            is_staff: claims.is_staff(),
        }
    }
}
