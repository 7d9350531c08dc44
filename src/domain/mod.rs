//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum) apart
//! from the `DbErr` conversion on [`DomainError`].
//! Choice enums, state machines, validation, repository traits and errors.

pub mod access;
pub mod assignment;
pub mod catalog;
pub mod choices;
pub mod errors;
pub mod repositories;
pub mod submission;
pub mod validation;

pub use access::{authorize, AccessDecision, STAFF_ROLES};
pub use choices::{
    AssignmentStatus, BookStatus, Genre, Language, Marketplace, ReadingType, Role,
    TransactionType, UnknownChoice,
};
pub use errors::{DomainError, FieldError};
pub use repositories::*;
