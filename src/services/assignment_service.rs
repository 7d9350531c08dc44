//! Assignment Service - Reader assignments and their lifecycle

use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;

use crate::domain::assignment::{AssignmentAction, DEFAULT_STARS_REWARD};
use crate::domain::validation::optional_http_url;
use crate::domain::{AssignmentStatus, DomainError, FieldError};
use crate::models::book::{self, Entity as Book};
use crate::models::book_assignment::{self, AssignmentView, Entity as BookAssignment};
use crate::models::star_balance;
use crate::services::Actor;
use crate::services::ledger_service;

/// Review payload sent by a reader
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSubmission {
    pub review_link: Option<String>,
}

/// Reading progress reported by a reader
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Progress {
    pub pages_read: i32,
    pub total_pages: i32,
}

async fn find_assignment<C: ConnectionTrait>(
    conn: &C,
    assignment_id: i32,
) -> Result<book_assignment::Model, DomainError> {
    BookAssignment::find_by_id(assignment_id)
        .one(conn)
        .await?
        .ok_or(DomainError::NotFound)
}

/// An assignment belonging to `reader_id`; anyone else's is reported as not found.
async fn find_for_reader<C: ConnectionTrait>(
    conn: &C,
    reader_id: i32,
    assignment_id: i32,
) -> Result<book_assignment::Model, DomainError> {
    let assignment = find_assignment(conn, assignment_id).await?;
    if assignment.reader_id != reader_id {
        return Err(DomainError::NotFound);
    }
    Ok(assignment)
}

fn next_status(
    assignment: &book_assignment::Model,
    action: AssignmentAction,
) -> Result<AssignmentStatus, DomainError> {
    let current = assignment.status()?;
    current.apply(action).ok_or_else(|| {
        DomainError::InvalidState(format!(
            "Cannot {} an assignment that is {}",
            action.as_str(),
            current.as_str()
        ))
    })
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Take a live book for reading.
pub async fn create(
    db: &DatabaseConnection,
    reader_id: i32,
    book_id: i32,
) -> Result<book_assignment::Model, DomainError> {
    let book = Book::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    if !book.status()?.is_live() {
        return Err(DomainError::InvalidState(
            "This book is not available for reading".to_string(),
        ));
    }
    if book.owner_id == reader_id {
        return Err(DomainError::Validation(
            "You cannot take your own book".to_string(),
        ));
    }

    // The owner already took one of the reader's books: no review swaps
    let swap = BookAssignment::find()
        .inner_join(Book)
        .filter(book_assignment::Column::ReaderId.eq(book.owner_id))
        .filter(book::Column::OwnerId.eq(reader_id))
        .one(db)
        .await?;
    if swap.is_some() {
        tracing::warn!(
            "Refusing swap: owner {} of book {} already reads for reader {}",
            book.owner_id,
            book_id,
            reader_id
        );
        return Err(DomainError::Validation(
            "This author has already taken one of your books".to_string(),
        ));
    }

    let existing = BookAssignment::find()
        .filter(book_assignment::Column::BookId.eq(book_id))
        .filter(book_assignment::Column::ReaderId.eq(reader_id))
        .one(db)
        .await?;
    if existing.is_some() {
        tracing::warn!("Reader {} already has book {}", reader_id, book_id);
        return Err(DomainError::Duplicate(
            "You have already taken this book".to_string(),
        ));
    }

    let assignment = book_assignment::ActiveModel {
        book_id: Set(book_id),
        reader_id: Set(reader_id),
        status: Set(AssignmentStatus::Assigned.as_str().to_owned()),
        assigned_at: Set(Utc::now().to_rfc3339()),
        stars_reward: Set(DEFAULT_STARS_REWARD),
        pages_read: Set(0),
        total_pages: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            DomainError::Duplicate("You have already taken this book".to_string())
        } else {
            DomainError::from(e)
        }
    })?;

    tracing::info!(
        "📗 Assignment {} created: reader {} took book {}",
        assignment.id,
        reader_id,
        book_id
    );
    Ok(assignment)
}

async fn advance<C: ConnectionTrait>(
    conn: &C,
    assignment: book_assignment::Model,
    next: AssignmentStatus,
    stamp: impl FnOnce(&mut book_assignment::ActiveModel),
) -> Result<book_assignment::Model, DomainError> {
    let id = assignment.id;
    let previous = assignment.status.clone();
    let mut active: book_assignment::ActiveModel = assignment.into();
    active.status = Set(next.as_str().to_owned());
    stamp(&mut active);
    let updated = active.update(conn).await?;

    tracing::info!("Assignment {} {} -> {}", id, previous, next);
    Ok(updated)
}

/// assigned -> reading
pub async fn start_reading(
    db: &DatabaseConnection,
    reader_id: i32,
    assignment_id: i32,
) -> Result<book_assignment::Model, DomainError> {
    let assignment = find_for_reader(db, reader_id, assignment_id).await?;
    let next = next_status(&assignment, AssignmentAction::StartReading)?;
    advance(db, assignment, next, |a| {
        a.started_reading_at = Set(Some(Utc::now().to_rfc3339()));
    })
    .await
}

/// reading -> link_pending: the review is written but its public link is not
/// available yet.
pub async fn mark_link_pending(
    db: &DatabaseConnection,
    reader_id: i32,
    assignment_id: i32,
) -> Result<book_assignment::Model, DomainError> {
    let assignment = find_for_reader(db, reader_id, assignment_id).await?;
    let next = next_status(&assignment, AssignmentAction::MarkLinkPending)?;
    advance(db, assignment, next, |_| {}).await
}

/// Record the review and pay the reader.
///
/// The status change and the stars credit commit together.
pub async fn submit_review(
    db: &DatabaseConnection,
    reader_id: i32,
    assignment_id: i32,
    review: ReviewSubmission,
) -> Result<(book_assignment::Model, star_balance::Model), DomainError> {
    let review_link = optional_http_url("review_link", review.review_link.as_deref())
        .map_err(|e| DomainError::InvalidFields(vec![e]))?;

    let txn = db.begin().await?;

    let assignment = find_for_reader(&txn, reader_id, assignment_id).await?;
    let next = next_status(&assignment, AssignmentAction::SubmitReview)?;

    let title = Book::find_by_id(assignment.book_id)
        .one(&txn)
        .await?
        .map(|b| b.title)
        .unwrap_or_else(|| format!("book #{}", assignment.book_id));
    let reward = assignment.stars_reward;

    let assignment = advance(&txn, assignment, next, |a| {
        a.completed_at = Set(Some(Utc::now().to_rfc3339()));
        if review_link.is_some() {
            a.review_link = Set(review_link);
        }
    })
    .await?;

    let balance = ledger_service::credit_in(
        &txn,
        reader_id,
        reward,
        &format!("Review submitted for '{}'", title),
    )
    .await?;

    txn.commit().await?;

    Ok((assignment, balance))
}

/// Update reading progress on an assignment that is still open.
pub async fn update_progress(
    db: &DatabaseConnection,
    reader_id: i32,
    assignment_id: i32,
    progress: Progress,
) -> Result<book_assignment::Model, DomainError> {
    let mut errors = Vec::new();
    if progress.total_pages < 0 {
        errors.push(FieldError::new("total_pages", "Must not be negative."));
    }
    if progress.pages_read < 0 {
        errors.push(FieldError::new("pages_read", "Must not be negative."));
    } else if progress.pages_read > progress.total_pages {
        errors.push(FieldError::new(
            "pages_read",
            "Cannot exceed the total number of pages.",
        ));
    }
    if !errors.is_empty() {
        return Err(DomainError::InvalidFields(errors));
    }

    let assignment = find_for_reader(db, reader_id, assignment_id).await?;
    if assignment.status()?.is_terminal() {
        return Err(DomainError::InvalidState(format!(
            "Assignment is already {}",
            assignment.status
        )));
    }

    let mut active: book_assignment::ActiveModel = assignment.into();
    active.pages_read = Set(progress.pages_read);
    active.total_pages = Set(progress.total_pages);
    Ok(active.update(db).await?)
}

async fn owner_of_book(db: &DatabaseConnection, book_id: i32) -> Result<i32, DomainError> {
    Book::find_by_id(book_id)
        .one(db)
        .await?
        .map(|b| b.owner_id)
        .ok_or(DomainError::NotFound)
}

/// review_submitted -> completed, by the book's owner or staff.
pub async fn complete(
    db: &DatabaseConnection,
    actor: Actor,
    assignment_id: i32,
) -> Result<book_assignment::Model, DomainError> {
    let assignment = find_assignment(db, assignment_id).await?;
    let owner_id = owner_of_book(db, assignment.book_id).await?;
    if !actor.is_staff && actor.user_id != owner_id {
        return Err(DomainError::Forbidden(
            "Only the book owner can complete this assignment".to_string(),
        ));
    }

    // completed_at keeps the review submission time
    let next = next_status(&assignment, AssignmentAction::Complete)?;
    advance(db, assignment, next, |_| {}).await
}

/// Cancel an open assignment. Stars already credited are kept.
pub async fn cancel(
    db: &DatabaseConnection,
    actor: Actor,
    assignment_id: i32,
) -> Result<book_assignment::Model, DomainError> {
    let assignment = find_assignment(db, assignment_id).await?;
    if !actor.is_staff && actor.user_id != assignment.reader_id {
        let owner_id = owner_of_book(db, assignment.book_id).await?;
        if actor.user_id != owner_id {
            return Err(DomainError::NotFound);
        }
    }

    let next = next_status(&assignment, AssignmentAction::Cancel)?;
    advance(db, assignment, next, |_| {}).await
}

fn with_titles(
    rows: Vec<(book_assignment::Model, Option<book::Model>)>,
) -> Result<Vec<AssignmentView>, DomainError> {
    let now = Utc::now();
    rows.into_iter()
        .map(|(assignment, book)| AssignmentView::new(assignment, book.map(|b| b.title), now))
        .collect()
}

/// A reader's assignments, newest first, optionally narrowed to one status.
pub async fn list_for_reader(
    db: &DatabaseConnection,
    reader_id: i32,
    status: Option<AssignmentStatus>,
) -> Result<Vec<AssignmentView>, DomainError> {
    let mut query = BookAssignment::find()
        .filter(book_assignment::Column::ReaderId.eq(reader_id));
    if let Some(status) = status {
        query = query.filter(book_assignment::Column::Status.eq(status.as_str()));
    }

    let rows = query
        .order_by_desc(book_assignment::Column::AssignedAt)
        .order_by_desc(book_assignment::Column::Id)
        .find_also_related(Book)
        .all(db)
        .await?;

    with_titles(rows)
}

/// Assignments on one of the owner's books.
pub async fn list_for_book(
    db: &DatabaseConnection,
    owner_id: i32,
    book_id: i32,
) -> Result<Vec<AssignmentView>, DomainError> {
    if owner_of_book(db, book_id).await? != owner_id {
        return Err(DomainError::NotFound);
    }

    let rows = BookAssignment::find()
        .filter(book_assignment::Column::BookId.eq(book_id))
        .order_by_desc(book_assignment::Column::AssignedAt)
        .order_by_desc(book_assignment::Column::Id)
        .find_also_related(Book)
        .all(db)
        .await?;

    with_titles(rows)
}
