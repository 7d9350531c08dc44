//! Catalog Service - Book workflow and review requests

use sea_orm::*;
use serde::Deserialize;

use crate::domain::catalog::BookAction;
use crate::domain::submission::CompletedSubmission;
use crate::domain::validation::{optional_http_url, price};
use crate::domain::{BookStatus, DomainError, FieldError, ReadingType};
use crate::models::book::{self, Entity as Book};
use crate::models::star_balance;
use crate::services::ledger_service::{self, DebitOutcome};

/// Options chosen by the author when asking for reviews
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    /// Falls back to the reading type chosen at submission
    pub reading_type: Option<ReadingType>,
    pub print_book_link: Option<String>,
    pub print_book_price: Option<f64>,
    pub goodreads_link: Option<String>,
    #[serde(default)]
    pub add_goodreads_review: bool,
    #[serde(default)]
    pub add_photo_review: bool,
    #[serde(default)]
    pub add_video_review: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewRequestOutcome {
    Requested {
        book: book::Model,
        balance: star_balance::Model,
    },
    InsufficientFunds {
        required: i32,
        available: i32,
    },
}

/// Insert the book described by a finished submission, as a draft.
pub async fn create_from_submission_in<C: ConnectionTrait>(
    conn: &C,
    owner_id: i32,
    submission: &CompletedSubmission,
) -> Result<book::Model, DomainError> {
    let now = chrono::Utc::now().to_rfc3339();
    let stored_name = |file: &crate::domain::submission::UploadedFile| {
        file.storage_key
            .clone()
            .unwrap_or_else(|| file.file_name.clone())
    };

    let new_book = book::ActiveModel {
        title: Set(submission.basic_info.title.clone()),
        author: Set(submission.basic_info.author.clone()),
        asin: Set(submission.basic_info.asin.clone()),
        language: Set(submission.basic_info.language.as_str().to_owned()),
        genre: Set(submission.placement.genre.as_str().to_owned()),
        preferred_marketplace: Set(submission
            .placement
            .preferred_marketplace
            .as_str()
            .to_owned()),
        status: Set(BookStatus::Draft.as_str().to_owned()),
        owner_id: Set(owner_id),
        reading_type: Set(Some(submission.reading.reading_type.as_str().to_owned())),
        cover_image: Set(Some(stored_name(&submission.cover.cover_image))),
        book_file: Set(Some(stored_name(&submission.reading.book_file))),
        book_price: Set(submission.details.book_price),
        print_book_link: Set(submission.details.print_book_link.clone()),
        print_book_price: Set(submission.details.print_book_price),
        goodreads_link: Set(submission.details.goodreads_link.clone()),
        add_goodreads_review: Set(submission.details.add_goodreads_review),
        add_photo_review: Set(false),
        add_video_review: Set(false),
        stars_cost: Set(0),
        review_requested_at: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let book = new_book.insert(conn).await?;
    tracing::info!("📚 Book {} '{}' created for owner {}", book.id, book.title, owner_id);
    Ok(book)
}

/// Books owned by an author, newest first
pub async fn list_owned(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<book::Model>, DomainError> {
    Ok(Book::find()
        .filter(book::Column::OwnerId.eq(owner_id))
        .order_by_desc(book::Column::CreatedAt)
        .order_by_desc(book::Column::Id)
        .all(db)
        .await?)
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    owner_id: i32,
    book_id: i32,
) -> Result<book::Model, DomainError> {
    Book::find_by_id(book_id)
        .filter(book::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?
        .ok_or(DomainError::NotFound)
}

/// A book owned by `owner_id`; other owners' books are reported as not found.
pub async fn get_owned(
    db: &DatabaseConnection,
    owner_id: i32,
    book_id: i32,
) -> Result<book::Model, DomainError> {
    find_owned(db, owner_id, book_id).await
}

async fn transition(
    db: &DatabaseConnection,
    book: book::Model,
    action: BookAction,
) -> Result<book::Model, DomainError> {
    let current = book.status()?;
    let next = current.apply(action).ok_or_else(|| {
        DomainError::InvalidState(format!(
            "Cannot {} a book that is {}",
            action.as_str(),
            current.as_str()
        ))
    })?;

    let book_id = book.id;
    let mut active: book::ActiveModel = book.into();
    active.status = Set(next.as_str().to_owned());
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    let updated = active.update(db).await?;

    tracing::info!("📖 Book {} {} -> {}", book_id, current, next);
    Ok(updated)
}

/// Owner sends a draft (or rejected) book to the moderators.
pub async fn submit_for_moderation(
    db: &DatabaseConnection,
    owner_id: i32,
    book_id: i32,
) -> Result<book::Model, DomainError> {
    let book = find_owned(db, owner_id, book_id).await?;
    transition(db, book, BookAction::SubmitForModeration).await
}

/// Owner withdraws a book.
pub async fn cancel(
    db: &DatabaseConnection,
    owner_id: i32,
    book_id: i32,
) -> Result<book::Model, DomainError> {
    let book = find_owned(db, owner_id, book_id).await?;
    transition(db, book, BookAction::Cancel).await
}

/// Moderator decision on a book waiting in moderation.
pub async fn moderate(
    db: &DatabaseConnection,
    book_id: i32,
    approve: bool,
) -> Result<book::Model, DomainError> {
    let book = Book::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;
    let action = if approve {
        BookAction::Approve
    } else {
        BookAction::Reject
    };
    transition(db, book, action).await
}

/// Books waiting for a moderator, oldest first
pub async fn moderation_queue(db: &DatabaseConnection) -> Result<Vec<book::Model>, DomainError> {
    Ok(Book::find()
        .filter(book::Column::Status.eq(BookStatus::Moderation.as_str()))
        .order_by_asc(book::Column::UpdatedAt)
        .order_by_asc(book::Column::Id)
        .all(db)
        .await?)
}

/// Validated reading-type-specific fields to stamp on the book.
struct ReviewOptions {
    reading_type: ReadingType,
    print_book_link: Option<String>,
    print_book_price: Option<f64>,
    goodreads_link: Option<String>,
    add_goodreads_review: bool,
    add_photo_review: bool,
    add_video_review: bool,
}

fn review_options(book: &book::Model, request: ReviewRequest) -> Result<ReviewOptions, DomainError> {
    let mut errors = Vec::new();

    let reading_type = match request.reading_type.or_else(|| book.reading_type()) {
        Some(reading_type) => reading_type,
        None => {
            return Err(DomainError::InvalidFields(vec![FieldError::new(
                "reading_type",
                "Choose a reading type.",
            )]));
        }
    };

    let goodreads_raw = request.goodreads_link.or_else(|| book.goodreads_link.clone());
    let goodreads_link = optional_http_url("goodreads_link", goodreads_raw.as_deref())
        .unwrap_or_else(|e| {
            errors.push(e);
            None
        });
    if request.add_goodreads_review && goodreads_link.is_none() {
        errors.push(FieldError::new(
            "goodreads_link",
            "Provide the Goodreads link to request Goodreads reviews.",
        ));
    }

    let (print_book_link, print_book_price) = if reading_type.is_print() {
        let link_raw = request
            .print_book_link
            .or_else(|| book.print_book_link.clone());
        let link = match optional_http_url("print_book_link", link_raw.as_deref()) {
            Ok(Some(link)) => Some(link),
            Ok(None) => {
                errors.push(FieldError::new(
                    "print_book_link",
                    "A print link is required for verified print reviews.",
                ));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let price_value = match request.print_book_price.or(book.print_book_price) {
            Some(raw) => price("print_book_price", raw)
                .map_err(|e| errors.push(e))
                .ok(),
            None => {
                errors.push(FieldError::new(
                    "print_book_price",
                    "A print price is required for verified print reviews.",
                ));
                None
            }
        };
        (link, price_value)
    } else {
        (book.print_book_link.clone(), book.print_book_price)
    };

    if !errors.is_empty() {
        return Err(DomainError::InvalidFields(errors));
    }

    let is_print = reading_type.is_print();
    Ok(ReviewOptions {
        reading_type,
        print_book_link,
        print_book_price,
        goodreads_link,
        add_goodreads_review: request.add_goodreads_review,
        add_photo_review: is_print && request.add_photo_review,
        add_video_review: is_print && request.add_video_review,
    })
}

/// Pay for reviews of a live book.
///
/// The debit and the book update commit together. When the owner cannot
/// afford the reading type, nothing changes and the outcome carries the
/// required and available amounts.
pub async fn request_reviews(
    db: &DatabaseConnection,
    owner_id: i32,
    book_id: i32,
    request: ReviewRequest,
) -> Result<ReviewRequestOutcome, DomainError> {
    let txn = db.begin().await?;

    let book = find_owned(&txn, owner_id, book_id).await?;
    if !book.status()?.is_live() {
        return Err(DomainError::InvalidState(
            "Reviews can only be requested for live books".to_string(),
        ));
    }

    let options = review_options(&book, request)?;
    let cost = options.reading_type.stars_cost();
    let reason = format!(
        "Reviews requested for '{}' ({})",
        book.title,
        options.reading_type.label()
    );

    let balance = match ledger_service::debit_in(&txn, owner_id, cost, &reason).await? {
        DebitOutcome::Debited(balance) => balance,
        DebitOutcome::InsufficientFunds {
            required,
            available,
        } => {
            txn.rollback().await?;
            return Ok(ReviewRequestOutcome::InsufficientFunds {
                required,
                available,
            });
        }
    };

    let now = chrono::Utc::now().to_rfc3339();
    let mut active: book::ActiveModel = book.into();
    active.reading_type = Set(Some(options.reading_type.as_str().to_owned()));
    active.stars_cost = Set(cost);
    active.print_book_link = Set(options.print_book_link);
    active.print_book_price = Set(options.print_book_price);
    active.goodreads_link = Set(options.goodreads_link);
    active.add_goodreads_review = Set(options.add_goodreads_review);
    active.add_photo_review = Set(options.add_photo_review);
    active.add_video_review = Set(options.add_video_review);
    active.review_requested_at = Set(Some(now.clone()));
    active.updated_at = Set(now);
    let book = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        "🌟 Reviews requested for book {} at {} stars ({} left)",
        book.id,
        cost,
        balance.balance
    );

    Ok(ReviewRequestOutcome::Requested { book, balance })
}
