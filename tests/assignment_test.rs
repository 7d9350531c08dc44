use bookstars::db;
use bookstars::domain::{AssignmentStatus, BookStatus, DomainError};
use bookstars::models::{book, book_assignment, star_transaction, user};
use bookstars::services::Actor;
use bookstars::services::assignment_service::{self, Progress, ReviewSubmission};
use bookstars::services::ledger_service;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_user(db: &DatabaseConnection, username: &str, role: &str) -> i32 {
    let now = Utc::now().to_rfc3339();
    user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user")
    .id
}

async fn create_book(db: &DatabaseConnection, owner_id: i32, status: BookStatus) -> book::Model {
    let now = Utc::now().to_rfc3339();
    book::ActiveModel {
        title: Set("The Long Read".to_string()),
        author: Set("Test Author".to_string()),
        asin: Set("B0TEST".to_string()),
        language: Set("English".to_string()),
        genre: Set("fiction".to_string()),
        preferred_marketplace: Set("US".to_string()),
        status: Set(status.as_str().to_string()),
        owner_id: Set(owner_id),
        reading_type: Set(Some("standard".to_string())),
        cover_image: Set(None),
        book_file: Set(None),
        book_price: Set(3.99),
        print_book_link: Set(None),
        print_book_price: Set(None),
        goodreads_link: Set(None),
        add_goodreads_review: Set(false),
        add_photo_review: Set(false),
        add_video_review: Set(false),
        stars_cost: Set(100),
        review_requested_at: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create book")
}

struct Fixture {
    db: DatabaseConnection,
    owner: i32,
    reader: i32,
    book: book::Model,
}

async fn live_book_fixture() -> Fixture {
    let db = setup_test_db().await;
    let owner = create_user(&db, "author", "author").await;
    let reader = create_user(&db, "reader", "reader").await;
    let book = create_book(&db, owner, BookStatus::Live).await;
    Fixture {
        db,
        owner,
        reader,
        book,
    }
}

fn as_user(user_id: i32) -> Actor {
    Actor {
        user_id,
        is_staff: false,
    }
}

#[tokio::test]
async fn test_second_assignment_for_same_pair_is_rejected() {
    let f = live_book_fixture().await;

    let first = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();
    assert_eq!(first.status, "assigned");
    assert_eq!(first.stars_reward, 100);

    let err = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Duplicate(_)));

    let rows = book_assignment::Entity::find()
        .filter(book_assignment::Column::BookId.eq(f.book.id))
        .filter(book_assignment::Column::ReaderId.eq(f.reader))
        .count(&f.db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_only_live_books_of_others_can_be_taken() {
    let f = live_book_fixture().await;
    let draft = create_book(&f.db, f.owner, BookStatus::Draft).await;

    let err = assignment_service::create(&f.db, f.reader, draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));

    let err = assignment_service::create(&f.db, f.reader, 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));

    let err = assignment_service::create(&f.db, f.owner, f.book.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_full_lifecycle_credits_reader_once() {
    let f = live_book_fixture().await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();

    let reading = assignment_service::start_reading(&f.db, f.reader, assignment.id)
        .await
        .unwrap();
    assert_eq!(reading.status, "reading");
    assert!(reading.started_reading_at.is_some());

    let (reviewed, balance) = assignment_service::submit_review(
        &f.db,
        f.reader,
        assignment.id,
        ReviewSubmission {
            review_link: Some("https://www.amazon.com/review/R1".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(reviewed.status, "review_submitted");
    assert!(reviewed.completed_at.is_some());
    assert_eq!(
        reviewed.review_link.as_deref(),
        Some("https://www.amazon.com/review/R1")
    );
    assert_eq!(balance.balance, 100);

    let earned = star_transaction::Entity::find()
        .filter(star_transaction::Column::UserId.eq(f.reader))
        .all(&f.db)
        .await
        .unwrap();
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0].amount, 100);
    assert_eq!(earned[0].transaction_type, "earned");
    assert_eq!(earned[0].reason, "Review submitted for 'The Long Read'");

    let completed = assignment_service::complete(&f.db, as_user(f.owner), assignment.id)
        .await
        .unwrap();
    assert_eq!(completed.status, "completed");

    let report = ledger_service::reconcile(&f.db, f.reader).await.unwrap();
    assert!(report.consistent);
}

#[tokio::test]
async fn test_complete_keeps_review_submission_time() {
    let f = live_book_fixture().await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();
    assignment_service::start_reading(&f.db, f.reader, assignment.id)
        .await
        .unwrap();
    let (reviewed, _) = assignment_service::submit_review(
        &f.db,
        f.reader,
        assignment.id,
        ReviewSubmission::default(),
    )
    .await
    .unwrap();
    let submitted_at = reviewed.completed_at.clone().expect("review time stamped");

    let completed = assignment_service::complete(&f.db, as_user(f.owner), assignment.id)
        .await
        .unwrap();
    assert_eq!(completed.status, "completed");
    assert_eq!(completed.completed_at.as_deref(), Some(submitted_at.as_str()));
}

#[tokio::test]
async fn test_review_swaps_are_refused() {
    let f = live_book_fixture().await;
    // The reader is also an author with a live book of their own
    let readers_book = create_book(&f.db, f.reader, BookStatus::Live).await;

    assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();

    let err = assignment_service::create(&f.db, f.owner, readers_book.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let count = book_assignment::Entity::find()
        .filter(book_assignment::Column::ReaderId.eq(f.owner))
        .count(&f.db)
        .await
        .unwrap();
    assert_eq!(count, 0);

    // Anyone else can still take the reader's book
    let third = create_user(&f.db, "third", "reader").await;
    assert!(
        assignment_service::create(&f.db, third, readers_book.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_link_pending_path() {
    let f = live_book_fixture().await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();
    assignment_service::start_reading(&f.db, f.reader, assignment.id)
        .await
        .unwrap();

    let pending = assignment_service::mark_link_pending(&f.db, f.reader, assignment.id)
        .await
        .unwrap();
    assert_eq!(pending.status, "link_pending");

    let (reviewed, balance) = assignment_service::submit_review(
        &f.db,
        f.reader,
        assignment.id,
        ReviewSubmission::default(),
    )
    .await
    .unwrap();
    assert_eq!(reviewed.status, "review_submitted");
    assert!(reviewed.review_link.is_none());
    assert_eq!(balance.balance, 100);
}

#[tokio::test]
async fn test_review_before_reading_is_refused_without_credit() {
    let f = live_book_fixture().await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();

    let err = assignment_service::submit_review(
        &f.db,
        f.reader,
        assignment.id,
        ReviewSubmission::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));

    let balance = ledger_service::balance_of(&f.db, f.reader).await.unwrap();
    assert_eq!(balance.balance, 0);
}

#[tokio::test]
async fn test_invalid_review_link_is_a_field_error() {
    let f = live_book_fixture().await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();
    assignment_service::start_reading(&f.db, f.reader, assignment.id)
        .await
        .unwrap();

    let err = assignment_service::submit_review(
        &f.db,
        f.reader,
        assignment.id,
        ReviewSubmission {
            review_link: Some("not a url".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidFields(_)));
}

#[tokio::test]
async fn test_only_owner_or_staff_complete() {
    let f = live_book_fixture().await;
    let stranger = create_user(&f.db, "stranger", "author").await;
    let moderator = create_user(&f.db, "mod", "moderator").await;

    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();
    assignment_service::start_reading(&f.db, f.reader, assignment.id)
        .await
        .unwrap();
    assignment_service::submit_review(&f.db, f.reader, assignment.id, ReviewSubmission::default())
        .await
        .unwrap();

    let err = assignment_service::complete(&f.db, as_user(stranger), assignment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let done = assignment_service::complete(
        &f.db,
        Actor {
            user_id: moderator,
            is_staff: true,
        },
        assignment.id,
    )
    .await
    .unwrap();
    assert_eq!(done.status, "completed");
}

#[tokio::test]
async fn test_cancel_rules() {
    let f = live_book_fixture().await;
    let stranger = create_user(&f.db, "stranger", "reader").await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();

    let err = assignment_service::cancel(&f.db, as_user(stranger), assignment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));

    let cancelled = assignment_service::cancel(&f.db, as_user(f.owner), assignment.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let err = assignment_service::cancel(&f.db, as_user(f.reader), assignment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));

    let err = assignment_service::start_reading(&f.db, f.reader, assignment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
}

#[tokio::test]
async fn test_other_readers_cannot_touch_an_assignment() {
    let f = live_book_fixture().await;
    let other = create_user(&f.db, "other", "reader").await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();

    let err = assignment_service::start_reading(&f.db, other, assignment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
}

#[tokio::test]
async fn test_progress_tracking() {
    let f = live_book_fixture().await;
    let assignment = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();

    let err = assignment_service::update_progress(
        &f.db,
        f.reader,
        assignment.id,
        Progress {
            pages_read: 300,
            total_pages: 250,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidFields(_)));

    let updated = assignment_service::update_progress(
        &f.db,
        f.reader,
        assignment.id,
        Progress {
            pages_read: 120,
            total_pages: 250,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.pages_read, 120);
    assert_eq!(updated.total_pages, 250);

    assignment_service::cancel(&f.db, as_user(f.reader), assignment.id)
        .await
        .unwrap();
    let err = assignment_service::update_progress(
        &f.db,
        f.reader,
        assignment.id,
        Progress {
            pages_read: 130,
            total_pages: 250,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
}

#[tokio::test]
async fn test_overdue_is_computed_on_read() {
    let f = live_book_fixture().await;
    let second_book = create_book(&f.db, f.owner, BookStatus::Live).await;

    let late = assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();
    let done = assignment_service::create(&f.db, f.reader, second_book.id)
        .await
        .unwrap();

    let six_days_ago = (Utc::now() - Duration::days(6)).to_rfc3339();
    for (assignment, status) in [
        (late, AssignmentStatus::Reading),
        (done, AssignmentStatus::Completed),
    ] {
        let mut active: book_assignment::ActiveModel = assignment.into();
        active.assigned_at = Set(six_days_ago.clone());
        active.status = Set(status.as_str().to_string());
        active.update(&f.db).await.unwrap();
    }

    let views = assignment_service::list_for_reader(&f.db, f.reader, None)
        .await
        .unwrap();
    assert_eq!(views.len(), 2);
    for view in &views {
        assert_eq!(view.is_overdue, view.status == "reading");
        assert_eq!(view.book_title.as_deref(), Some("The Long Read"));
    }

    let reading_only =
        assignment_service::list_for_reader(&f.db, f.reader, Some(AssignmentStatus::Reading))
            .await
            .unwrap();
    assert_eq!(reading_only.len(), 1);
}

#[tokio::test]
async fn test_owner_sees_assignments_on_their_book() {
    let f = live_book_fixture().await;
    assignment_service::create(&f.db, f.reader, f.book.id)
        .await
        .unwrap();

    let views = assignment_service::list_for_book(&f.db, f.owner, f.book.id)
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert!(!views[0].is_overdue);

    let err = assignment_service::list_for_book(&f.db, f.reader, f.book.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
}
