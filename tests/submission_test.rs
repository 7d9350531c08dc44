use bookstars::db;
use bookstars::domain::DomainError;
use bookstars::models::{submission_draft, user};
use bookstars::services::submission_service::{self, StepResult};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set,
};
use serde_json::json;

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_author(db: &DatabaseConnection, username: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        role: Set("author".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user")
    .id
}

async fn saved(
    db: &DatabaseConnection,
    owner: i32,
    id: &str,
    step: u8,
    payload: serde_json::Value,
) -> u8 {
    match submission_service::submit_step(db, owner, id, step, payload)
        .await
        .expect("step should validate")
    {
        StepResult::Saved(state) => state.next_step,
        StepResult::Committed(_) => panic!("step {step} should not commit"),
    }
}

async fn fill_first_four_steps(db: &DatabaseConnection, owner: i32, id: &str) {
    assert_eq!(
        saved(
            db,
            owner,
            id,
            1,
            json!({"title": "Night Ferry", "author": "M. Rowe", "asin": "B0FERRY01", "language": "French"}),
        )
        .await,
        2
    );
    assert_eq!(
        saved(
            db,
            owner,
            id,
            2,
            json!({
                "reading_type": "verified_ebook",
                "book_file": {"file_name": "ferry.epub", "size_bytes": 1_048_576, "storage_key": "books/ferry.epub"}
            }),
        )
        .await,
        3
    );
    assert_eq!(
        saved(
            db,
            owner,
            id,
            3,
            json!({"cover_image": {"file_name": "ferry.jpg", "size_bytes": 204_800}}),
        )
        .await,
        4
    );
    assert_eq!(
        saved(
            db,
            owner,
            id,
            4,
            json!({"preferred_marketplace": "FR", "genre": "fiction"}),
        )
        .await,
        5
    );
}

#[tokio::test]
async fn test_wizard_commits_a_draft_book() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;

    let state = submission_service::start(&db, owner).await.unwrap();
    assert_eq!(state.next_step, 1);

    fill_first_four_steps(&db, owner, &state.id).await;

    let result = submission_service::submit_step(
        &db,
        owner,
        &state.id,
        5,
        json!({"book_price": 3.99, "goodreads_link": "https://www.goodreads.com/book/show/1", "add_goodreads_review": true}),
    )
    .await
    .unwrap();

    let StepResult::Committed(book) = result else {
        panic!("final step should commit");
    };
    assert_eq!(book.status, "draft");
    assert_eq!(book.owner_id, owner);
    assert_eq!(book.title, "Night Ferry");
    assert_eq!(book.language, "French");
    assert_eq!(book.preferred_marketplace, "FR");
    assert_eq!(book.reading_type.as_deref(), Some("verified_ebook"));
    assert_eq!(book.book_file.as_deref(), Some("books/ferry.epub"));
    assert_eq!(book.cover_image.as_deref(), Some("ferry.jpg"));
    assert_eq!(book.stars_cost, 0);
    assert!(book.add_goodreads_review);

    // The draft is gone once the book exists
    let err = submission_service::get(&db, owner, &state.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
    assert_eq!(
        submission_draft::Entity::find().count(&db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_steps_cannot_be_skipped() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;
    let state = submission_service::start(&db, owner).await.unwrap();

    let err = submission_service::submit_step(
        &db,
        owner,
        &state.id,
        3,
        json!({"cover_image": {"file_name": "c.png", "size_bytes": 10}}),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
}

#[tokio::test]
async fn test_invalid_step_keeps_stored_progress() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;
    let state = submission_service::start(&db, owner).await.unwrap();

    saved(
        &db,
        owner,
        &state.id,
        1,
        json!({"title": "Kept", "author": "A", "asin": "X1"}),
    )
    .await;

    let err = submission_service::submit_step(
        &db,
        owner,
        &state.id,
        2,
        json!({"reading_type": "audiobook", "book_file": {"file_name": "x.mp3", "size_bytes": 10}}),
    )
    .await
    .unwrap_err();
    let DomainError::InvalidFields(errors) = err else {
        panic!("expected field errors");
    };
    assert_eq!(errors.len(), 2);

    let state = submission_service::get(&db, owner, &state.id).await.unwrap();
    assert_eq!(state.next_step, 2);
    assert_eq!(state.draft.basic_info.unwrap().title, "Kept");
}

#[tokio::test]
async fn test_final_step_reports_missing_print_details() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;
    let state = submission_service::start(&db, owner).await.unwrap();
    fill_first_four_steps(&db, owner, &state.id).await;

    // Switch to verified print, then finish without the print fields
    saved(
        &db,
        owner,
        &state.id,
        2,
        json!({
            "reading_type": "verified_print",
            "book_file": {"file_name": "ferry.pdf", "size_bytes": 2048}
        }),
    )
    .await;

    let err = submission_service::submit_step(&db, owner, &state.id, 5, json!({"book_price": 5}))
        .await
        .unwrap_err();
    let DomainError::InvalidFields(errors) = err else {
        panic!("expected field errors");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["print_book_link", "print_book_price"]);

    // Nothing was committed
    assert!(submission_service::get(&db, owner, &state.id).await.is_ok());
}

#[tokio::test]
async fn test_submissions_are_private_to_their_owner() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;
    let other = create_author(&db, "other").await;
    let state = submission_service::start(&db, owner).await.unwrap();

    let err = submission_service::get(&db, other, &state.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound));

    let err = submission_service::discard(&db, other, &state.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));

    submission_service::discard(&db, owner, &state.id).await.unwrap();
    let err = submission_service::get(&db, owner, &state.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
}

#[tokio::test]
async fn test_unknown_step_number_is_not_found() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;
    let state = submission_service::start(&db, owner).await.unwrap();

    let err = submission_service::submit_step(&db, owner, &state.id, 6, json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
}

#[tokio::test]
async fn test_failed_commit_asks_for_restart_and_keeps_draft() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;
    let state = submission_service::start(&db, owner).await.unwrap();
    fill_first_four_steps(&db, owner, &state.id).await;

    // Make the book insert fail
    db.execute_unprepared("DROP TABLE books").await.unwrap();

    let err = submission_service::submit_step(&db, owner, &state.id, 5, json!({"book_price": 3.99}))
        .await
        .unwrap_err();
    let DomainError::Internal(message) = err else {
        panic!("expected an internal error, got {err:?}");
    };
    assert_eq!(
        message,
        "Your book could not be saved. Please restart the submission."
    );

    let kept = submission_service::get(&db, owner, &state.id).await.unwrap();
    assert_eq!(kept.next_step, 5);
    assert_eq!(kept.draft.basic_info.unwrap().title, "Night Ferry");
}

#[tokio::test]
async fn test_price_above_ten_digits_is_refused() {
    let db = setup_test_db().await;
    let owner = create_author(&db, "author").await;
    let state = submission_service::start(&db, owner).await.unwrap();
    fill_first_four_steps(&db, owner, &state.id).await;

    let err = submission_service::submit_step(
        &db,
        owner,
        &state.id,
        5,
        json!({"book_price": 123_456_789.0}),
    )
    .await
    .unwrap_err();
    let DomainError::InvalidFields(errors) = err else {
        panic!("expected field errors");
    };
    assert_eq!(errors[0].field, "book_price");
    assert_eq!(
        errors[0].message,
        "Ensure that there are no more than 10 digits in total."
    );
}
