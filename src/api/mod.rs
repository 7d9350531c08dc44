pub mod admin;
pub mod assignments;
pub mod auth;
pub mod books;
pub mod error;
pub mod health;
pub mod library;
pub mod moderation;
pub mod stars;
pub mod submissions;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        // Stars
        .route("/stars", get(stars::get_balance))
        .route("/stars/transactions", get(stars::list_transactions))
        // Submission wizard
        .route("/submissions", post(submissions::start_submission))
        .route(
            "/submissions/:id",
            get(submissions::get_submission).delete(submissions::discard_submission),
        )
        .route("/submissions/:id/steps/:step", put(submissions::submit_step))
        // Author's books
        .route("/books", get(books::list_books))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/submit", post(books::submit_book))
        .route("/books/:id/cancel", post(books::cancel_book))
        .route("/books/:id/request-reviews", post(books::request_reviews))
        .route("/books/:id/assignments", get(books::list_book_assignments))
        // Reader library
        .route("/library", get(library::list_library))
        .route("/library/:book_id", get(library::get_library_book))
        .route("/library/:book_id/assign", post(library::assign_book))
        // Assignments
        .route("/assignments", get(assignments::list_assignments))
        .route("/assignments/:id/start", post(assignments::start_reading))
        .route(
            "/assignments/:id/link-pending",
            post(assignments::mark_link_pending),
        )
        .route(
            "/assignments/:id/submit-review",
            post(assignments::submit_review),
        )
        .route("/assignments/:id/progress", put(assignments::update_progress))
        .route("/assignments/:id/complete", post(assignments::complete))
        .route("/assignments/:id/cancel", post(assignments::cancel))
        // Moderation (admin, moderator)
        .route("/moderation/books", get(moderation::list_queue))
        .route("/moderation/books/:id/approve", post(moderation::approve))
        .route("/moderation/books/:id/reject", post(moderation::reject))
        // Staff overview (admin, moderator)
        .route("/admin/books", get(admin::list_books))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/ledger/:user_id", get(admin::user_ledger))
        .with_state(state)
}
