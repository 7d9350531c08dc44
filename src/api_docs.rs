use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::register,
        api::auth::login,
        api::stars::get_balance,
        api::books::list_books,
        api::books::get_book,
        api::books::request_reviews,
        api::library::list_library,
        api::library::assign_book,
        api::assignments::list_assignments,
        api::assignments::submit_review,
    ),
    tags(
        (name = "bookstars", description = "BookStars API")
    )
)]
pub struct ApiDoc;
