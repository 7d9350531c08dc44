use sea_orm::*;

use crate::domain::{BookStatus, DomainError, Genre, Language, Marketplace, ReadingType, Role};
use crate::models::{book, user};
use crate::services::account_service::{self, NewAccount};

const DEMO_PASSWORD: &str = "bookstars-demo";

async fn ensure_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
) -> Result<user::Model, DomainError> {
    if let Some(existing) = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let (created, _) = account_service::create_account(
        db,
        NewAccount {
            username: username.to_owned(),
            password: DEMO_PASSWORD.to_owned(),
            role,
        },
    )
    .await?;
    Ok(created)
}

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    // 1. One account per role
    ensure_user(db, "admin", Role::Admin).await?;
    ensure_user(db, "moderator", Role::Moderator).await?;
    let author = ensure_user(db, "author", Role::Author).await?;
    ensure_user(db, "reader", Role::Reader).await?;

    // 2. Live books for the library
    let already_seeded = book::Entity::find()
        .filter(book::Column::OwnerId.eq(author.id))
        .count(db)
        .await?
        > 0;
    if already_seeded {
        return Ok(());
    }

    let books = [
        (
            "The Quiet Orchard",
            "B0DEMO0001",
            Genre::Fiction,
            ReadingType::Standard,
        ),
        (
            "Signals from Kepler",
            "B0DEMO0002",
            Genre::SciFi,
            ReadingType::KindleUnlimited,
        ),
        (
            "Salt and Cedar",
            "B0DEMO0003",
            Genre::Romance,
            ReadingType::VerifiedEbook,
        ),
    ];

    let count = books.len();
    let now = chrono::Utc::now().to_rfc3339();
    for (title, asin, genre, reading_type) in books {
        book::ActiveModel {
            title: Set(title.to_owned()),
            author: Set("Demo Author".to_owned()),
            asin: Set(asin.to_owned()),
            language: Set(Language::English.as_str().to_owned()),
            genre: Set(genre.as_str().to_owned()),
            preferred_marketplace: Set(Marketplace::UnitedStates.as_str().to_owned()),
            status: Set(BookStatus::Live.as_str().to_owned()),
            owner_id: Set(author.id),
            reading_type: Set(Some(reading_type.as_str().to_owned())),
            cover_image: Set(None),
            book_file: Set(None),
            book_price: Set(2.99),
            print_book_link: Set(None),
            print_book_price: Set(None),
            goodreads_link: Set(None),
            add_goodreads_review: Set(false),
            add_photo_review: Set(false),
            add_video_review: Set(false),
            stars_cost: Set(reading_type.stars_cost()),
            review_requested_at: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    tracing::info!("🌱 Seeded demo accounts and {} live books", count);
    Ok(())
}
