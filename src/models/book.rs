use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{BookStatus, ReadingType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub asin: String,
    #[sea_orm(default_value = "English")]
    pub language: String,
    #[sea_orm(default_value = "other_low_content")]
    pub genre: String,
    pub preferred_marketplace: String,
    /// Catalog workflow status:
    /// - `draft`: Created by the author, not yet submitted
    /// - `moderation`: Waiting for a moderator
    /// - `live`: Visible to readers and assignable
    /// - `rejected`: Refused by a moderator, may be resubmitted
    /// - `canceled`: Withdrawn by the owner
    #[sea_orm(default_value = "draft")]
    pub status: String,
    pub owner_id: i32,
    pub reading_type: Option<String>,
    pub cover_image: Option<String>,
    pub book_file: Option<String>,
    pub book_price: f64,
    pub print_book_link: Option<String>,
    pub print_book_price: Option<f64>,
    pub goodreads_link: Option<String>,
    pub add_goodreads_review: bool,
    pub add_photo_review: bool,
    pub add_video_review: bool,
    /// Stars debited from the owner for the last review request (0 if none).
    pub stars_cost: i32,
    pub review_requested_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::book_assignment::Entity")]
    Assignments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::book_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parsed workflow status. Rows are only written through the catalog
    /// service, so an unknown value means the row was edited by hand.
    pub fn status(&self) -> Result<BookStatus, crate::domain::DomainError> {
        self.status.parse().map_err(|e: crate::domain::UnknownChoice| {
            crate::domain::DomainError::Internal(format!("book {}: {}", self.id, e))
        })
    }

    pub fn reading_type(&self) -> Option<ReadingType> {
        self.reading_type.as_deref().and_then(|r| r.parse().ok())
    }
}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub asin: String,
    pub language: String,
    pub genre: String,
    pub preferred_marketplace: String,
    pub status: String,
    pub owner_id: i32,
    pub reading_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub book_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_book_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_book_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_link: Option<String>,
    pub add_goodreads_review: bool,
    pub add_photo_review: bool,
    pub add_video_review: bool,
    pub stars_cost: i32,
    pub review_requested_at: Option<String>,
    pub created_at: String,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            asin: model.asin,
            language: model.language,
            genre: model.genre,
            preferred_marketplace: model.preferred_marketplace,
            status: model.status,
            owner_id: model.owner_id,
            reading_type: model.reading_type,
            cover_image: model.cover_image,
            book_price: model.book_price,
            print_book_link: model.print_book_link,
            print_book_price: model.print_book_price,
            goodreads_link: model.goodreads_link,
            add_goodreads_review: model.add_goodreads_review,
            add_photo_review: model.add_photo_review,
            add_video_review: model.add_video_review,
            stars_cost: model.stars_cost,
            review_requested_at: model.review_requested_at,
            created_at: model.created_at,
        }
    }
}
