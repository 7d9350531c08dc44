use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{self, AssignmentStatus, DomainError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub reader_id: i32,
    /// 'assigned', 'reading', 'review_submitted', 'completed', 'cancelled', 'link_pending'
    pub status: String,
    pub assigned_at: String,
    pub started_reading_at: Option<String>,
    pub completed_at: Option<String>,
    pub review_link: Option<String>,
    pub stars_reward: i32,
    pub pages_read: i32,
    pub total_pages: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReaderId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Reader,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<AssignmentStatus, DomainError> {
        self.status.parse().map_err(|e: domain::UnknownChoice| {
            DomainError::Internal(format!("assignment {}: {}", self.id, e))
        })
    }

    pub fn assigned_at(&self) -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(&self.assigned_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DomainError::Internal(format!("assignment {}: {}", self.id, e)))
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> Result<bool, DomainError> {
        Ok(domain::assignment::is_overdue(
            self.status()?,
            self.assigned_at()?,
            now,
        ))
    }
}

/// Assignment as returned by the API, with the derived overdue flag.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub id: i32,
    pub book_id: i32,
    pub book_title: Option<String>,
    pub reader_id: i32,
    pub status: String,
    pub assigned_at: String,
    pub due_at: String,
    pub started_reading_at: Option<String>,
    pub completed_at: Option<String>,
    pub review_link: Option<String>,
    pub stars_reward: i32,
    pub pages_read: i32,
    pub total_pages: i32,
    pub is_overdue: bool,
}

impl AssignmentView {
    pub fn new(
        model: Model,
        book_title: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let assigned_at = model.assigned_at()?;
        let is_overdue = model.is_overdue_at(now)?;
        Ok(Self {
            id: model.id,
            book_id: model.book_id,
            book_title,
            reader_id: model.reader_id,
            status: model.status,
            assigned_at: model.assigned_at,
            due_at: domain::assignment::due_at(assigned_at).to_rfc3339(),
            started_reading_at: model.started_reading_at,
            completed_at: model.completed_at,
            review_link: model.review_link,
            stars_reward: model.stars_reward,
            pages_read: model.pages_read,
            total_pages: model.total_pages,
            is_overdue,
        })
    }
}
