//! Submission Service - Server-side persistence of the book wizard

use sea_orm::*;
use serde::Serialize;
use serde_json::Value;

use crate::domain::DomainError;
use crate::domain::submission::{StepOutcome, SubmissionDraft, WizardStep};
use crate::models::book;
use crate::models::submission_draft::{self, Entity as Draft};
use crate::services::catalog_service;

/// A wizard in progress, as shown to its owner
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionState {
    pub id: String,
    pub next_step: u8,
    pub draft: SubmissionDraft,
}

#[derive(Debug, Clone)]
pub enum StepResult {
    Saved(SubmissionState),
    Committed(book::Model),
}

fn decode(row: &submission_draft::Model) -> Result<SubmissionDraft, DomainError> {
    serde_json::from_str(&row.data)
        .map_err(|e| DomainError::Internal(format!("submission {} is unreadable: {}", row.id, e)))
}

fn encode(draft: &SubmissionDraft) -> Result<String, DomainError> {
    serde_json::to_string(draft).map_err(|e| DomainError::Internal(e.to_string()))
}

fn state_of(id: String, draft: SubmissionDraft) -> SubmissionState {
    SubmissionState {
        id,
        next_step: draft.next_step().number(),
        draft,
    }
}

async fn find_owned(
    db: &DatabaseConnection,
    owner_id: i32,
    id: &str,
) -> Result<submission_draft::Model, DomainError> {
    Draft::find_by_id(id.to_owned())
        .filter(submission_draft::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)
}

/// Open a new, empty submission.
pub async fn start(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<SubmissionState, DomainError> {
    let draft = SubmissionDraft::default();
    let now = chrono::Utc::now().to_rfc3339();
    let row = submission_draft::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        owner_id: Set(owner_id),
        data: Set(encode(&draft)?),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    tracing::info!("📝 Submission {} started by user {}", row.id, owner_id);
    Ok(state_of(row.id, draft))
}

pub async fn get(
    db: &DatabaseConnection,
    owner_id: i32,
    id: &str,
) -> Result<SubmissionState, DomainError> {
    let row = find_owned(db, owner_id, id).await?;
    let draft = decode(&row)?;
    Ok(state_of(row.id, draft))
}

/// Validate and store one step. The final step creates the book.
///
/// On the final step the new book and the removal of the draft commit
/// together. If that fails the draft is kept and the caller gets a generic
/// error asking them to start over.
pub async fn submit_step(
    db: &DatabaseConnection,
    owner_id: i32,
    id: &str,
    step: u8,
    payload: Value,
) -> Result<StepResult, DomainError> {
    let step = WizardStep::from_number(step).ok_or(DomainError::NotFound)?;
    let row = find_owned(db, owner_id, id).await?;
    let mut draft = decode(&row)?;

    match draft.accept(step, payload)? {
        StepOutcome::Advanced(_) => {
            let mut active: submission_draft::ActiveModel = row.into();
            active.data = Set(encode(&draft)?);
            active.updated_at = Set(chrono::Utc::now().to_rfc3339());
            let row = active.update(db).await?;
            Ok(StepResult::Saved(state_of(row.id, draft)))
        }
        StepOutcome::Ready(submission) => {
            let draft_id = row.id.clone();
            let committed = async {
                let txn = db.begin().await?;
                let book =
                    catalog_service::create_from_submission_in(&txn, owner_id, &submission).await?;
                Draft::delete_by_id(draft_id.clone()).exec(&txn).await?;
                txn.commit().await?;
                Ok::<_, DomainError>(book)
            }
            .await;

            match committed {
                Ok(book) => {
                    tracing::info!("✅ Submission {} committed as book {}", draft_id, book.id);
                    Ok(StepResult::Committed(book))
                }
                Err(e) => {
                    tracing::error!("Failed to commit submission {}: {}", draft_id, e);
                    Err(DomainError::Internal(
                        "Your book could not be saved. Please restart the submission.".to_string(),
                    ))
                }
            }
        }
    }
}

/// Throw away an unfinished submission.
pub async fn discard(db: &DatabaseConnection, owner_id: i32, id: &str) -> Result<(), DomainError> {
    let row = find_owned(db, owner_id, id).await?;
    Draft::delete_by_id(row.id).exec(db).await?;
    Ok(())
}
