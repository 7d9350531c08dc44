//! Reader assignment handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::IntoParams;

use crate::api::library::choice_param;
use crate::auth::Claims;
use crate::domain::{AssignmentStatus, DomainError};
use crate::infrastructure::AppState;
use crate::models::book_assignment::{self, AssignmentView};
use crate::services::Actor;
use crate::services::assignment_service::{self, Progress, ReviewSubmission};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignmentsQuery {
    /// Only assignments in this status
    pub status: Option<String>,
}

fn view(assignment: book_assignment::Model) -> Result<AssignmentView, DomainError> {
    AssignmentView::new(assignment, None, Utc::now())
}

#[utoipa::path(
    get,
    path = "/api/assignments",
    params(AssignmentsQuery),
    responses(
        (status = 200, description = "The reader's assignments with overdue flags"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<AssignmentsQuery>,
) -> Result<Json<Value>, DomainError> {
    let mut errors = Vec::new();
    let status: Option<AssignmentStatus> =
        choice_param("status", query.status.as_deref(), &mut errors);
    if !errors.is_empty() {
        return Err(DomainError::InvalidFields(errors));
    }

    let assignments = assignment_service::list_for_reader(state.db(), claims.uid, status).await?;
    let overdue = assignments.iter().filter(|a| a.is_overdue).count();

    Ok(Json(json!({
        "total": assignments.len(),
        "overdue": overdue,
        "assignments": assignments,
    })))
}

pub async fn start_reading(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let assignment = assignment_service::start_reading(state.db(), claims.uid, id).await?;
    Ok(Json(json!({ "assignment": view(assignment)? })))
}

pub async fn mark_link_pending(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let assignment = assignment_service::mark_link_pending(state.db(), claims.uid, id).await?;
    Ok(Json(json!({ "assignment": view(assignment)? })))
}

#[utoipa::path(
    post,
    path = "/api/assignments/{id}/submit-review",
    params(("id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Review recorded and stars credited"),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Assignment is not being read")
    )
)]
pub async fn submit_review(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    payload: Option<Json<ReviewSubmission>>,
) -> Result<Json<Value>, DomainError> {
    let review = payload.map(|Json(r)| r).unwrap_or_default();
    let (assignment, balance) =
        assignment_service::submit_review(state.db(), claims.uid, id, review).await?;
    let earned = assignment.stars_reward;

    Ok(Json(json!({
        "message": format!("Review submitted. You earned {} stars.", earned),
        "assignment": view(assignment)?,
        "balance": balance.balance,
    })))
}

pub async fn update_progress(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(progress): Json<Progress>,
) -> Result<Json<Value>, DomainError> {
    let assignment =
        assignment_service::update_progress(state.db(), claims.uid, id, progress).await?;
    Ok(Json(json!({ "assignment": view(assignment)? })))
}

pub async fn complete(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let assignment =
        assignment_service::complete(state.db(), Actor::from_claims(&claims), id).await?;
    Ok(Json(json!({ "assignment": view(assignment)? })))
}

pub async fn cancel(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let assignment =
        assignment_service::cancel(state.db(), Actor::from_claims(&claims), id).await?;
    Ok(Json(json!({ "assignment": view(assignment)? })))
}
