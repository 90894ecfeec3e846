//! Question bank endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{MessageResponse, Question, QuestionRequest, QuestionResponse};
use crate::AppState;

use super::error::ApiError;
use super::validation::{require_object_id, validate_question_request};

pub async fn create_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    validate_question_request(&req)?;

    let question = Question::create(&state.db, &req).await?;

    info!(question_id = %question.id, category = %question.category, "Created question");

    Ok((StatusCode::CREATED, Json(QuestionResponse::try_from(question)?)))
}

pub async fn list_questions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = Question::list_all(&state.db)
        .await?
        .into_iter()
        .map(QuestionResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(questions))
}

pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let id = require_object_id(&id)?;

    let question = Question::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Question not found"))?;

    Ok(Json(QuestionResponse::try_from(question)?))
}

/// Replace a question. Completed evaluations keep their stored scores.
pub async fn update_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let id = require_object_id(&id)?;
    validate_question_request(&req)?;

    let question = Question::update(&state.db, &id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Question not found"))?;

    info!(question_id = %question.id, "Updated question");

    Ok(Json(QuestionResponse::try_from(question)?))
}

pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = require_object_id(&id)?;

    if !Question::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("Question not found"));
    }

    info!(question_id = %id, "Deleted question");

    Ok(Json(MessageResponse::new("Question deleted successfully")))
}
