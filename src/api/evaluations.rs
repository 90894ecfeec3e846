//! Evaluation endpoints, including submission for scoring.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::db::{
    Employee, EmployeeResponse, Evaluation, EvaluationDetail, EvaluationRequest,
    EvaluationResponse, MessageResponse, User, UserResponse,
};
use crate::engine;
use crate::AppState;

use super::auth::Principal;
use super::error::ApiError;
use super::validation::{require_object_id, validate_evaluation_request};

/// Create a pending evaluation. Scores are only assigned on submission.
pub async fn create_evaluation(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(mut req): Json<EvaluationRequest>,
) -> Result<(StatusCode, Json<EvaluationResponse>), ApiError> {
    validate_evaluation_request(&req)?;
    req.normalize_ids();

    let evaluation = Evaluation::create(&state.db, &req).await?;

    info!(
        evaluation_id = %evaluation.id,
        employee_id = %evaluation.employee_id,
        created_by = %principal.id,
        "Created evaluation"
    );

    Ok((StatusCode::CREATED, Json(EvaluationResponse::try_from(evaluation)?)))
}

/// List evaluations with their employee and evaluator resolved
pub async fn list_evaluations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EvaluationDetail>>, ApiError> {
    let evaluations = Evaluation::list_all(&state.db).await?;
    if evaluations.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let employees: HashMap<String, EmployeeResponse> = Employee::list_all(&state.db)
        .await?
        .into_iter()
        .map(|e| (e.id.clone(), EmployeeResponse::from(e)))
        .collect();
    let users: HashMap<String, UserResponse> = User::list_all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id.clone(), UserResponse::from(u)))
        .collect();

    let details = evaluations
        .into_iter()
        .map(|evaluation| {
            let employee = employees.get(&evaluation.employee_id).cloned();
            let evaluator = users.get(&evaluation.evaluator_id).cloned();
            EvaluationDetail::new(evaluation, employee, evaluator)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(details))
}

pub async fn get_evaluation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EvaluationDetail>, ApiError> {
    let id = require_object_id(&id)?;

    let evaluation = Evaluation::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Evaluation not found"))?;

    let employee = Employee::find_by_id(&state.db, &evaluation.employee_id)
        .await?
        .map(EmployeeResponse::from);
    let evaluator = User::find_by_id(&state.db, &evaluation.evaluator_id)
        .await?
        .map(UserResponse::from);

    Ok(Json(EvaluationDetail::new(evaluation, employee, evaluator)?))
}

/// Replace the content of an evaluation. Status and score are left alone.
pub async fn update_evaluation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut req): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let id = require_object_id(&id)?;
    validate_evaluation_request(&req)?;
    req.normalize_ids();

    let evaluation = Evaluation::update(&state.db, &id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("Evaluation not found"))?;

    info!(evaluation_id = %evaluation.id, "Updated evaluation");

    Ok(Json(EvaluationResponse::try_from(evaluation)?))
}

pub async fn delete_evaluation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = require_object_id(&id)?;

    if !Evaluation::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("Evaluation not found"));
    }

    info!(evaluation_id = %id, "Deleted evaluation");

    Ok(Json(MessageResponse::new("Evaluation deleted successfully")))
}

/// Score an evaluation and mark it completed
pub async fn submit_evaluation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let id = require_object_id(&id)?;

    let evaluation = engine::submit_evaluation(&state.db, &id).await?;
    Ok(Json(evaluation))
}
