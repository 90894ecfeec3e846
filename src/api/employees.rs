//! Employee endpoints.
//!
//! Employees carry their own credentials so they can sign in; responses never
//! include the password hash.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{Employee, EmployeeRecord, EmployeeRequest, EmployeeResponse, MessageResponse};
use crate::AppState;

use super::auth::{hash_or_internal, Principal};
use super::error::ApiError;
use super::validation::{require_object_id, validate_employee_request};

/// Validated, normalized fields of an employee request
struct NormalizedEmployee {
    email: String,
    password_hash: String,
    manager_id: Option<String>,
}

fn normalize(req: &EmployeeRequest) -> Result<NormalizedEmployee, ApiError> {
    validate_employee_request(req)?;
    Ok(NormalizedEmployee {
        email: req.email.trim().to_lowercase(),
        password_hash: hash_or_internal(&req.password)?,
        manager_id: req.manager_id.as_deref().map(str::to_ascii_lowercase),
    })
}

fn record<'a>(req: &'a EmployeeRequest, normalized: &'a NormalizedEmployee) -> EmployeeRecord<'a> {
    EmployeeRecord {
        email: &normalized.email,
        password_hash: &normalized.password_hash,
        first_name: req.first_name.trim(),
        last_name: req.last_name.trim(),
        position: req.position.trim(),
        department: req.department.trim(),
        hire_date: req.hire_date.trim(),
        manager_id: normalized.manager_id.as_deref(),
    }
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<EmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), ApiError> {
    let normalized = normalize(&req)?;

    if Employee::find_by_email(&state.db, &normalized.email)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("An employee with this email already exists"));
    }

    let employee = Employee::create(&state.db, &record(&req, &normalized)).await?;

    info!(
        employee_id = %employee.id,
        department = %employee.department,
        created_by = %principal.id,
        "Created employee"
    );

    Ok((StatusCode::CREATED, Json(EmployeeResponse::from(employee))))
}

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
    let employees = Employee::list_all(&state.db).await?;
    Ok(Json(employees.into_iter().map(EmployeeResponse::from).collect()))
}

pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let id = require_object_id(&id)?;

    let employee = Employee::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    Ok(Json(EmployeeResponse::from(employee)))
}

/// Replace an employee. The password is re-hashed on every update.
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<EmployeeRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let id = require_object_id(&id)?;
    let normalized = normalize(&req)?;

    let employee = Employee::update(&state.db, &id, &record(&req, &normalized))
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    info!(employee_id = %employee.id, "Updated employee");

    Ok(Json(EmployeeResponse::from(employee)))
}

pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = require_object_id(&id)?;

    if !Employee::delete(&state.db, &id).await? {
        return Err(ApiError::not_found("Employee not found"));
    }

    info!(employee_id = %id, "Deleted employee");

    Ok(Json(MessageResponse::new("Employee deleted successfully")))
}
