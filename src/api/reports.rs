//! Report endpoints over completed evaluations.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::engine::{self, DepartmentReport, EmployeeReport};
use crate::AppState;

use super::error::ApiError;
use super::validation::{require_object_id, validate_required};

pub async fn employee_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeReport>, ApiError> {
    let id = require_object_id(&id)?;

    let report = engine::generate_employee_report(&state.db, &id).await?;
    Ok(Json(report))
}

pub async fn department_report(
    State(state): State<Arc<AppState>>,
    Path(department): Path<String>,
) -> Result<Json<DepartmentReport>, ApiError> {
    validate_required(&department, "Department")
        .map_err(|e| ApiError::validation_field("department", e))?;

    let report = engine::generate_department_report(&state.db, department.trim()).await?;
    Ok(Json(report))
}
