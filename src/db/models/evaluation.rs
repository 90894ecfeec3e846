//! Evaluation models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{parse_json_list, serialize_json_list};
use super::employee::EmployeeResponse;
use super::user::UserResponse;

/// Evaluation lifecycle. `Completed` is terminal and only reached by submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Pending,
    Completed,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EvaluationStatus {
    fn from(s: &str) -> Self {
        match s {
            "completed" => EvaluationStatus::Completed,
            _ => EvaluationStatus::Pending,
        }
    }
}

/// One answered (or unanswered) question inside an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationQuestion {
    #[serde(default)]
    pub question_id: String,
    /// Zero-based index of the chosen option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Evaluation {
    pub id: String,
    /// Weak reference to the evaluated employee
    pub employee_id: String,
    /// Weak reference to the evaluating user
    pub evaluator_id: String,
    pub period: String,
    pub status: String,
    /// JSON array of `EvaluationQuestion`
    pub questions: String,
    pub score: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Evaluation {
    pub fn status_enum(&self) -> EvaluationStatus {
        EvaluationStatus::from(self.status.as_str())
    }

    pub fn entries(&self) -> Result<Vec<EvaluationQuestion>, serde_json::Error> {
        parse_json_list(&self.questions)
    }

    pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<Evaluation>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM evaluations WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<Evaluation>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM evaluations ORDER BY created_at ASC, rowid ASC")
            .fetch_all(db)
            .await
    }

    /// Completed evaluations of one employee, oldest first
    pub async fn list_completed_for_employee(
        db: &SqlitePool,
        employee_id: &str,
    ) -> Result<Vec<Evaluation>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM evaluations
            WHERE employee_id = ? AND status = 'completed'
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(employee_id)
        .fetch_all(db)
        .await
    }

    /// Completed evaluations of every employee currently in `department`, oldest first
    pub async fn list_completed_for_department(
        db: &SqlitePool,
        department: &str,
    ) -> Result<Vec<Evaluation>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT ev.* FROM evaluations ev
            INNER JOIN employees em ON em.id = ev.employee_id
            WHERE em.department = ? AND ev.status = 'completed'
            ORDER BY ev.created_at ASC, ev.rowid ASC
            "#,
        )
        .bind(department)
        .fetch_all(db)
        .await
    }

    /// Insert a new pending evaluation with a zero score
    pub async fn create(db: &SqlitePool, req: &EvaluationRequest) -> Result<Evaluation, sqlx::Error> {
        let id = crate::db::new_id();
        let now = crate::db::now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO evaluations (
                id, employee_id, evaluator_id, period, status, questions, score, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, 'pending', ?, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.employee_id)
        .bind(&req.evaluator_id)
        .bind(req.period.trim())
        .bind(serialize_json_list(&req.questions))
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        sqlx::query_as("SELECT * FROM evaluations WHERE id = ?")
            .bind(&id)
            .fetch_one(db)
            .await
    }

    /// Replace the editable fields. Status and score are left untouched.
    pub async fn update(
        db: &SqlitePool,
        id: &str,
        req: &EvaluationRequest,
    ) -> Result<Option<Evaluation>, sqlx::Error> {
        let now = crate::db::now_timestamp();

        let result = sqlx::query(
            r#"
            UPDATE evaluations SET
                employee_id = ?,
                evaluator_id = ?,
                period = ?,
                questions = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.employee_id)
        .bind(&req.evaluator_id)
        .bind(req.period.trim())
        .bind(serialize_json_list(&req.questions))
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(db, id).await
    }

    /// Persist a computed score and mark the evaluation completed in one write
    pub async fn record_score(db: &SqlitePool, id: &str, score: f64) -> Result<bool, sqlx::Error> {
        let now = crate::db::now_timestamp();

        let result = sqlx::query(
            "UPDATE evaluations SET status = 'completed', score = ?, updated_at = ? WHERE id = ?",
        )
        .bind(score)
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM evaluations WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub id: String,
    pub employee_id: String,
    pub evaluator_id: String,
    pub period: String,
    pub status: EvaluationStatus,
    pub questions: Vec<EvaluationQuestion>,
    pub score: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<Evaluation> for EvaluationResponse {
    type Error = serde_json::Error;

    fn try_from(evaluation: Evaluation) -> Result<Self, Self::Error> {
        Ok(Self {
            questions: evaluation.entries()?,
            status: evaluation.status_enum(),
            id: evaluation.id,
            employee_id: evaluation.employee_id,
            evaluator_id: evaluation.evaluator_id,
            period: evaluation.period,
            score: evaluation.score,
            created_at: evaluation.created_at,
            updated_at: evaluation.updated_at,
        })
    }
}

/// Evaluation as read back, with the evaluated employee and the evaluator
/// resolved. A reference whose record is gone serializes as `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDetail {
    pub id: String,
    #[serde(rename = "employeeId")]
    pub employee: Option<EmployeeResponse>,
    #[serde(rename = "evaluatorId")]
    pub evaluator: Option<UserResponse>,
    pub period: String,
    pub status: EvaluationStatus,
    pub questions: Vec<EvaluationQuestion>,
    pub score: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl EvaluationDetail {
    pub fn new(
        evaluation: Evaluation,
        employee: Option<EmployeeResponse>,
        evaluator: Option<UserResponse>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            questions: evaluation.entries()?,
            status: evaluation.status_enum(),
            id: evaluation.id,
            employee,
            evaluator,
            period: evaluation.period,
            score: evaluation.score,
            created_at: evaluation.created_at,
            updated_at: evaluation.updated_at,
        })
    }
}

/// Body for creating or replacing an evaluation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub evaluator_id: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub questions: Vec<EvaluationQuestion>,
}

impl EvaluationRequest {
    /// Lowercase every referenced id so lookups match the stored form
    pub fn normalize_ids(&mut self) {
        self.employee_id.make_ascii_lowercase();
        self.evaluator_id.make_ascii_lowercase();
        for entry in &mut self.questions {
            entry.question_id.make_ascii_lowercase();
        }
    }
}
