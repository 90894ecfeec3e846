//! Evaluation scoring and reporting.
//!
//! Scoring turns a pending evaluation into a completed one with a percentage
//! score. Reporting folds completed evaluations into per-employee and
//! per-department summaries. Neither keeps state between calls: every
//! operation reads from and writes to the pool it is handed.

pub mod report;
pub mod scoring;

pub use report::*;
pub use scoring::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced record does not exist; carries the entity name
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Stored {entity} {id} is unreadable: {source}")]
    CorruptRecord {
        entity: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EngineError {
    fn corrupt(entity: &'static str, id: &str, source: serde_json::Error) -> Self {
        EngineError::CorruptRecord {
            entity,
            id: id.to_string(),
            source,
        }
    }
}

/// Arithmetic mean, zero for an empty set
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::db::{
        DbPool, Employee, EmployeeRecord, Evaluation, EvaluationQuestion, EvaluationRequest,
        Question, QuestionRequest,
    };

    pub async fn employee(db: &DbPool, email: &str, department: &str) -> Employee {
        Employee::create(
            db,
            &EmployeeRecord {
                email,
                password_hash: "hash",
                first_name: "John",
                last_name: "Doe",
                position: "Developer",
                department,
                hire_date: "2023-01-15",
                manager_id: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn question(db: &DbPool, correct_answer: i64) -> Question {
        Question::create(
            db,
            &QuestionRequest {
                text: format!("Question with answer {}", correct_answer),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer,
                category: "General".into(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn evaluation(
        db: &DbPool,
        employee_id: &str,
        answers: &[(&str, Option<i64>)],
    ) -> Evaluation {
        Evaluation::create(
            db,
            &EvaluationRequest {
                employee_id: employee_id.to_string(),
                evaluator_id: crate::db::new_id(),
                period: "2023 Q2".into(),
                questions: answers
                    .iter()
                    .map(|(question_id, answer)| EvaluationQuestion {
                        question_id: question_id.to_string(),
                        answer: *answer,
                    })
                    .collect(),
            },
        )
        .await
        .unwrap()
    }

    /// Store a completed evaluation with a fixed score
    pub async fn completed(db: &DbPool, employee_id: &str, score: f64) -> Evaluation {
        let evaluation = evaluation(db, employee_id, &[]).await;
        Evaluation::record_score(db, &evaluation.id, score).await.unwrap();
        Evaluation::find_by_id(db, &evaluation.id).await.unwrap().unwrap()
    }
}
