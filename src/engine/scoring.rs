//! Scoring of submitted evaluations.

use tracing::info;

use crate::db::{DbPool, Evaluation, EvaluationQuestion, EvaluationResponse, Question};

use super::EngineError;

/// An entry counts only when an answer was given and it equals the correct index
pub fn is_correct(entry: &EvaluationQuestion, question: &Question) -> bool {
    entry.answer == Some(question.correct_answer)
}

/// Percentage of correct outcomes. An evaluation without questions scores 0.
pub fn calculate_score<I>(outcomes: I) -> f64
where
    I: IntoIterator<Item = bool>,
{
    let (correct, total) = outcomes
        .into_iter()
        .fold((0usize, 0usize), |(correct, total), ok| {
            (correct + usize::from(ok), total + 1)
        });

    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Score an evaluation against the current question set and mark it completed.
///
/// Every referenced question must still exist; the evaluation row is only
/// written once all of them have been resolved. Submitting an evaluation that
/// is already completed recomputes and overwrites its score.
pub async fn submit_evaluation(db: &DbPool, id: &str) -> Result<EvaluationResponse, EngineError> {
    let evaluation = Evaluation::find_by_id(db, id)
        .await?
        .ok_or(EngineError::NotFound("Evaluation"))?;

    let entries = evaluation
        .entries()
        .map_err(|e| EngineError::corrupt("evaluation", id, e))?;

    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in &entries {
        let question = Question::find_by_id(db, &entry.question_id)
            .await?
            .ok_or(EngineError::NotFound("Question"))?;
        outcomes.push(is_correct(entry, &question));
    }

    let score = calculate_score(outcomes);

    if !Evaluation::record_score(db, id, score).await? {
        // Deleted between the read and the write
        return Err(EngineError::NotFound("Evaluation"));
    }

    info!(
        evaluation_id = %id,
        employee_id = %evaluation.employee_id,
        questions = entries.len(),
        score,
        "Evaluation submitted"
    );

    let evaluation = Evaluation::find_by_id(db, id)
        .await?
        .ok_or(EngineError::NotFound("Evaluation"))?;

    EvaluationResponse::try_from(evaluation).map_err(|e| EngineError::corrupt("evaluation", id, e))
}
