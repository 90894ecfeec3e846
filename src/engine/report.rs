//! Employee and department reports over completed evaluations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::db::{DbPool, Employee, Evaluation, Question};

use super::{mean, EngineError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: String,
    pub name: String,
    pub position: String,
    pub department: String,
}

/// A question as answered in one evaluation, next to the expected answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub text: String,
    pub answer: Option<i64>,
    pub correct_answer: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub id: String,
    pub period: String,
    pub score: f64,
    pub questions: Vec<AnsweredQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeReport {
    pub employee: EmployeeSummary,
    pub evaluations: Vec<EvaluationSummary>,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentReport {
    pub department: String,
    pub employee_count: usize,
    pub average_department_score: f64,
    /// Scores of each employee with completed evaluations, keyed by employee id
    pub employee_scores: BTreeMap<String, Vec<f64>>,
}

/// Mean of per-employee means, so employees with many evaluations do not
/// outweigh the rest. Zero when nobody has a score.
pub fn average_department_score(employee_scores: &BTreeMap<String, Vec<f64>>) -> f64 {
    let averages: Vec<f64> = employee_scores
        .values()
        .filter(|scores| !scores.is_empty())
        .map(|scores| mean(scores))
        .collect();
    mean(&averages)
}

/// Group evaluation scores by employee, preserving evaluation order
pub fn group_scores(evaluations: &[Evaluation]) -> BTreeMap<String, Vec<f64>> {
    let mut employee_scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for evaluation in evaluations {
        employee_scores
            .entry(evaluation.employee_id.clone())
            .or_default()
            .push(evaluation.score);
    }
    employee_scores
}

/// Build the report for one employee from their completed evaluations.
pub async fn generate_employee_report(
    db: &DbPool,
    employee_id: &str,
) -> Result<EmployeeReport, EngineError> {
    let employee = Employee::find_by_id(db, employee_id)
        .await?
        .ok_or(EngineError::NotFound("Employee"))?;

    let evaluations = Evaluation::list_completed_for_employee(db, employee_id).await?;

    // Questions are usually shared across evaluations
    let mut questions: HashMap<String, Question> = HashMap::new();
    let mut summaries = Vec::with_capacity(evaluations.len());

    for evaluation in &evaluations {
        let entries = evaluation
            .entries()
            .map_err(|e| EngineError::corrupt("evaluation", &evaluation.id, e))?;

        let mut answered = Vec::with_capacity(entries.len());
        for entry in entries {
            if !questions.contains_key(&entry.question_id) {
                let question = Question::find_by_id(db, &entry.question_id)
                    .await?
                    .ok_or(EngineError::NotFound("Question"))?;
                questions.insert(entry.question_id.clone(), question);
            }
            let question = &questions[&entry.question_id];

            answered.push(AnsweredQuestion {
                text: question.text.clone(),
                answer: entry.answer,
                correct_answer: question.correct_answer,
            });
        }

        summaries.push(EvaluationSummary {
            id: evaluation.id.clone(),
            period: evaluation.period.clone(),
            score: evaluation.score,
            questions: answered,
        });
    }

    let scores: Vec<f64> = evaluations.iter().map(|e| e.score).collect();

    Ok(EmployeeReport {
        employee: EmployeeSummary {
            name: employee.full_name(),
            id: employee.id,
            position: employee.position,
            department: employee.department,
        },
        evaluations: summaries,
        average_score: mean(&scores),
    })
}

/// Build the report for a department. An unknown department yields an empty report.
pub async fn generate_department_report(
    db: &DbPool,
    department: &str,
) -> Result<DepartmentReport, EngineError> {
    let employees = Employee::list_by_department(db, department).await?;
    let evaluations = Evaluation::list_completed_for_department(db, department).await?;

    let employee_scores = group_scores(&evaluations);

    Ok(DepartmentReport {
        department: department.to_string(),
        employee_count: employees.len(),
        average_department_score: average_department_score(&employee_scores),
        employee_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{fixtures, submit_evaluation};

    fn scores(entries: Vec<(&str, Vec<f64>)>) -> BTreeMap<String, Vec<f64>> {
        entries
            .into_iter()
            .map(|(id, s)| (id.to_string(), s))
            .collect()
    }

    #[test]
    fn test_mean_of_means_differs_from_pooled_mean() {
        let map = scores(vec![("a", vec![100.0]), ("b", vec![0.0, 0.0])]);
        assert_eq!(average_department_score(&map), 50.0);
    }

    #[test]
    fn test_department_average_empty() {
        assert_eq!(average_department_score(&BTreeMap::new()), 0.0);
        assert_eq!(average_department_score(&scores(vec![("a", vec![])])), 0.0);
    }

    #[tokio::test]
    async fn test_employee_report() {
        let db = crate::db::test_pool().await;
        let employee = fixtures::employee(&db, "john@example.com", "IT").await;
        let question = fixtures::question(&db, 2).await;

        let right =
            fixtures::evaluation(&db, &employee.id, &[(question.id.as_str(), Some(2))]).await;
        let wrong =
            fixtures::evaluation(&db, &employee.id, &[(question.id.as_str(), Some(0))]).await;
        // Still pending, so left out of the report
        fixtures::evaluation(&db, &employee.id, &[(question.id.as_str(), Some(2))]).await;

        submit_evaluation(&db, &right.id).await.unwrap();
        submit_evaluation(&db, &wrong.id).await.unwrap();

        let report = generate_employee_report(&db, &employee.id).await.unwrap();
        assert_eq!(report.employee.id, employee.id);
        assert_eq!(report.employee.name, "John Doe");
        assert_eq!(report.employee.department, "IT");
        assert_eq!(report.evaluations.len(), 2);
        assert_eq!(report.evaluations[0].id, right.id);
        assert_eq!(report.evaluations[0].score, 100.0);
        assert_eq!(report.evaluations[1].questions[0].answer, Some(0));
        assert_eq!(report.evaluations[1].questions[0].correct_answer, 2);
        assert_eq!(report.evaluations[1].questions[0].text, question.text);
        assert_eq!(report.average_score, 50.0);
    }

    #[tokio::test]
    async fn test_employee_report_without_evaluations() {
        let db = crate::db::test_pool().await;
        let employee = fixtures::employee(&db, "john@example.com", "IT").await;

        let report = generate_employee_report(&db, &employee.id).await.unwrap();
        assert!(report.evaluations.is_empty());
        assert_eq!(report.average_score, 0.0);
    }

    #[tokio::test]
    async fn test_employee_report_unknown_employee() {
        let db = crate::db::test_pool().await;
        let err = generate_employee_report(&db, &crate::db::new_id())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound("Employee")));
    }

    #[tokio::test]
    async fn test_employee_report_dangling_question() {
        let db = crate::db::test_pool().await;
        let employee = fixtures::employee(&db, "john@example.com", "IT").await;
        let question = fixtures::question(&db, 1).await;
        let evaluation =
            fixtures::evaluation(&db, &employee.id, &[(question.id.as_str(), Some(1))]).await;
        submit_evaluation(&db, &evaluation.id).await.unwrap();
        Question::delete(&db, &question.id).await.unwrap();

        let err = generate_employee_report(&db, &employee.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound("Question")));
    }

    #[tokio::test]
    async fn test_department_report() {
        let db = crate::db::test_pool().await;
        let a = fixtures::employee(&db, "a@example.com", "IT").await;
        let b = fixtures::employee(&db, "b@example.com", "IT").await;
        let idle = fixtures::employee(&db, "c@example.com", "IT").await;
        let other = fixtures::employee(&db, "d@example.com", "HR").await;

        fixtures::completed(&db, &a.id, 100.0).await;
        fixtures::completed(&db, &b.id, 0.0).await;
        fixtures::completed(&db, &b.id, 0.0).await;
        fixtures::completed(&db, &other.id, 80.0).await;
        fixtures::evaluation(&db, &idle.id, &[]).await;

        let report = generate_department_report(&db, "IT").await.unwrap();
        assert_eq!(report.department, "IT");
        assert_eq!(report.employee_count, 3);
        assert_eq!(report.average_department_score, 50.0);
        assert_eq!(report.employee_scores.len(), 2);
        assert_eq!(report.employee_scores[&a.id], vec![100.0]);
        assert_eq!(report.employee_scores[&b.id], vec![0.0, 0.0]);
        assert!(!report.employee_scores.contains_key(&idle.id));
    }

    #[tokio::test]
    async fn test_unknown_department_is_empty() {
        let db = crate::db::test_pool().await;

        let report = generate_department_report(&db, "Nowhere").await.unwrap();
        assert_eq!(report.employee_count, 0);
        assert_eq!(report.average_department_score, 0.0);
        assert!(report.employee_scores.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "department": "Nowhere",
                "employeeCount": 0,
                "averageDepartmentScore": 0.0,
                "employeeScores": {}
            })
        );
    }
}
