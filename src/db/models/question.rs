//! Question models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{parse_json_list, serialize_json_list};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// JSON array of option labels
    pub options: String,
    /// Zero-based index into `options`
    pub correct_answer: i64,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Question {
    pub fn options_list(&self) -> Result<Vec<String>, serde_json::Error> {
        parse_json_list(&self.options)
    }

    pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<Question>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM questions WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<Question>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM questions ORDER BY created_at ASC, rowid ASC")
            .fetch_all(db)
            .await
    }

    pub async fn create(db: &SqlitePool, req: &QuestionRequest) -> Result<Question, sqlx::Error> {
        let id = crate::db::new_id();
        let now = crate::db::now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO questions (id, text, options, correct_answer, category, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(req.text.trim())
        .bind(serialize_json_list(&req.options))
        .bind(req.correct_answer)
        .bind(req.category.trim())
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        sqlx::query_as("SELECT * FROM questions WHERE id = ?")
            .bind(&id)
            .fetch_one(db)
            .await
    }

    /// Replace a question. Returns `None` if the question does not exist.
    pub async fn update(
        db: &SqlitePool,
        id: &str,
        req: &QuestionRequest,
    ) -> Result<Option<Question>, sqlx::Error> {
        let now = crate::db::now_timestamp();

        let result = sqlx::query(
            r#"
            UPDATE questions SET
                text = ?,
                options = ?,
                correct_answer = ?,
                category = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(req.text.trim())
        .bind(serialize_json_list(&req.options))
        .bind(req.correct_answer)
        .bind(req.category.trim())
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(db, id).await
    }

    pub async fn delete(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<Question> for QuestionResponse {
    type Error = serde_json::Error;

    fn try_from(question: Question) -> Result<Self, Self::Error> {
        Ok(Self {
            options: question.options_list()?,
            id: question.id,
            text: question.text,
            correct_answer: question.correct_answer,
            category: question.category,
            created_at: question.created_at,
            updated_at: question.updated_at,
        })
    }
}

/// Body for creating or replacing a question
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default = "missing_index")]
    pub correct_answer: i64,
    #[serde(default)]
    pub category: String,
}

/// Sentinel for an absent `correctAnswer`, rejected by validation
fn missing_index() -> i64 {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(correct_answer: i64) -> QuestionRequest {
        QuestionRequest {
            text: "  How well does the employee communicate?  ".to_string(),
            options: vec!["Poorly".to_string(), "Well".to_string(), "Very well".to_string()],
            correct_answer,
            category: "Communication".to_string(),
        }
    }

    #[tokio::test]
    async fn test_question_roundtrip_through_store() {
        let db = crate::db::test_pool().await;

        let question = Question::create(&db, &request(2)).await.unwrap();
        assert_eq!(question.text, "How well does the employee communicate?");

        let response = QuestionResponse::try_from(question.clone()).unwrap();
        assert_eq!(response.options, vec!["Poorly", "Well", "Very well"]);
        assert_eq!(response.correct_answer, 2);

        let updated = Question::update(&db, &question.id, &request(0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.correct_answer, 0);

        assert!(Question::delete(&db, &question.id).await.unwrap());
        assert!(Question::find_by_id(&db, &question.id).await.unwrap().is_none());
        assert!(Question::update(&db, &question.id, &request(1))
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_correct_answer_defaults_to_sentinel() {
        let req: QuestionRequest =
            serde_json::from_str(r#"{"text":"Q","options":["a","b"],"category":"c"}"#).unwrap();
        assert_eq!(req.correct_answer, -1);
    }
}
