//! Input validation for API requests.
//!
//! Each `validate_*` function checks one field and returns a human-readable
//! message on failure. Handlers collect them with `ValidationErrorBuilder` so
//! a single 422 response reports every bad field at once.

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ApiError, ValidationErrorBuilder};
use crate::db::{EmployeeRequest, EvaluationRequest, QuestionRequest, Role};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_QUESTION_OPTIONS: usize = 2;

lazy_static! {
    /// Record identifiers: 24 lowercase or uppercase hex characters
    static ref OBJECT_ID_REGEX: Regex = Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();

    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$"
    ).unwrap();
}

/// Validate a record identifier
pub fn validate_object_id(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if !OBJECT_ID_REGEX.is_match(id) {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

/// Check a path identifier, failing the request with a 422. Ids are stored
/// lowercase, so the accepted id comes back lowercased for lookups.
pub fn require_object_id(id: &str) -> Result<String, ApiError> {
    validate_object_id(id, "id").map_err(|e| ApiError::validation_field("id", e))?;
    Ok(id.to_ascii_lowercase())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err("Please provide a valid email".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// Validate a field that must contain non-whitespace text
pub fn validate_required(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }
    Ok(())
}

/// Accepts a calendar date (`2023-01-15`) or an RFC 3339 datetime
pub fn validate_iso_date(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Hire date is required".to_string());
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
    {
        return Ok(());
    }

    Err("Hire date must be a valid ISO 8601 date".to_string())
}

/// Roles that may be self-registered as users
pub fn validate_user_role(role: &str) -> Result<Role, String> {
    match role.parse::<Role>() {
        Ok(role @ (Role::Admin | Role::Manager)) => Ok(role),
        _ => Err("Role must be either admin or manager".to_string()),
    }
}

pub fn validate_registration(email: &str, password: &str, role: &str) -> Result<Role, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("email", validate_email(email));
    errors.check("password", validate_password(password));
    let role = validate_user_role(role);
    if let Err(message) = &role {
        errors.add("role", message.clone());
    }
    errors.finish()?;

    role.map_err(|e| ApiError::validation_field("role", e))
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("email", validate_email(email));
    errors.check("password", validate_required(password, "Password"));
    errors.finish()
}

pub fn validate_employee_request(req: &EmployeeRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("email", validate_email(&req.email));
    errors.check("password", validate_password(&req.password));

    if let Some(role) = &req.role {
        if role.parse::<Role>() != Ok(Role::Employee) {
            errors.add("role", "Role must be employee");
        }
    }

    errors.check("firstName", validate_required(&req.first_name, "First name"));
    errors.check("lastName", validate_required(&req.last_name, "Last name"));
    errors.check("position", validate_required(&req.position, "Position"));
    errors.check("department", validate_required(&req.department, "Department"));
    errors.check("hireDate", validate_iso_date(&req.hire_date));

    if let Some(manager_id) = &req.manager_id {
        errors.check("managerId", validate_object_id(manager_id, "manager ID"));
    }

    errors.finish()
}

pub fn validate_question_request(req: &QuestionRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("text", validate_required(&req.text, "Question text"));

    if req.options.len() < MIN_QUESTION_OPTIONS {
        errors.add(
            "options",
            format!("At least {} options are required", MIN_QUESTION_OPTIONS),
        );
    } else if req.options.iter().any(|o| o.trim().is_empty()) {
        errors.add("options", "Options cannot be empty");
    }

    if req.correct_answer < 0 || req.correct_answer as usize >= req.options.len() {
        errors.add(
            "correctAnswer",
            "Correct answer must be the index of one of the options",
        );
    }

    errors.check("category", validate_required(&req.category, "Category"));
    errors.finish()
}

pub fn validate_evaluation_request(req: &EvaluationRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors.check("employeeId", validate_object_id(&req.employee_id, "employee ID"));
    errors.check("evaluatorId", validate_object_id(&req.evaluator_id, "evaluator ID"));
    errors.check("period", validate_required(&req.period, "Period"));

    if req.questions.is_empty() {
        errors.add("questions", "At least one question is required");
    }

    for (i, entry) in req.questions.iter().enumerate() {
        errors.check(
            &format!("questions[{}].questionId", i),
            validate_object_id(&entry.question_id, "question ID"),
        );
        if entry.answer.is_some_and(|a| a < 0) {
            errors.add(
                format!("questions[{}].answer", i),
                "Answer must be a non-negative option index",
            );
        }
    }

    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::EvaluationQuestion;

    fn employee_request() -> EmployeeRequest {
        EmployeeRequest {
            email: "john@example.com".to_string(),
            password: "password123".to_string(),
            role: None,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            position: "Developer".to_string(),
            department: "IT".to_string(),
            hire_date: "2023-01-15".to_string(),
            manager_id: None,
        }
    }

    fn question_request() -> QuestionRequest {
        QuestionRequest {
            text: "How well does the employee communicate?".to_string(),
            options: vec!["Poor".into(), "Fair".into(), "Good".into(), "Excellent".into()],
            correct_answer: 3,
            category: "Communication".to_string(),
        }
    }

    #[test]
    fn test_validate_object_id() {
        assert!(validate_object_id("507f1f77bcf86cd799439011", "id").is_ok());
        assert!(validate_object_id("507F1F77BCF86CD799439011", "id").is_ok());
        assert!(validate_object_id("", "id").is_err());
        assert!(validate_object_id("507f1f77bcf86cd79943901", "id").is_err());
        assert!(validate_object_id("507f1f77bcf86cd79943901z", "id").is_err());
        assert!(validate_object_id("not-an-id", "id").is_err());
    }

    #[test]
    fn test_require_object_id_lowercases() {
        assert_eq!(
            require_object_id("507F1F77BCF86CD799439011").unwrap(),
            "507f1f77bcf86cd799439011"
        );
        assert!(require_object_id("not-an-id").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("admin@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_iso_date() {
        assert!(validate_iso_date("2023-01-15").is_ok());
        assert!(validate_iso_date("2023-01-15T09:30:00Z").is_ok());
        assert!(validate_iso_date("2023-01-15T09:30:00+02:00").is_ok());
        assert!(validate_iso_date("2023-02-30").is_err());
        assert!(validate_iso_date("15/01/2023").is_err());
        assert!(validate_iso_date("").is_err());
    }

    #[test]
    fn test_validate_user_role() {
        assert_eq!(validate_user_role("admin"), Ok(Role::Admin));
        assert_eq!(validate_user_role("manager"), Ok(Role::Manager));
        assert!(validate_user_role("employee").is_err());
        assert!(validate_user_role("").is_err());
    }

    #[test]
    fn test_validate_registration_collects_fields() {
        let err = validate_registration("bad", "123", "owner").unwrap_err();
        assert!(err.message().contains("3 fields"));
        assert_eq!(
            validate_registration("admin@example.com", "secret1", "admin").unwrap(),
            Role::Admin
        );
    }

    #[test]
    fn test_validate_employee_request() {
        assert!(validate_employee_request(&employee_request()).is_ok());

        let mut req = employee_request();
        req.role = Some("employee".to_string());
        req.manager_id = Some("507f1f77bcf86cd799439011".to_string());
        req.hire_date = "2023-01-15T00:00:00.000Z".to_string();
        assert!(validate_employee_request(&req).is_ok());

        let mut req = employee_request();
        req.role = Some("manager".to_string());
        assert!(validate_employee_request(&req).is_err());

        let mut req = employee_request();
        req.manager_id = Some("boss".to_string());
        assert!(validate_employee_request(&req).is_err());

        let mut req = employee_request();
        req.department = "   ".to_string();
        assert!(validate_employee_request(&req).is_err());
    }

    #[test]
    fn test_validate_question_request() {
        assert!(validate_question_request(&question_request()).is_ok());

        let mut req = question_request();
        req.options.truncate(1);
        req.correct_answer = 0;
        assert!(validate_question_request(&req).is_err());

        let mut req = question_request();
        req.correct_answer = 4;
        assert!(validate_question_request(&req).is_err());

        let mut req = question_request();
        req.correct_answer = -1;
        assert!(validate_question_request(&req).is_err());

        let mut req = question_request();
        req.category = String::new();
        assert!(validate_question_request(&req).is_err());
    }

    #[test]
    fn test_validate_evaluation_request() {
        let valid = EvaluationRequest {
            employee_id: "507f1f77bcf86cd799439011".to_string(),
            evaluator_id: "507f1f77bcf86cd799439012".to_string(),
            period: "2023 Q2".to_string(),
            questions: vec![
                EvaluationQuestion {
                    question_id: "507f1f77bcf86cd799439013".to_string(),
                    answer: Some(2),
                },
                EvaluationQuestion {
                    question_id: "507f1f77bcf86cd799439014".to_string(),
                    answer: None,
                },
            ],
        };
        assert!(validate_evaluation_request(&valid).is_ok());

        let mut req = valid.clone();
        req.questions.clear();
        assert!(validate_evaluation_request(&req).is_err());

        let mut req = valid.clone();
        req.questions[0].answer = Some(-1);
        assert!(validate_evaluation_request(&req).is_err());

        let mut req = valid.clone();
        req.questions[1].question_id = "q1".to_string();
        assert!(validate_evaluation_request(&req).is_err());

        let mut req = valid;
        req.employee_id = String::new();
        assert!(validate_evaluation_request(&req).is_err());
    }
}
