//! Employee models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department: String,
    pub hire_date: String,
    /// Weak reference to the managing user
    pub manager_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated field values for inserting or replacing an employee
#[derive(Debug, Clone)]
pub struct EmployeeRecord<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub position: &'a str,
    pub department: &'a str,
    pub hire_date: &'a str,
    pub manager_id: Option<&'a str>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_email(
        db: &SqlitePool,
        email: &str,
    ) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM employees WHERE email = ?")
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<Employee>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM employees ORDER BY created_at ASC, rowid ASC")
            .fetch_all(db)
            .await
    }

    pub async fn list_by_department(
        db: &SqlitePool,
        department: &str,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM employees WHERE department = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(department)
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &SqlitePool, record: &EmployeeRecord<'_>) -> Result<Employee, sqlx::Error> {
        let id = crate::db::new_id();
        let now = crate::db::now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, email, password_hash, role, first_name, last_name,
                position, department, hire_date, manager_id, created_at, updated_at
            )
            VALUES (?, ?, ?, 'employee', ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(record.email)
        .bind(record.password_hash)
        .bind(record.first_name)
        .bind(record.last_name)
        .bind(record.position)
        .bind(record.department)
        .bind(record.hire_date)
        .bind(record.manager_id)
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        sqlx::query_as("SELECT * FROM employees WHERE id = ?")
            .bind(&id)
            .fetch_one(db)
            .await
    }

    /// Replace an employee's fields. Returns `None` if the employee does not exist.
    pub async fn update(
        db: &SqlitePool,
        id: &str,
        record: &EmployeeRecord<'_>,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let now = crate::db::now_timestamp();

        let result = sqlx::query(
            r#"
            UPDATE employees SET
                email = ?,
                password_hash = ?,
                first_name = ?,
                last_name = ?,
                position = ?,
                department = ?,
                hire_date = ?,
                manager_id = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.email)
        .bind(record.password_hash)
        .bind(record.first_name)
        .bind(record.last_name)
        .bind(record.position)
        .bind(record.department)
        .bind(record.hire_date)
        .bind(record.manager_id)
        .bind(&now)
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(db, id).await
    }

    /// Delete an employee. Evaluations referencing it are left in place.
    pub async fn delete(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Employee as returned by the API, without credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department: String,
    pub hire_date: String,
    pub manager_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            email: employee.email,
            role: employee.role,
            first_name: employee.first_name,
            last_name: employee.last_name,
            position: employee.position,
            department: employee.department,
            hire_date: employee.hire_date,
            manager_id: employee.manager_id,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

/// Body for creating or replacing an employee
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub hire_date: String,
    pub manager_id: Option<String>,
}
