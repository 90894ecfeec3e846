//! User models and the role set shared by every principal.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Roles a principal may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Whether this role is one of `required`
    pub fn allowed(&self, required: &[Role]) -> bool {
        required.contains(self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Parsed role. Rows written by this service always hold a known value;
    /// anything else gets the least privileged role.
    pub fn role_enum(&self) -> Role {
        self.role.parse().unwrap_or(Role::Employee)
    }

    pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users ORDER BY created_at ASC, rowid ASC")
            .fetch_all(db)
            .await
    }

    pub async fn create(
        db: &SqlitePool,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        let id = crate::db::new_id();
        let now = crate::db::now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(&id)
            .fetch_one(db)
            .await
    }
}

/// User as returned by the API, without credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Manager ".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("EMPLOYEE".parse::<Role>().unwrap(), Role::Employee);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::Manager.to_string(), "manager");
    }

    #[test]
    fn test_role_allowed() {
        let staff = [Role::Admin, Role::Manager];
        assert!(Role::Admin.allowed(&staff));
        assert!(Role::Manager.allowed(&staff));
        assert!(!Role::Employee.allowed(&staff));

        assert!(Role::Admin.allowed(&[Role::Admin]));
        assert!(!Role::Manager.allowed(&[Role::Admin]));
        assert!(!Role::Admin.allowed(&[]));
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = crate::db::test_pool().await;

        let user = User::create(&db, "admin@example.com", "hash", Role::Admin)
            .await
            .unwrap();
        assert_eq!(user.id.len(), 24);
        assert_eq!(user.role_enum(), Role::Admin);

        let by_email = User::find_by_email(&db, "admin@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);
        assert!(User::find_by_id(&db, &crate::db::new_id()).await.unwrap().is_none());

        let duplicate = User::create(&db, "admin@example.com", "hash", Role::Manager).await;
        assert!(duplicate.is_err());
    }
}
