//! Authentication: password hashing, bearer tokens and role checks.
//!
//! Users and employees both sign in with email and password and receive a
//! signed token. `auth_middleware` resolves the token to a `Principal` stored
//! in the request extensions; the `require_*` layers then gate routes by role.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::ApiError;
use super::validation::{validate_login, validate_registration};
use crate::config::{AuthConfig, DEFAULT_TOKEN_TTL_HOURS};
use crate::db::{
    DbPool, Employee, LoginRequest, LoginResponse, RegisterRequest, Role, User, UserResponse,
};
use crate::AppState;

pub const NOT_LOGGED_IN: &str = "You are not logged in";
pub const NO_PERMISSION: &str = "You do not have permission to perform this action";

/// Roles allowed to manage employees, evaluations and reports
pub const STAFF: &[Role] = &[Role::Admin, Role::Manager];
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub(crate) fn hash_or_internal(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to hash password")
    })
}

/// Which table a token subject lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Employee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub kind: PrincipalKind,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys for access tokens
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Keys for a loaded config. `Config::load` rejects an unusable TTL, so
    /// the fallback only applies to configs built in code.
    pub fn from_config(config: &AuthConfig) -> Self {
        let ttl = config
            .token_ttl()
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS));
        Self::new(config.jwt_secret.as_bytes(), ttl)
    }

    pub fn issue(&self, sub: &str, kind: PrincipalKind) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub kind: PrincipalKind,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            role: user.role_enum(),
            id: user.id,
            email: user.email,
            kind: PrincipalKind::User,
        }
    }
}

impl From<Employee> for Principal {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            email: employee.email,
            role: Role::Employee,
            kind: PrincipalKind::Employee,
        }
    }
}

/// Look up the subject of verified claims. `None` if it no longer exists.
pub async fn resolve_principal(db: &DbPool, claims: &Claims) -> Result<Option<Principal>, sqlx::Error> {
    let principal = match claims.kind {
        PrincipalKind::User => User::find_by_id(db, &claims.sub).await?.map(Principal::from),
        PrincipalKind::Employee => Employee::find_by_id(db, &claims.sub)
            .await?
            .map(Principal::from),
    };
    Ok(principal)
}

/// Extract the bearer token from request headers
fn extract_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Auth middleware that validates tokens and attaches the caller
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).ok_or_else(|| ApiError::unauthorized(NOT_LOGGED_IN))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::unauthorized("Invalid or expired token. Please log in again")
    })?;

    let principal = resolve_principal(&state.db, &claims)
        .await?
        .ok_or_else(|| ApiError::unauthorized("The account for this token no longer exists"))?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn require_roles(request: &Request<Body>, required: &[Role]) -> Result<(), ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::unauthorized(NOT_LOGGED_IN))?;

    if principal.role.allowed(required) {
        Ok(())
    } else {
        Err(ApiError::forbidden(NO_PERMISSION))
    }
}

/// Route layer admitting admins only
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    require_roles(&request, ADMIN_ONLY)?;
    Ok(next.run(request).await)
}

/// Route layer admitting admins and managers
pub async fn require_staff(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    require_roles(&request, STAFF)?;
    Ok(next.run(request).await)
}

/// Extractor for the authenticated caller set by `auth_middleware`
#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(NOT_LOGGED_IN))
    }
}

/// Register a new admin or manager account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let role = validate_registration(&req.email, &req.password, &req.role)?;
    let email = req.email.trim().to_lowercase();

    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let password_hash = hash_or_internal(&req.password)?;
    let user = User::create(&state.db, &email, &password_hash, role).await?;

    info!(user_id = %user.id, role = %role, "Registered user");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login endpoint. Users are checked before employees.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_login(&req.email, &req.password)?;
    let email = req.email.trim().to_lowercase();

    let account = match User::find_by_email(&state.db, &email).await? {
        Some(user) => Some((user.password_hash.clone(), Principal::from(user))),
        None => Employee::find_by_email(&state.db, &email)
            .await?
            .map(|employee| (employee.password_hash.clone(), Principal::from(employee))),
    };

    let principal = match account {
        Some((hash, principal)) if verify_password(&req.password, &hash) => principal,
        _ => return Err(ApiError::unauthorized("Incorrect email or password")),
    };

    let token = state.tokens.issue(&principal.id, principal.kind).map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal("Failed to issue token")
    })?;

    info!(
        principal_id = %principal.id,
        email = %principal.email,
        role = %principal.role,
        "Login succeeded"
    );

    Ok(Json(LoginResponse { token }))
}

/// Create the configured bootstrap admin if no user has its email yet
pub async fn ensure_admin_user(db: &DbPool, config: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    let email = email.trim().to_lowercase();

    if User::find_by_email(db, &email).await?.is_some() {
        debug!("Bootstrap admin {} already exists", email);
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    User::create(db, &email, &password_hash, Role::Admin).await?;

    info!("Created bootstrap admin user: {}", email);
    Ok(())
}
