use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use zaiko_core::User;

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisteredResponse {
    id: i64,
    email: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredResponse>), AppError> {
    validate_registration(&req)?;

    let password_hash = hash_password(&req.password)?;
    let user = state.users.insert(req.email.trim(), &password_hash).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // An unknown email and a wrong password answer identically.
    let invalid = || AppError::Authentication("invalid email or password".to_string());

    let user = state
        .users
        .find_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&user.password_hash, &req.password)? {
        return Err(invalid());
    }

    let token = issue_token(&user, &state)?;
    Ok(Json(AuthResponse { token }))
}

fn issue_token(user: &User, state: &AppState) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Anyhow(anyhow::anyhow!("Token encoding failed: {}", e)))
}

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let mut fields = BTreeMap::new();
    if !is_valid_email(req.email.trim()) {
        fields.insert("email", "must be a valid email address".to_string());
    }
    if req.password.is_empty() {
        fields.insert("password", "must not be empty".to_string());
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(fields))
    }
}

/// Local-part @ domain, both non-empty, exactly one separator. Anything
/// stricter belongs to a confirmation mail, not a regex.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !domain.starts_with('.')
        }
        _ => false,
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!("Password hashing failed: {}", e)))
}

fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!("Invalid stored password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(provided.as_bytes(), &parsed)
        .is_ok())
}
