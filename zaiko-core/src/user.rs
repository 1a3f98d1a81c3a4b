use chrono::{DateTime, Utc};
use serde::Serialize;

/// Registered account. Only the argon2 hash is ever stored; the hash is
/// kept out of any serialized response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: Option<DateTime<Utc>>,
}
