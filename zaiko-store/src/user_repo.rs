use async_trait::async_trait;
use sqlx::PgPool;

use zaiko_core::{StoreError, User, UserStore};

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict(format!("email already registered: {email}"))
            }
            _ => StoreError::Database(err.to_string()),
        })?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StoreError::Database(err.to_string()))?;

        Ok(row.map(User::from))
    }
}
