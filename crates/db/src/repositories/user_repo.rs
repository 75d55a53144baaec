//! Repository for user records.

use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for `users`.
const COLUMNS: &str = "id, username, full_name, role, created_at, updated_at";

/// Provides user provisioning.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, full_name, role) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.full_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }
}
