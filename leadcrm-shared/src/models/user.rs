/// User account model and database operations
///
/// Accounts back both organisors and agents. The `role` column is the only
/// source of truth for which one an account is.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE account_role AS ENUM ('organisor', 'agent');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(254) NOT NULL,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     first_name VARCHAR(150) NOT NULL DEFAULT '',
///     last_name VARCHAR(150) NOT NULL DEFAULT '',
///     password_hash VARCHAR(255) NOT NULL,
///     role account_role NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE UNIQUE INDEX users_email_lower_idx ON users (LOWER(email));
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::identity::AccountRole;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Email address (case-insensitive, unique)
    pub email: String,

    /// Login name (unique)
    pub username: String,

    pub first_name: String,

    pub last_name: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: AccountRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_organisor(&self) -> bool {
        self.role.is_organisor()
    }

    pub fn is_agent(&self) -> bool {
        self.role.is_agent()
    }
}

/// Input for creating a new account
///
/// The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: AccountRole,
}

/// Profile fields an organisor may edit on an agent's account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProfile {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, role, created_at, updated_at";

impl User {
    /// Inserts a new account
    ///
    /// Takes a connection so it can run inside the signup and agent
    /// invitation transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the email or username is already taken
    pub async fn create(conn: &mut PgConnection, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.username)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.password_hash)
            .bind(data.role)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an account by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Replaces the profile fields of an account
    ///
    /// Returns false if the account doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateProfile,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, first_name = $4, last_name = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an account
    ///
    /// Cascades to the agent record; leads of a deleted agent become
    /// unassigned (`ON DELETE SET NULL`).
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: AccountRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            username: "jane".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_flags() {
        let organisor = user(AccountRole::Organisor);
        assert!(organisor.is_organisor());
        assert!(!organisor.is_agent());

        let agent = user(AccountRole::Agent);
        assert!(agent.is_agent());
        assert!(!agent.is_organisor());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user(AccountRole::Agent)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "agent");
    }
}
