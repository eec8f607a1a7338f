/// Agent model and database operations
///
/// An agent row links a user account (role `agent`) to one organisation.
/// Reads join the account so callers get the profile fields in one record.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE agents (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     organisation_id UUID NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UpdateProfile;

/// Agent record joined with its account profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agent {
    pub id: Uuid,

    /// Backing user account
    pub user_id: Uuid,

    /// Organisation this agent works in
    pub organisation_id: Uuid,

    pub email: String,

    pub username: String,

    pub first_name: String,

    pub last_name: String,

    pub created_at: DateTime<Utc>,
}

/// Agent profile form, used both to invite and to edit an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AgentInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
}

impl AgentInput {
    /// Account fields this form writes
    pub fn profile(&self) -> UpdateProfile {
        UpdateProfile {
            email: self.email.trim().to_lowercase(),
            username: self.username.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }
}

const AGENT_SELECT: &str = r#"
    SELECT a.id, a.user_id, a.organisation_id, u.email, u.username,
           u.first_name, u.last_name, a.created_at
    FROM agents a
    JOIN users u ON u.id = a.user_id
"#;

impl Agent {
    /// Inserts the agent row for an already created account
    pub async fn create(
        conn: &mut PgConnection,
        user_id: Uuid,
        organisation_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO agents (user_id, organisation_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(organisation_id)
        .fetch_one(&mut *conn)
        .await?;

        let query = format!("{} WHERE a.id = $1", AGENT_SELECT);
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Lists agents of an organisation, oldest first
    pub async fn list_by_organisation(
        pool: &PgPool,
        organisation_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "{} WHERE a.organisation_id = $1 ORDER BY a.created_at, a.id",
            AGENT_SELECT
        );

        sqlx::query_as::<_, Agent>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    /// Finds an agent by id within an organisation
    ///
    /// An agent of another organisation is reported as absent.
    pub async fn find_in_organisation(
        pool: &PgPool,
        organisation_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "{} WHERE a.organisation_id = $1 AND a.id = $2",
            AGENT_SELECT
        );

        sqlx::query_as::<_, Agent>(&query)
            .bind(organisation_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds the agent record of an account
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{} WHERE a.user_id = $1", AGENT_SELECT);

        sqlx::query_as::<_, Agent>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{} WHERE a.id = $1", AGENT_SELECT);

        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
