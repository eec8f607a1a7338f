/// Organisation model and database operations
///
/// An organisation is created together with its organisor's account at
/// signup and owns every agent, lead and category beneath it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE organisations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organisation {
    pub id: Uuid,

    /// Organisor account that owns this organisation
    pub owner_id: Uuid,

    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl Organisation {
    /// Inserts an organisation owned by `owner_id`
    pub async fn create(
        conn: &mut PgConnection,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Organisation>(
            r#"
            INSERT INTO organisations (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(conn)
        .await
    }

    /// Finds the organisation owned by an organisor account
    pub async fn find_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organisation>(
            "SELECT id, owner_id, name, created_at FROM organisations WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }
}
