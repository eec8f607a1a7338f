/// Category model and database operations
///
/// Categories are the pipeline stages leads move through. Every
/// organisation gets [`DEFAULT_CATEGORIES`] at signup.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     organisation_id UUID NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
///     name VARCHAR(30) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (organisation_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::lead::Lead;

/// Categories seeded into every new organisation
pub const DEFAULT_CATEGORIES: [&str; 4] = ["New", "Contacted", "Converted", "Unconverted"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,

    pub organisation_id: Uuid,

    /// Display name, unique per organisation
    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// Category with the number of leads filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,

    pub lead_count: i64,
}

/// Category list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryListing {
    pub categories: Vec<CategorySummary>,

    /// Leads of the organisation with no category
    pub uncategorised_lead_count: i64,
}

/// Category detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: Category,

    /// Leads in this category the viewer may see
    pub leads: Vec<Lead>,
}

const CATEGORY_COLUMNS: &str = "id, organisation_id, name, created_at";

impl Category {
    pub async fn create(
        conn: &mut PgConnection,
        organisation_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (organisation_id, name) VALUES ($1, $2) RETURNING {}",
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(organisation_id)
            .bind(name)
            .fetch_one(conn)
            .await
    }

    /// Inserts [`DEFAULT_CATEGORIES`] for a new organisation
    pub async fn seed_defaults(
        conn: &mut PgConnection,
        organisation_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut categories = Vec::with_capacity(DEFAULT_CATEGORIES.len());
        for name in DEFAULT_CATEGORIES {
            categories.push(Self::create(&mut *conn, organisation_id, name).await?);
        }
        Ok(categories)
    }

    /// Lists categories of an organisation by name
    pub async fn list(pool: &PgPool, organisation_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM categories WHERE organisation_id = $1 ORDER BY name, id",
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    /// Finds a category by id within an organisation
    pub async fn find(
        pool: &PgPool,
        organisation_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM categories WHERE organisation_id = $1 AND id = $2",
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(organisation_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_flattens_category() {
        let summary = CategorySummary {
            category: Category {
                id: Uuid::new_v4(),
                organisation_id: Uuid::new_v4(),
                name: "Contacted".to_string(),
                created_at: Utc::now(),
            },
            lead_count: 3,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], "Contacted");
        assert_eq!(json["lead_count"], 3);
    }

    #[test]
    fn test_default_categories_are_distinct() {
        let mut names = DEFAULT_CATEGORIES.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_CATEGORIES.len());
    }
}
