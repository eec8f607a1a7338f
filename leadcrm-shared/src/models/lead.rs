/// Lead model and database operations
///
/// A lead is a sales prospect owned by one organisation. `organisation_id`
/// never changes after insert; `agent_id` and `category_id`, when set,
/// point into the same organisation (enforced by the services, since the
/// foreign keys alone cannot express it).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE leads (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     organisation_id UUID NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
///     agent_id UUID REFERENCES agents(id) ON DELETE SET NULL,
///     category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     age INTEGER,
///     email VARCHAR(254),
///     phone_number VARCHAR(32),
///     description TEXT,
///     source VARCHAR(100),
///     value BIGINT NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use leadcrm_shared::access::scope::LeadFilter;
/// use leadcrm_shared::identity::Principal;
/// use leadcrm_shared::models::lead::Lead;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, principal: Principal) -> Result<(), sqlx::Error> {
/// let unassigned = Lead::list(&pool, &LeadFilter::for_principal(&principal).unassigned()).await?;
/// println!("{} leads waiting for an agent", unassigned.len());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::access::scope::{Assignment, LeadFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,

    /// Owning organisation (immutable)
    pub organisation_id: Uuid,

    /// Assigned agent, if any
    pub agent_id: Option<Uuid>,

    /// Pipeline category, if any
    pub category_id: Option<Uuid>,

    pub first_name: String,

    pub last_name: String,

    pub age: Option<i32>,

    pub email: Option<String>,

    pub phone_number: Option<String>,

    pub description: Option<String>,

    /// Where the lead came from (e.g. "Referral", "Newsletter")
    pub source: Option<String>,

    /// Estimated deal value in minor currency units
    pub value: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Lead form, used both to create and to edit a lead
///
/// Edits replace every core field. `agent_id` and `category_id` must
/// reference records of the lead's organisation; an edit that leaves them
/// out keeps the lead's current agent and category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LeadInput {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[serde(default)]
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 32, message = "Phone number must be at most 32 characters"))]
    pub phone_number: Option<String>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Source must be at most 100 characters"))]
    pub source: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Value cannot be negative"))]
    pub value: i64,

    #[serde(default)]
    pub agent_id: Option<Uuid>,

    #[serde(default)]
    pub category_id: Option<Uuid>,
}

const LEAD_COLUMNS: &str = "id, organisation_id, agent_id, category_id, first_name, last_name, \
    age, email, phone_number, description, source, value, created_at, updated_at";

/// Renders a filter as a WHERE clause plus its bind values, in order
fn where_clause(filter: &LeadFilter) -> (String, Vec<Uuid>) {
    let mut clause = String::from("organisation_id = $1");
    let mut binds = vec![filter.organisation_id];

    if let Some(agent_id) = filter.agent_id {
        binds.push(agent_id);
        clause.push_str(&format!(" AND agent_id = ${}", binds.len()));
    }

    match filter.assignment {
        Assignment::Any => {}
        Assignment::Assigned => clause.push_str(" AND agent_id IS NOT NULL"),
        Assignment::Unassigned => clause.push_str(" AND agent_id IS NULL"),
    }

    if let Some(category_id) = filter.category_id {
        binds.push(category_id);
        clause.push_str(&format!(" AND category_id = ${}", binds.len()));
    }

    (clause, binds)
}

impl Lead {
    /// Inserts a lead into an organisation
    pub async fn create(
        pool: &PgPool,
        organisation_id: Uuid,
        data: &LeadInput,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO leads (organisation_id, agent_id, category_id, first_name, last_name,
                               age, email, phone_number, description, source, value)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&query)
            .bind(organisation_id)
            .bind(data.agent_id)
            .bind(data.category_id)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.age)
            .bind(&data.email)
            .bind(&data.phone_number)
            .bind(&data.description)
            .bind(&data.source)
            .bind(data.value)
            .fetch_one(pool)
            .await
    }

    /// Lists leads passing `filter`, oldest first
    pub async fn list(pool: &PgPool, filter: &LeadFilter) -> Result<Vec<Self>, sqlx::Error> {
        let (clause, binds) = where_clause(filter);
        let query = format!(
            "SELECT {} FROM leads WHERE {} ORDER BY created_at, id",
            LEAD_COLUMNS, clause
        );

        let mut q = sqlx::query_as::<_, Lead>(&query);
        for value in binds {
            q = q.bind(value);
        }

        q.fetch_all(pool).await
    }

    /// Finds a lead by id, only if it passes `filter`
    pub async fn find(
        pool: &PgPool,
        filter: &LeadFilter,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (clause, binds) = where_clause(filter);
        let query = format!(
            "SELECT {} FROM leads WHERE {} AND id = ${}",
            LEAD_COLUMNS,
            clause,
            binds.len() + 1
        );

        let mut q = sqlx::query_as::<_, Lead>(&query);
        for value in binds {
            q = q.bind(value);
        }

        q.bind(id).fetch_optional(pool).await
    }

    /// Replaces the core fields of a lead
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &LeadInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE leads
            SET agent_id = $2, category_id = $3, first_name = $4, last_name = $5, age = $6,
                email = $7, phone_number = $8, description = $9, source = $10, value = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(data.agent_id)
            .bind(data.category_id)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.age)
            .bind(&data.email)
            .bind(&data.phone_number)
            .bind(&data.description)
            .bind(&data.source)
            .bind(data.value)
            .fetch_optional(pool)
            .await
    }

    /// Points a lead at an agent (last write wins)
    pub async fn set_agent(
        pool: &PgPool,
        id: Uuid,
        agent_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE leads SET agent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(agent_id)
            .fetch_optional(pool)
            .await
    }

    /// Moves a lead to a category, or back to uncategorised with `None`
    pub async fn set_category(
        pool: &PgPool,
        id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE leads SET category_id = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .bind(category_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lead counts per category across an organisation
    ///
    /// The `None` bucket counts uncategorised leads.
    pub async fn count_by_category(
        pool: &PgPool,
        organisation_id: Uuid,
    ) -> Result<Vec<(Option<Uuid>, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (Option<Uuid>, i64)>(
            r#"
            SELECT category_id, COUNT(*)
            FROM leads
            WHERE organisation_id = $1
            GROUP BY category_id
            "#,
        )
        .bind(organisation_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_for_organisor() {
        let org = Uuid::new_v4();
        let filter = LeadFilter {
            organisation_id: org,
            agent_id: None,
            assignment: Assignment::Unassigned,
            category_id: None,
        };

        let (clause, binds) = where_clause(&filter);
        assert_eq!(clause, "organisation_id = $1 AND agent_id IS NULL");
        assert_eq!(binds, vec![org]);
    }

    #[test]
    fn test_where_clause_for_agent_in_category() {
        let org = Uuid::new_v4();
        let agent = Uuid::new_v4();
        let category = Uuid::new_v4();
        let filter = LeadFilter {
            organisation_id: org,
            agent_id: Some(agent),
            assignment: Assignment::Any,
            category_id: Some(category),
        };

        let (clause, binds) = where_clause(&filter);
        assert_eq!(
            clause,
            "organisation_id = $1 AND agent_id = $2 AND category_id = $3"
        );
        assert_eq!(binds, vec![org, agent, category]);
    }

    #[test]
    fn test_lead_input_validation() {
        let mut input = LeadInput {
            first_name: "Lee".to_string(),
            last_name: "Prospect".to_string(),
            email: Some("lee@example.com".to_string()),
            ..Default::default()
        };
        assert!(input.validate().is_ok());

        input.age = Some(-1);
        assert!(input.validate().is_err());

        input.age = Some(40);
        input.email = Some("nope".to_string());
        assert!(input.validate().is_err());

        input.email = None;
        input.value = -5;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_lead_input_deserializes_with_defaults() {
        let input: LeadInput =
            serde_json::from_str(r#"{"first_name": "Lee", "last_name": "Prospect"}"#).unwrap();
        assert_eq!(input.value, 0);
        assert!(input.agent_id.is_none());
        assert!(input.category_id.is_none());
    }
}
