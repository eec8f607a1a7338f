/// Storage abstraction
///
/// Services talk to a [`CrmStore`] instead of a pool directly so the same
/// rules run against PostgreSQL in production ([`PgStore`]) and an
/// in-process store in tests and demos ([`MemoryStore`]).
///
/// Every read takes the filter built by [`crate::access::scope`]; a store
/// never decides visibility on its own. Writes by id assume the caller has
/// already authorized the target.
///
/// Compound writes (organisor signup, agent creation) are atomic: either
/// every row exists afterwards or none does.

use async_trait::async_trait;
use uuid::Uuid;

use crate::access::scope::{AgentFilter, CategoryFilter, LeadFilter};
use crate::identity::Principal;
use crate::models::{
    agent::Agent,
    category::Category,
    lead::{Lead, LeadInput},
    organisation::Organisation,
    user::{CreateUser, UpdateProfile, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(conflict_message(db_err.constraint()));
            }
        }
        StoreError::Database(err)
    }
}

/// Human-readable message for a violated unique constraint
pub(crate) fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(name) if name.contains("email") => "Email is already registered".to_string(),
        Some(name) if name.contains("username") => "Username is already taken".to_string(),
        Some(name) => format!("Constraint violation: {}", name),
        None => "Record already exists".to_string(),
    }
}

#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Creates an organisor account, its organisation and the default
    /// categories in one atomic step
    async fn create_organisor(
        &self,
        account: CreateUser,
        organisation_name: &str,
    ) -> StoreResult<(User, Organisation)>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Builds the principal for an account
    ///
    /// `None` when the account is gone or its organisation/agent record is
    /// missing.
    async fn resolve_principal(&self, user_id: Uuid) -> StoreResult<Option<Principal>>;

    async fn list_agents(&self, filter: &AgentFilter) -> StoreResult<Vec<Agent>>;

    async fn find_agent(&self, filter: &AgentFilter, id: Uuid) -> StoreResult<Option<Agent>>;

    /// Creates an agent account and its agent record in one atomic step
    async fn create_agent(&self, organisation_id: Uuid, account: CreateUser)
        -> StoreResult<Agent>;

    /// Rewrites the account profile behind an agent
    async fn update_agent(&self, agent: &Agent, profile: &UpdateProfile)
        -> StoreResult<Option<Agent>>;

    /// Deletes an agent together with its account
    ///
    /// Leads assigned to the agent become unassigned.
    async fn delete_agent(&self, agent: &Agent) -> StoreResult<bool>;

    async fn list_leads(&self, filter: &LeadFilter) -> StoreResult<Vec<Lead>>;

    async fn find_lead(&self, filter: &LeadFilter, id: Uuid) -> StoreResult<Option<Lead>>;

    async fn create_lead(&self, organisation_id: Uuid, input: &LeadInput) -> StoreResult<Lead>;

    async fn update_lead(&self, id: Uuid, input: &LeadInput) -> StoreResult<Option<Lead>>;

    async fn set_lead_agent(&self, id: Uuid, agent_id: Uuid) -> StoreResult<Option<Lead>>;

    async fn set_lead_category(
        &self,
        id: Uuid,
        category_id: Option<Uuid>,
    ) -> StoreResult<Option<Lead>>;

    async fn delete_lead(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<Category>>;

    async fn find_category(
        &self,
        filter: &CategoryFilter,
        id: Uuid,
    ) -> StoreResult<Option<Category>>;

    /// Lead counts per category for an organisation (`None` = uncategorised)
    async fn lead_counts_by_category(
        &self,
        organisation_id: Uuid,
    ) -> StoreResult<Vec<(Option<Uuid>, i64)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages() {
        assert_eq!(
            conflict_message(Some("users_email_lower_idx")),
            "Email is already registered"
        );
        assert_eq!(
            conflict_message(Some("users_username_key")),
            "Username is already taken"
        );
        assert_eq!(
            conflict_message(Some("categories_organisation_id_name_key")),
            "Constraint violation: categories_organisation_id_name_key"
        );
        assert_eq!(conflict_message(None), "Record already exists");
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
