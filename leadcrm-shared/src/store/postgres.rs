/// PostgreSQL store
///
/// Thin mapping of [`CrmStore`] onto the sqlx models. Multi-row writes run
/// inside a transaction.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{CrmStore, StoreResult};
use crate::access::scope::{AgentFilter, CategoryFilter, LeadFilter};
use crate::db::pool::health_check;
use crate::identity::{AccountRole, Principal};
use crate::models::{
    agent::Agent,
    category::Category,
    lead::{Lead, LeadInput},
    organisation::Organisation,
    user::{CreateUser, UpdateProfile, User},
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CrmStore for PgStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_organisor(
        &self,
        account: CreateUser,
        organisation_name: &str,
    ) -> StoreResult<(User, Organisation)> {
        let mut tx = self.pool.begin().await?;

        let user = User::create(&mut *tx, account).await?;
        let organisation = Organisation::create(&mut *tx, user.id, organisation_name).await?;
        let categories = Category::seed_defaults(&mut *tx, organisation.id).await?;

        tx.commit().await?;

        info!(
            user_id = %user.id,
            organisation_id = %organisation.id,
            categories = categories.len(),
            "Organisation created"
        );
        Ok((user, organisation))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn resolve_principal(&self, user_id: Uuid) -> StoreResult<Option<Principal>> {
        let Some(user) = User::find_by_id(&self.pool, user_id).await? else {
            return Ok(None);
        };

        let principal = match user.role {
            AccountRole::Organisor => Organisation::find_by_owner(&self.pool, user.id)
                .await?
                .map(|organisation| Principal::organisor(user.id, organisation.id)),
            AccountRole::Agent => Agent::find_by_user(&self.pool, user.id)
                .await?
                .map(|agent| Principal::agent(user.id, agent.id, agent.organisation_id)),
        };

        if principal.is_none() {
            debug!(user_id = %user.id, role = user.role.as_str(), "Account has no organisation");
        }
        Ok(principal)
    }

    async fn list_agents(&self, filter: &AgentFilter) -> StoreResult<Vec<Agent>> {
        Ok(Agent::list_by_organisation(&self.pool, filter.organisation_id).await?)
    }

    async fn find_agent(&self, filter: &AgentFilter, id: Uuid) -> StoreResult<Option<Agent>> {
        Ok(Agent::find_in_organisation(&self.pool, filter.organisation_id, id).await?)
    }

    async fn create_agent(
        &self,
        organisation_id: Uuid,
        account: CreateUser,
    ) -> StoreResult<Agent> {
        let mut tx = self.pool.begin().await?;

        let user = User::create(&mut *tx, account).await?;
        let agent = Agent::create(&mut *tx, user.id, organisation_id).await?;

        tx.commit().await?;
        Ok(agent)
    }

    async fn update_agent(
        &self,
        agent: &Agent,
        profile: &UpdateProfile,
    ) -> StoreResult<Option<Agent>> {
        if !User::update_profile(&self.pool, agent.user_id, profile).await? {
            return Ok(None);
        }
        Ok(Agent::find_by_id(&self.pool, agent.id).await?)
    }

    async fn delete_agent(&self, agent: &Agent) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, agent.user_id).await?)
    }

    async fn list_leads(&self, filter: &LeadFilter) -> StoreResult<Vec<Lead>> {
        Ok(Lead::list(&self.pool, filter).await?)
    }

    async fn find_lead(&self, filter: &LeadFilter, id: Uuid) -> StoreResult<Option<Lead>> {
        Ok(Lead::find(&self.pool, filter, id).await?)
    }

    async fn create_lead(&self, organisation_id: Uuid, input: &LeadInput) -> StoreResult<Lead> {
        Ok(Lead::create(&self.pool, organisation_id, input).await?)
    }

    async fn update_lead(&self, id: Uuid, input: &LeadInput) -> StoreResult<Option<Lead>> {
        Ok(Lead::update(&self.pool, id, input).await?)
    }

    async fn set_lead_agent(&self, id: Uuid, agent_id: Uuid) -> StoreResult<Option<Lead>> {
        Ok(Lead::set_agent(&self.pool, id, agent_id).await?)
    }

    async fn set_lead_category(
        &self,
        id: Uuid,
        category_id: Option<Uuid>,
    ) -> StoreResult<Option<Lead>> {
        Ok(Lead::set_category(&self.pool, id, category_id).await?)
    }

    async fn delete_lead(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Lead::delete(&self.pool, id).await?)
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<Category>> {
        Ok(Category::list(&self.pool, filter.organisation_id).await?)
    }

    async fn find_category(
        &self,
        filter: &CategoryFilter,
        id: Uuid,
    ) -> StoreResult<Option<Category>> {
        Ok(Category::find(&self.pool, filter.organisation_id, id).await?)
    }

    async fn lead_counts_by_category(
        &self,
        organisation_id: Uuid,
    ) -> StoreResult<Vec<(Option<Uuid>, i64)>> {
        Ok(Lead::count_by_category(&self.pool, organisation_id).await?)
    }
}
