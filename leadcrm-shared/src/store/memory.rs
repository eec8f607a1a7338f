/// In-memory store for tests and demos
///
/// Holds every table in one `RwLock`, so each operation sees and leaves a
/// consistent state. Mirrors the PostgreSQL schema's constraints: unique
/// case-insensitive email, unique username, cascade from account to agent
/// record and `SET NULL` on leads of a deleted agent.
///
/// # Example
///
/// ```
/// use leadcrm_shared::store::{CrmStore, MemoryStore};
///
/// # async fn example() {
/// let store = MemoryStore::new();
/// assert!(store.ping().await.is_ok());
/// # }
/// ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{conflict_message, CrmStore, StoreError, StoreResult};
use crate::access::scope::{AgentFilter, CategoryFilter, LeadFilter};
use crate::identity::{AccountRole, Principal};
use crate::models::{
    agent::Agent,
    category::{Category, DEFAULT_CATEGORIES},
    lead::{Lead, LeadInput},
    organisation::Organisation,
    user::{CreateUser, UpdateProfile, User},
};

/// Agent table row, joined with `users` on read
#[derive(Debug, Clone)]
struct AgentRow {
    id: Uuid,
    user_id: Uuid,
    organisation_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    organisations: Vec<Organisation>,
    agents: Vec<AgentRow>,
    categories: Vec<Category>,
    /// Insertion order is creation order
    leads: Vec<Lead>,
}

impl Tables {
    fn check_unique(&self, email: &str, username: &str, except: Option<Uuid>) -> StoreResult<()> {
        let others = self
            .users
            .values()
            .filter(|user| Some(user.id) != except);

        for user in others {
            if user.email.to_lowercase() == email.to_lowercase() {
                return Err(StoreError::Conflict(conflict_message(Some(
                    "users_email_lower_idx",
                ))));
            }
            if user.username == username {
                return Err(StoreError::Conflict(conflict_message(Some(
                    "users_username_key",
                ))));
            }
        }
        Ok(())
    }

    fn insert_user(&mut self, account: CreateUser) -> StoreResult<User> {
        self.check_unique(&account.email, &account.username, None)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: account.email,
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            password_hash: account.password_hash,
            role: account.role,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn join_agent(&self, row: &AgentRow) -> Option<Agent> {
        let user = self.users.get(&row.user_id)?;
        Some(Agent {
            id: row.id,
            user_id: row.user_id,
            organisation_id: row.organisation_id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: row.created_at,
        })
    }

    fn lead_mut(&mut self, id: Uuid) -> Option<&mut Lead> {
        self.leads.iter_mut().find(|lead| lead.id == id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrmStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_organisor(
        &self,
        account: CreateUser,
        organisation_name: &str,
    ) -> StoreResult<(User, Organisation)> {
        let mut tables = self.tables.write().await;

        let user = tables.insert_user(account)?;
        let organisation = Organisation {
            id: Uuid::new_v4(),
            owner_id: user.id,
            name: organisation_name.to_string(),
            created_at: Utc::now(),
        };
        tables.organisations.push(organisation.clone());

        for name in DEFAULT_CATEGORIES {
            tables.categories.push(Category {
                id: Uuid::new_v4(),
                organisation_id: organisation.id,
                name: name.to_string(),
                created_at: Utc::now(),
            });
        }

        Ok((user, organisation))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.email.to_lowercase() == email)
            .cloned())
    }

    async fn resolve_principal(&self, user_id: Uuid) -> StoreResult<Option<Principal>> {
        let tables = self.tables.read().await;
        let Some(user) = tables.users.get(&user_id) else {
            return Ok(None);
        };

        Ok(match user.role {
            AccountRole::Organisor => tables
                .organisations
                .iter()
                .find(|organisation| organisation.owner_id == user.id)
                .map(|organisation| Principal::organisor(user.id, organisation.id)),
            AccountRole::Agent => tables
                .agents
                .iter()
                .find(|row| row.user_id == user.id)
                .map(|row| Principal::agent(user.id, row.id, row.organisation_id)),
        })
    }

    async fn list_agents(&self, filter: &AgentFilter) -> StoreResult<Vec<Agent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .agents
            .iter()
            .filter_map(|row| tables.join_agent(row))
            .filter(|agent| filter.matches(agent))
            .collect())
    }

    async fn find_agent(&self, filter: &AgentFilter, id: Uuid) -> StoreResult<Option<Agent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .agents
            .iter()
            .filter(|row| row.id == id)
            .filter_map(|row| tables.join_agent(row))
            .find(|agent| filter.matches(agent)))
    }

    async fn create_agent(
        &self,
        organisation_id: Uuid,
        account: CreateUser,
    ) -> StoreResult<Agent> {
        let mut tables = self.tables.write().await;

        let user = tables.insert_user(account)?;
        let row = AgentRow {
            id: Uuid::new_v4(),
            user_id: user.id,
            organisation_id,
            created_at: Utc::now(),
        };
        tables.agents.push(row.clone());

        tables.join_agent(&row).ok_or_else(|| {
            StoreError::Database(sqlx::Error::Protocol("agent account vanished".into()))
        })
    }

    async fn update_agent(
        &self,
        agent: &Agent,
        profile: &UpdateProfile,
    ) -> StoreResult<Option<Agent>> {
        let mut tables = self.tables.write().await;
        tables.check_unique(&profile.email, &profile.username, Some(agent.user_id))?;

        let Some(user) = tables.users.get_mut(&agent.user_id) else {
            return Ok(None);
        };
        user.email = profile.email.clone();
        user.username = profile.username.clone();
        user.first_name = profile.first_name.clone();
        user.last_name = profile.last_name.clone();
        user.updated_at = Utc::now();

        let row = tables.agents.iter().find(|row| row.id == agent.id).cloned();
        Ok(row.and_then(|row| tables.join_agent(&row)))
    }

    async fn delete_agent(&self, agent: &Agent) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.users.remove(&agent.user_id).is_none() {
            return Ok(false);
        }
        tables.agents.retain(|row| row.user_id != agent.user_id);

        let now = Utc::now();
        for lead in tables
            .leads
            .iter_mut()
            .filter(|lead| lead.agent_id == Some(agent.id))
        {
            lead.agent_id = None;
            lead.updated_at = now;
        }
        Ok(true)
    }

    async fn list_leads(&self, filter: &LeadFilter) -> StoreResult<Vec<Lead>> {
        Ok(self
            .tables
            .read()
            .await
            .leads
            .iter()
            .filter(|lead| filter.matches(lead))
            .cloned()
            .collect())
    }

    async fn find_lead(&self, filter: &LeadFilter, id: Uuid) -> StoreResult<Option<Lead>> {
        Ok(self
            .tables
            .read()
            .await
            .leads
            .iter()
            .find(|lead| lead.id == id && filter.matches(lead))
            .cloned())
    }

    async fn create_lead(&self, organisation_id: Uuid, input: &LeadInput) -> StoreResult<Lead> {
        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            organisation_id,
            agent_id: input.agent_id,
            category_id: input.category_id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            age: input.age,
            email: input.email.clone(),
            phone_number: input.phone_number.clone(),
            description: input.description.clone(),
            source: input.source.clone(),
            value: input.value,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.leads.push(lead.clone());
        Ok(lead)
    }

    async fn update_lead(&self, id: Uuid, input: &LeadInput) -> StoreResult<Option<Lead>> {
        let mut tables = self.tables.write().await;
        let Some(lead) = tables.lead_mut(id) else {
            return Ok(None);
        };

        lead.agent_id = input.agent_id;
        lead.category_id = input.category_id;
        lead.first_name = input.first_name.clone();
        lead.last_name = input.last_name.clone();
        lead.age = input.age;
        lead.email = input.email.clone();
        lead.phone_number = input.phone_number.clone();
        lead.description = input.description.clone();
        lead.source = input.source.clone();
        lead.value = input.value;
        lead.updated_at = Utc::now();

        Ok(Some(lead.clone()))
    }

    async fn set_lead_agent(&self, id: Uuid, agent_id: Uuid) -> StoreResult<Option<Lead>> {
        let mut tables = self.tables.write().await;
        Ok(tables.lead_mut(id).map(|lead| {
            lead.agent_id = Some(agent_id);
            lead.updated_at = Utc::now();
            lead.clone()
        }))
    }

    async fn set_lead_category(
        &self,
        id: Uuid,
        category_id: Option<Uuid>,
    ) -> StoreResult<Option<Lead>> {
        let mut tables = self.tables.write().await;
        Ok(tables.lead_mut(id).map(|lead| {
            lead.category_id = category_id;
            lead.updated_at = Utc::now();
            lead.clone()
        }))
    }

    async fn delete_lead(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.leads.len();
        tables.leads.retain(|lead| lead.id != id);
        Ok(tables.leads.len() < before)
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .tables
            .read()
            .await
            .categories
            .iter()
            .filter(|category| filter.matches(category))
            .cloned()
            .collect();

        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find_category(
        &self,
        filter: &CategoryFilter,
        id: Uuid,
    ) -> StoreResult<Option<Category>> {
        Ok(self
            .tables
            .read()
            .await
            .categories
            .iter()
            .find(|category| category.id == id && filter.matches(category))
            .cloned())
    }

    async fn lead_counts_by_category(
        &self,
        organisation_id: Uuid,
    ) -> StoreResult<Vec<(Option<Uuid>, i64)>> {
        let mut counts: HashMap<Option<Uuid>, i64> = HashMap::new();
        for lead in self
            .tables
            .read()
            .await
            .leads
            .iter()
            .filter(|lead| lead.organisation_id == organisation_id)
        {
            *counts.entry(lead.category_id).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
