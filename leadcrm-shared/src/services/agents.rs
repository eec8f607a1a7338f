/// Agent management (organisor only)

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{CrmService, Outcome, Redirect};
use crate::access::{authorize, require_role, Action, AgentFilter, Target};
use crate::auth::password::{generate_placeholder_secret, hash_password};
use crate::error::{CrmError, CrmResult};
use crate::identity::{AccountRole, Principal};
use crate::models::agent::{Agent, AgentInput};
use crate::models::user::CreateUser;
use crate::notify::Email;

pub const AGENT_INVITE_SUBJECT: &str = "You are invited to be an agent";
pub const AGENT_INVITE_MESSAGE: &str =
    "You were added as an agent. Go to the site to start working on your leads";

const AGENT: &str = "Agent";

impl CrmService {
    /// Agents of the principal's organisation
    ///
    /// # Errors
    ///
    /// `Unauthorized` for an agent principal
    pub async fn list_agents(&self, principal: &Principal) -> CrmResult<Vec<Agent>> {
        let filter = agent_scope(principal)?;
        Ok(self.store.list_agents(&filter).await?)
    }

    pub async fn get_agent(&self, principal: &Principal, id: Uuid) -> CrmResult<Agent> {
        let filter = agent_scope(principal)?;
        self.store
            .find_agent(&filter, id)
            .await?
            .ok_or_else(|| CrmError::not_found(AGENT, id))
    }

    /// Creates an agent account in the organisor's organisation and invites it
    ///
    /// The account gets role `agent` and a random placeholder secret; the
    /// invitation goes from the organisor's address to the agent's.
    pub async fn create_agent(
        &self,
        principal: &Principal,
        input: AgentInput,
    ) -> CrmResult<Outcome<Agent>> {
        let organisation_id = principal.organisation_id();
        authorize(
            principal,
            Action::CreateAgent,
            Target::Organisation(organisation_id),
        )
        .require(Action::CreateAgent, "Organisation", organisation_id)?;

        input.validate()?;

        let organisor = self
            .store
            .find_user(principal.user_id())
            .await?
            .ok_or_else(|| CrmError::not_found("User", principal.user_id()))?;

        let profile = input.profile();
        let account = CreateUser {
            email: profile.email,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            password_hash: hash_password(&generate_placeholder_secret())?,
            role: AccountRole::Agent,
        };

        let agent = self.store.create_agent(organisation_id, account).await?;
        info!(
            agent_id = %agent.id,
            user_id = %agent.user_id,
            organisation_id = %organisation_id,
            "Agent created"
        );

        let status = self
            .notify(Email {
                subject: AGENT_INVITE_SUBJECT.to_string(),
                message: AGENT_INVITE_MESSAGE.to_string(),
                from: organisor.email,
                recipients: vec![agent.email.clone()],
            })
            .await;

        Ok(Outcome::new(agent, Redirect::AgentList).with_notification(status))
    }

    /// Rewrites the profile of an agent's account
    pub async fn update_agent(
        &self,
        principal: &Principal,
        id: Uuid,
        input: AgentInput,
    ) -> CrmResult<Outcome<Agent>> {
        let agent = self.authorized_agent(principal, Action::UpdateAgent, id).await?;

        input.validate()?;

        let agent = self
            .store
            .update_agent(&agent, &input.profile())
            .await?
            .ok_or_else(|| CrmError::not_found(AGENT, id))?;

        info!(agent_id = %agent.id, "Agent updated");
        Ok(Outcome::new(agent, Redirect::AgentList))
    }

    /// Deletes an agent and its account; their leads become unassigned
    pub async fn delete_agent(&self, principal: &Principal, id: Uuid) -> CrmResult<Outcome<()>> {
        let agent = self.authorized_agent(principal, Action::DeleteAgent, id).await?;

        if !self.store.delete_agent(&agent).await? {
            return Err(CrmError::not_found(AGENT, id));
        }

        info!(agent_id = %id, user_id = %agent.user_id, "Agent deleted");
        Ok(Outcome::new((), Redirect::AgentList))
    }

    async fn authorized_agent(
        &self,
        principal: &Principal,
        action: Action,
        id: Uuid,
    ) -> CrmResult<Agent> {
        require_role(principal, action).require(action, AGENT, id)?;

        let agent = self.get_agent(principal, id).await?;
        authorize(principal, action, Target::Agent(&agent)).require(action, AGENT, id)?;

        Ok(agent)
    }
}

/// Agent filter of an organisor; agents may not list agents
fn agent_scope(principal: &Principal) -> CrmResult<AgentFilter> {
    AgentFilter::for_principal(principal)
        .ok_or_else(|| CrmError::Unauthorized("Only organisors can manage agents".to_string()))
}
