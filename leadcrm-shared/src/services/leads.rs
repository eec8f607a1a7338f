/// Lead operations: listing, CRUD, assignment and category transitions

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{CrmService, Outcome, Redirect};
use crate::access::{
    authorize, require_role, Action, AgentFilter, CategoryFilter, LeadFilter, Target,
};
use crate::error::{CrmError, CrmResult};
use crate::identity::Principal;
use crate::models::lead::{Lead, LeadInput};
use crate::notify::Email;

pub const LEAD_CREATED_SUBJECT: &str = "A lead has been created";
pub const LEAD_CREATED_MESSAGE: &str = "Go to the site to see the new lead";

const LEAD: &str = "Lead";

/// Lead list view
///
/// Organisors get their organisation's leads split by assignment. Agents
/// get only their own leads in `assigned` and no `unassigned` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadListing {
    pub assigned: Vec<Lead>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unassigned: Option<Vec<Lead>>,
}

impl CrmService {
    pub async fn list_leads(&self, principal: &Principal) -> CrmResult<LeadListing> {
        let filter = LeadFilter::for_principal(principal);

        let listing = match principal {
            Principal::Organisor { .. } => LeadListing {
                assigned: self.store.list_leads(&filter.assigned()).await?,
                unassigned: Some(self.store.list_leads(&filter.unassigned()).await?),
            },
            Principal::Agent { .. } => LeadListing {
                assigned: self.store.list_leads(&filter).await?,
                unassigned: None,
            },
        };

        Ok(listing)
    }

    /// Lead detail; a lead outside the principal's scope is `NotFound`
    pub async fn get_lead(&self, principal: &Principal, id: Uuid) -> CrmResult<Lead> {
        self.find_lead(principal, id).await
    }

    pub async fn create_lead(
        &self,
        principal: &Principal,
        input: LeadInput,
    ) -> CrmResult<Outcome<Lead>> {
        let organisation_id = principal.organisation_id();
        authorize(
            principal,
            Action::CreateLead,
            Target::Organisation(organisation_id),
        )
        .require(Action::CreateLead, "Organisation", organisation_id)?;

        input.validate()?;
        self.check_lead_references(principal, &input).await?;

        let lead = self.store.create_lead(organisation_id, &input).await?;
        info!(
            lead_id = %lead.id,
            organisation_id = %organisation_id,
            agent_id = ?lead.agent_id,
            "Lead created"
        );

        let status = self
            .notify(Email {
                subject: LEAD_CREATED_SUBJECT.to_string(),
                message: LEAD_CREATED_MESSAGE.to_string(),
                from: self.settings.sender.clone(),
                recipients: self.settings.lead_recipients.clone(),
            })
            .await;

        Ok(Outcome::new(lead, Redirect::LeadList).with_notification(status))
    }

    /// Replaces the core fields of a lead (organisor only)
    ///
    /// An `agent_id` or `category_id` left out of the form keeps the lead's
    /// current assignment and category.
    pub async fn update_lead(
        &self,
        principal: &Principal,
        id: Uuid,
        input: LeadInput,
    ) -> CrmResult<Outcome<Lead>> {
        require_role(principal, Action::UpdateLead).require(Action::UpdateLead, LEAD, id)?;

        let lead = self.find_lead(principal, id).await?;
        authorize(principal, Action::UpdateLead, Target::Lead(&lead))
            .require(Action::UpdateLead, LEAD, id)?;

        input.validate()?;
        self.check_lead_references(principal, &input).await?;

        let input = LeadInput {
            agent_id: input.agent_id.or(lead.agent_id),
            category_id: input.category_id.or(lead.category_id),
            ..input
        };

        let lead = self
            .store
            .update_lead(lead.id, &input)
            .await?
            .ok_or_else(|| CrmError::not_found(LEAD, id))?;

        info!(lead_id = %lead.id, "Lead updated");
        Ok(Outcome::new(lead, Redirect::LeadList))
    }

    pub async fn delete_lead(&self, principal: &Principal, id: Uuid) -> CrmResult<Outcome<()>> {
        require_role(principal, Action::DeleteLead).require(Action::DeleteLead, LEAD, id)?;

        let lead = self.find_lead(principal, id).await?;
        authorize(principal, Action::DeleteLead, Target::Lead(&lead))
            .require(Action::DeleteLead, LEAD, id)?;

        if !self.store.delete_lead(lead.id).await? {
            return Err(CrmError::not_found(LEAD, id));
        }

        info!(lead_id = %id, "Lead deleted");
        Ok(Outcome::new((), Redirect::LeadList))
    }

    /// Assigns a lead to an agent of the same organisation
    ///
    /// Assigning a lead to the agent it already has is a no-op. Otherwise
    /// the new agent overwrites the old one. No notification is sent.
    pub async fn assign_lead(
        &self,
        principal: &Principal,
        lead_id: Uuid,
        agent_id: Uuid,
    ) -> CrmResult<Outcome<Lead>> {
        require_role(principal, Action::AssignLead).require(Action::AssignLead, LEAD, lead_id)?;

        let lead = self.find_lead(principal, lead_id).await?;
        authorize(principal, Action::AssignLead, Target::Lead(&lead))
            .require(Action::AssignLead, LEAD, lead_id)?;

        let agent = match AgentFilter::for_principal(principal) {
            Some(filter) => self.store.find_agent(&filter, agent_id).await?,
            None => None,
        };
        let Some(agent) = agent else {
            debug!(lead_id = %lead_id, agent_id = %agent_id, "Assignment target outside organisation");
            return Err(CrmError::invalid("agent", "Select a valid agent"));
        };

        if lead.agent_id == Some(agent.id) {
            debug!(lead_id = %lead.id, agent_id = %agent.id, "Lead already assigned to agent");
            return Ok(Outcome::new(lead, Redirect::LeadList));
        }

        let previous = lead.agent_id;
        let lead = self
            .store
            .set_lead_agent(lead.id, agent.id)
            .await?
            .ok_or_else(|| CrmError::not_found(LEAD, lead_id))?;

        info!(
            lead_id = %lead.id,
            agent_id = %agent.id,
            previous_agent_id = ?previous,
            "Lead assigned"
        );
        Ok(Outcome::new(lead, Redirect::LeadList))
    }

    /// Moves a lead to a category of its organisation, or to uncategorised
    ///
    /// Any category may follow any other; there is no transition graph.
    pub async fn update_lead_category(
        &self,
        principal: &Principal,
        lead_id: Uuid,
        category_id: Option<Uuid>,
    ) -> CrmResult<Outcome<Lead>> {
        let lead = self.find_lead(principal, lead_id).await?;
        authorize(principal, Action::UpdateLeadCategory, Target::Lead(&lead))
            .require(Action::UpdateLeadCategory, LEAD, lead_id)?;

        if let Some(category_id) = category_id {
            let filter = CategoryFilter {
                organisation_id: lead.organisation_id,
            };
            if self.store.find_category(&filter, category_id).await?.is_none() {
                return Err(CrmError::invalid("category", "Select a valid category"));
            }
        }

        let lead = self
            .store
            .set_lead_category(lead.id, category_id)
            .await?
            .ok_or_else(|| CrmError::not_found(LEAD, lead_id))?;

        info!(lead_id = %lead.id, category_id = ?category_id, "Lead category updated");
        let redirect = Redirect::LeadDetail(lead.id);
        Ok(Outcome::new(lead, redirect))
    }

    /// Scoped lookup: `scope(principal, Lead) ∩ {id}`
    async fn find_lead(&self, principal: &Principal, id: Uuid) -> CrmResult<Lead> {
        self.store
            .find_lead(&LeadFilter::for_principal(principal), id)
            .await?
            .ok_or_else(|| CrmError::not_found(LEAD, id))
    }

    /// Agent and category named on a lead form must be in the organisation
    async fn check_lead_references(
        &self,
        principal: &Principal,
        input: &LeadInput,
    ) -> CrmResult<()> {
        if let Some(agent_id) = input.agent_id {
            let agent = match AgentFilter::for_principal(principal) {
                Some(filter) => self.store.find_agent(&filter, agent_id).await?,
                None => None,
            };
            if agent.is_none() {
                return Err(CrmError::invalid("agent", "Select a valid agent"));
            }
        }

        if let Some(category_id) = input.category_id {
            let filter = CategoryFilter::for_principal(principal);
            if self.store.find_category(&filter, category_id).await?.is_none() {
                return Err(CrmError::invalid("category", "Select a valid category"));
            }
        }

        Ok(())
    }
}
