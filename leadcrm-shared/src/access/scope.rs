/// Visibility filter
///
/// # Rules
///
/// | Principal | Agents            | Leads                          | Categories        |
/// |-----------|-------------------|--------------------------------|-------------------|
/// | Organisor | own organisation  | own organisation               | own organisation  |
/// | Agent     | none              | own organisation AND own agent | own organisation  |
///
/// Detail lookups are `scope ∩ {id}`: a record outside the scope is
/// indistinguishable from one that doesn't exist.
///
/// # Example
///
/// ```
/// use leadcrm_shared::access::scope::{Assignment, LeadFilter};
/// use leadcrm_shared::identity::Principal;
/// use uuid::Uuid;
///
/// let principal = Principal::agent(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
/// let filter = LeadFilter::for_principal(&principal);
///
/// assert_eq!(filter.agent_id, principal.agent_id());
/// assert_eq!(filter.assignment, Assignment::Any);
/// ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Principal;
use crate::models::{agent::Agent, category::Category, lead::Lead};
use crate::store::{CrmStore, StoreError};

/// Entity collections the filter scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lead,
    Agent,
    Category,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Lead => "Lead",
            EntityKind::Agent => "Agent",
            EntityKind::Category => "Category",
        }
    }
}

/// Assignment sub-filter for lead lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assignment {
    #[default]
    Any,

    /// `agent IS NOT NULL`
    Assigned,

    /// `agent IS NULL`
    Unassigned,
}

/// Restriction applied to every lead read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadFilter {
    pub organisation_id: Uuid,

    /// Only leads assigned to this agent
    pub agent_id: Option<Uuid>,

    pub assignment: Assignment,

    /// Only leads in this category
    pub category_id: Option<Uuid>,
}

impl LeadFilter {
    /// Lead scope of a principal
    pub fn for_principal(principal: &Principal) -> Self {
        match principal {
            Principal::Organisor {
                organisation_id, ..
            } => Self {
                organisation_id: *organisation_id,
                agent_id: None,
                assignment: Assignment::Any,
                category_id: None,
            },
            Principal::Agent {
                agent_id,
                organisation_id,
                ..
            } => Self {
                organisation_id: *organisation_id,
                agent_id: Some(*agent_id),
                assignment: Assignment::Any,
                category_id: None,
            },
        }
    }

    /// Narrows to leads with an agent
    pub fn assigned(mut self) -> Self {
        self.assignment = Assignment::Assigned;
        self
    }

    /// Narrows to leads without an agent
    pub fn unassigned(mut self) -> Self {
        self.assignment = Assignment::Unassigned;
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Whether a lead passes the filter
    ///
    /// Stores that cannot push the filter into a query apply it with this.
    pub fn matches(&self, lead: &Lead) -> bool {
        if lead.organisation_id != self.organisation_id {
            return false;
        }

        if let Some(agent_id) = self.agent_id {
            if lead.agent_id != Some(agent_id) {
                return false;
            }
        }

        let assignment_ok = match self.assignment {
            Assignment::Any => true,
            Assignment::Assigned => lead.agent_id.is_some(),
            Assignment::Unassigned => lead.agent_id.is_none(),
        };

        assignment_ok
            && self
                .category_id
                .map_or(true, |category_id| lead.category_id == Some(category_id))
    }
}

/// Restriction applied to every agent read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentFilter {
    pub organisation_id: Uuid,
}

impl AgentFilter {
    /// Agent scope of a principal; `None` when the principal may see no agents
    pub fn for_principal(principal: &Principal) -> Option<Self> {
        match principal {
            Principal::Organisor {
                organisation_id, ..
            } => Some(Self {
                organisation_id: *organisation_id,
            }),
            Principal::Agent { .. } => None,
        }
    }

    pub fn matches(&self, agent: &Agent) -> bool {
        agent.organisation_id == self.organisation_id
    }
}

/// Restriction applied to every category read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFilter {
    pub organisation_id: Uuid,
}

impl CategoryFilter {
    /// Category scope of a principal
    ///
    /// Agents see their organisation's categories, reached through the
    /// agent record rather than ownership.
    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            organisation_id: principal.organisation_id(),
        }
    }

    pub fn matches(&self, category: &Category) -> bool {
        category.organisation_id == self.organisation_id
    }
}

/// Resolves the ids of `kind` visible to `principal`
///
/// Never fails on permission grounds: an agent asking for agents gets an
/// empty set.
pub async fn scope(
    store: &dyn CrmStore,
    principal: &Principal,
    kind: EntityKind,
) -> Result<BTreeSet<Uuid>, StoreError> {
    let ids = match kind {
        EntityKind::Lead => store
            .list_leads(&LeadFilter::for_principal(principal))
            .await?
            .into_iter()
            .map(|lead| lead.id)
            .collect(),
        EntityKind::Agent => match AgentFilter::for_principal(principal) {
            Some(filter) => store
                .list_agents(&filter)
                .await?
                .into_iter()
                .map(|agent| agent.id)
                .collect(),
            None => BTreeSet::new(),
        },
        EntityKind::Category => store
            .list_categories(&CategoryFilter::for_principal(principal))
            .await?
            .into_iter()
            .map(|category| category.id)
            .collect(),
    };

    tracing::debug!(
        user_id = %principal.user_id(),
        kind = kind.as_str(),
        visible = ids.len(),
        "Resolved visibility scope"
    );

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::Lead;
    use chrono::Utc;

    fn lead(organisation_id: Uuid, agent_id: Option<Uuid>, category_id: Option<Uuid>) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            organisation_id,
            agent_id,
            category_id,
            first_name: "Lee".to_string(),
            last_name: "Prospect".to_string(),
            age: None,
            email: None,
            phone_number: None,
            description: None,
            source: None,
            value: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_organisor_sees_all_leads_of_organisation() {
        let org = Uuid::new_v4();
        let principal = Principal::organisor(Uuid::new_v4(), org);
        let filter = LeadFilter::for_principal(&principal);

        assert!(filter.matches(&lead(org, None, None)));
        assert!(filter.matches(&lead(org, Some(Uuid::new_v4()), None)));
        assert!(!filter.matches(&lead(Uuid::new_v4(), None, None)));
    }

    #[test]
    fn test_organisor_assignment_split() {
        let org = Uuid::new_v4();
        let filter = LeadFilter::for_principal(&Principal::organisor(Uuid::new_v4(), org));
        let unassigned = lead(org, None, None);
        let assigned = lead(org, Some(Uuid::new_v4()), None);

        assert!(filter.assigned().matches(&assigned));
        assert!(!filter.assigned().matches(&unassigned));
        assert!(filter.unassigned().matches(&unassigned));
        assert!(!filter.unassigned().matches(&assigned));
    }

    #[test]
    fn test_agent_sees_only_own_leads() {
        let org = Uuid::new_v4();
        let agent_id = Uuid::new_v4();
        let principal = Principal::agent(Uuid::new_v4(), agent_id, org);
        let filter = LeadFilter::for_principal(&principal);

        assert!(filter.matches(&lead(org, Some(agent_id), None)));
        assert!(!filter.matches(&lead(org, Some(Uuid::new_v4()), None)));
        assert!(!filter.matches(&lead(org, None, None)));
        assert!(!filter.matches(&lead(Uuid::new_v4(), Some(agent_id), None)));
    }

    #[test]
    fn test_category_narrowing() {
        let org = Uuid::new_v4();
        let category_id = Uuid::new_v4();
        let filter = LeadFilter::for_principal(&Principal::organisor(Uuid::new_v4(), org))
            .in_category(category_id);

        assert!(filter.matches(&lead(org, None, Some(category_id))));
        assert!(!filter.matches(&lead(org, None, Some(Uuid::new_v4()))));
        assert!(!filter.matches(&lead(org, None, None)));
    }

    #[test]
    fn test_agent_filter_is_organisor_only() {
        let org = Uuid::new_v4();
        assert_eq!(
            AgentFilter::for_principal(&Principal::organisor(Uuid::new_v4(), org)),
            Some(AgentFilter {
                organisation_id: org
            })
        );
        assert!(
            AgentFilter::for_principal(&Principal::agent(Uuid::new_v4(), Uuid::new_v4(), org))
                .is_none()
        );
    }

    #[test]
    fn test_category_filter_goes_through_agent_organisation() {
        let org = Uuid::new_v4();
        let principal = Principal::agent(Uuid::new_v4(), Uuid::new_v4(), org);
        assert_eq!(CategoryFilter::for_principal(&principal).organisation_id, org);
    }
}
