/// Principal and account role types
///
/// Every core operation receives the acting [`Principal`] explicitly. A
/// principal is either the organisor who owns an organisation or an agent
/// working inside exactly one organisation; there is no third state.
///
/// # Example
///
/// ```
/// use leadcrm_shared::identity::{AccountRole, Principal};
/// use uuid::Uuid;
///
/// let organisation_id = Uuid::new_v4();
/// let principal = Principal::agent(Uuid::new_v4(), Uuid::new_v4(), organisation_id);
///
/// assert_eq!(principal.role(), AccountRole::Agent);
/// assert_eq!(principal.organisation_id(), organisation_id);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role stored on a user account
///
/// Stored as a single column so an account is always exactly one of
/// organisor or agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Owns an organisation; full read/write over its agents, leads and categories
    Organisor,

    /// Works the leads assigned to them inside one organisation
    Agent,
}

impl AccountRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Organisor => "organisor",
            AccountRole::Agent => "agent",
        }
    }

    pub fn is_organisor(&self) -> bool {
        matches!(self, AccountRole::Organisor)
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, AccountRole::Agent)
    }
}

/// Authenticated actor of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Principal {
    /// Owner of `organisation_id`
    Organisor {
        user_id: Uuid,
        organisation_id: Uuid,
    },

    /// Agent `agent_id` of `organisation_id`
    Agent {
        user_id: Uuid,
        agent_id: Uuid,
        organisation_id: Uuid,
    },
}

impl Principal {
    pub fn organisor(user_id: Uuid, organisation_id: Uuid) -> Self {
        Principal::Organisor {
            user_id,
            organisation_id,
        }
    }

    pub fn agent(user_id: Uuid, agent_id: Uuid, organisation_id: Uuid) -> Self {
        Principal::Agent {
            user_id,
            agent_id,
            organisation_id,
        }
    }

    /// Account backing this principal
    pub fn user_id(&self) -> Uuid {
        match self {
            Principal::Organisor { user_id, .. } | Principal::Agent { user_id, .. } => *user_id,
        }
    }

    /// Organisation the principal acts within
    ///
    /// For an organisor this is the organisation they own; for an agent it
    /// is the organisation the agent record belongs to.
    pub fn organisation_id(&self) -> Uuid {
        match self {
            Principal::Organisor {
                organisation_id, ..
            }
            | Principal::Agent {
                organisation_id, ..
            } => *organisation_id,
        }
    }

    /// Agent record id, if the principal is an agent
    pub fn agent_id(&self) -> Option<Uuid> {
        match self {
            Principal::Organisor { .. } => None,
            Principal::Agent { agent_id, .. } => Some(*agent_id),
        }
    }

    pub fn role(&self) -> AccountRole {
        match self {
            Principal::Organisor { .. } => AccountRole::Organisor,
            Principal::Agent { .. } => AccountRole::Agent,
        }
    }
}
