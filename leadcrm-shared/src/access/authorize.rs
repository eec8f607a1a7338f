/// Mutation authorizer
///
/// [`authorize`] is a pure decision over an already loaded target. It never
/// mutates state; services apply the change after an [`Decision::Allow`].
///
/// # Rules
///
/// - Agent and lead management (create, update, delete, assign) is
///   organisor-only. An agent principal is denied with `Unauthorized`.
/// - Any target outside the principal's organisation is denied with
///   `NotFound`, so existence is never revealed.
/// - A category transition is allowed for the organisor on any lead of the
///   organisation, and for an agent only on leads assigned to them.
///
/// # Example
///
/// ```
/// use leadcrm_shared::access::authorize::{authorize, Action, Decision, DenyReason, Target};
/// use leadcrm_shared::identity::Principal;
/// use uuid::Uuid;
///
/// let organisation_id = Uuid::new_v4();
/// let agent = Principal::agent(Uuid::new_v4(), Uuid::new_v4(), organisation_id);
///
/// let decision = authorize(&agent, Action::CreateLead, Target::Organisation(organisation_id));
/// assert_eq!(decision, Decision::Deny(DenyReason::Unauthorized));
/// ```

use uuid::Uuid;

use crate::error::CrmError;
use crate::identity::Principal;
use crate::models::{agent::Agent, lead::Lead};

/// Write actions subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateAgent,
    UpdateAgent,
    DeleteAgent,
    CreateLead,
    UpdateLead,
    DeleteLead,
    AssignLead,
    UpdateLeadCategory,
}

impl Action {
    /// Whether only an organisor may perform this action at all
    pub fn requires_organisor(&self) -> bool {
        !matches!(self, Action::UpdateLeadCategory)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateAgent => "create_agent",
            Action::UpdateAgent => "update_agent",
            Action::DeleteAgent => "delete_agent",
            Action::CreateLead => "create_lead",
            Action::UpdateLead => "update_lead",
            Action::DeleteLead => "delete_lead",
            Action::AssignLead => "assign_lead",
            Action::UpdateLeadCategory => "update_lead_category",
        }
    }

    fn accepts(&self, target: &Target<'_>) -> bool {
        match self {
            Action::CreateAgent | Action::CreateLead => matches!(target, Target::Organisation(_)),
            Action::UpdateAgent | Action::DeleteAgent => matches!(target, Target::Agent(_)),
            Action::UpdateLead
            | Action::DeleteLead
            | Action::AssignLead
            | Action::UpdateLeadCategory => matches!(target, Target::Lead(_)),
        }
    }
}

/// Record an action applies to
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Organisation a new record is created in
    Organisation(Uuid),
    Agent(&'a Agent),
    Lead(&'a Lead),
}

impl Target<'_> {
    fn organisation_id(&self) -> Uuid {
        match self {
            Target::Organisation(id) => *id,
            Target::Agent(agent) => agent.organisation_id,
            Target::Lead(lead) => lead.organisation_id,
        }
    }
}

/// Why an action was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Target is concealed from the principal
    NotFound,

    /// Role may not perform the action
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Maps a denial to the error a service reports
    ///
    /// `entity`/`id` name the target for a `NotFound`.
    pub fn require(self, action: Action, entity: &'static str, id: Uuid) -> Result<(), CrmError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::NotFound) => Err(CrmError::not_found(entity, id)),
            Decision::Deny(DenyReason::Unauthorized) => Err(CrmError::Unauthorized(format!(
                "{} requires the organisor role",
                action.as_str()
            ))),
        }
    }
}

/// Role gate alone, checked before any record is loaded
pub fn require_role(principal: &Principal, action: Action) -> Decision {
    match principal {
        Principal::Organisor { .. } => Decision::Allow,
        Principal::Agent { .. } if action.requires_organisor() => {
            Decision::Deny(DenyReason::Unauthorized)
        }
        Principal::Agent { .. } => Decision::Allow,
    }
}

/// Decides whether `principal` may perform `action` on `target`
pub fn authorize(principal: &Principal, action: Action, target: Target<'_>) -> Decision {
    if let Decision::Deny(reason) = require_role(principal, action) {
        return Decision::Deny(reason);
    }

    if !action.accepts(&target) || target.organisation_id() != principal.organisation_id() {
        return Decision::Deny(DenyReason::NotFound);
    }

    match (principal, target) {
        (Principal::Agent { agent_id, .. }, Target::Lead(lead)) => {
            if lead.agent_id == Some(*agent_id) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotFound)
            }
        }
        _ => Decision::Allow,
    }
}
