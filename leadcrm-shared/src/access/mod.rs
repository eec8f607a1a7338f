/// Permission-scoped data access
///
/// Two pure building blocks decide what a principal may touch:
///
/// - [`scope`]: the Visibility Filter. Builds the filter that restricts a
///   read to the records a principal may see, and resolves visible id sets.
/// - [`authorize`]: the Mutation Authorizer. Decides whether a principal may
///   perform a write on a specific target.
///
/// Neither raises. Services translate a [`authorize::Decision::Deny`] into
/// `NotFound` or `Unauthorized`.

pub mod authorize;
pub mod scope;

pub use authorize::{authorize, require_role, Action, Decision, DenyReason, Target};
pub use scope::{scope, AgentFilter, Assignment, CategoryFilter, EntityKind, LeadFilter};
