/// Business operations over leads, agents and categories
///
/// [`CrmService`] is the single entry point for every core operation. Each
/// call takes the acting [`Principal`](crate::identity::Principal)
/// explicitly and follows the same pipeline:
///
/// 1. role gate ([`require_role`](crate::access::require_role))
/// 2. scoped lookup of the target (outside the scope is `NotFound`)
/// 3. [`authorize`](crate::access::authorize) on the loaded target
/// 4. apply the change, then notify where the operation calls for it
///
/// Mutating calls return an [`Outcome`] naming where the caller should go
/// next.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use leadcrm_shared::notify::{LogNotifier, NotificationSettings};
/// use leadcrm_shared::services::CrmService;
/// use leadcrm_shared::store::MemoryStore;
///
/// let service = CrmService::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(LogNotifier),
///     NotificationSettings::default(),
/// );
/// assert_eq!(service.notifier_name(), "log");
/// ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::notify::{Email, NotificationSettings, NotificationStatus, Notifier};
use crate::store::CrmStore;

pub mod accounts;
pub mod agents;
pub mod categories;
pub mod leads;

pub use accounts::Signup;
pub use categories::summarise;
pub use leads::LeadListing;

/// Where a caller goes after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "target", content = "id", rename_all = "snake_case")]
pub enum Redirect {
    LeadList,
    AgentList,
    LeadDetail(Uuid),
    Login,
}

impl Redirect {
    /// Canonical path of the target
    pub fn path(&self) -> String {
        match self {
            Redirect::LeadList => "/leads".to_string(),
            Redirect::AgentList => "/agents".to_string(),
            Redirect::LeadDetail(id) => format!("/leads/{}", id),
            Redirect::Login => "/login".to_string(),
        }
    }
}

/// Result of a mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,

    pub redirect: Redirect,

    /// Delivery status when the operation sends a notification
    pub notification: Option<NotificationStatus>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, redirect: Redirect) -> Self {
        Self {
            value,
            redirect,
            notification: None,
        }
    }

    pub fn with_notification(mut self, status: NotificationStatus) -> Self {
        self.notification = Some(status);
        self
    }
}

#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn CrmStore>,
    notifier: Arc<dyn Notifier>,
    settings: NotificationSettings,
}

impl CrmService {
    pub fn new(
        store: Arc<dyn CrmStore>,
        notifier: Arc<dyn Notifier>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            settings,
        }
    }

    pub fn store(&self) -> &dyn CrmStore {
        self.store.as_ref()
    }

    pub fn notifier_name(&self) -> &str {
        self.notifier.name()
    }

    /// Sends a notification after the record is already stored
    ///
    /// Failure is logged and reported, never propagated.
    async fn notify(&self, email: Email) -> NotificationStatus {
        match self.notifier.send(&email).await {
            Ok(()) => {
                info!(
                    notifier = self.notifier.name(),
                    subject = %email.subject,
                    recipients = email.recipients.len(),
                    "Notification sent"
                );
                NotificationStatus::Sent
            }
            Err(e) => {
                warn!(
                    notifier = self.notifier.name(),
                    subject = %email.subject,
                    error = %e,
                    "Notification failed, record kept"
                );
                NotificationStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_paths() {
        let id = Uuid::new_v4();
        assert_eq!(Redirect::LeadList.path(), "/leads");
        assert_eq!(Redirect::AgentList.path(), "/agents");
        assert_eq!(Redirect::LeadDetail(id).path(), format!("/leads/{}", id));
        assert_eq!(Redirect::Login.path(), "/login");
    }

    #[test]
    fn test_outcome_notification() {
        let outcome = Outcome::new((), Redirect::LeadList);
        assert_eq!(outcome.notification, None);

        let outcome = outcome.with_notification(NotificationStatus::Failed);
        assert_eq!(outcome.notification, Some(NotificationStatus::Failed));
    }
}
