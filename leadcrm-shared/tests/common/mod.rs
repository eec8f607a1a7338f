//! Shared harness for service-level integration tests
//!
//! Every test gets a fresh in-memory store and a notifier that records
//! what it was asked to send.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use leadcrm_shared::identity::Principal;
use leadcrm_shared::models::agent::{Agent, AgentInput};
use leadcrm_shared::models::category::Category;
use leadcrm_shared::models::lead::{Lead, LeadInput};
use leadcrm_shared::notify::{Email, NotificationSettings, Notifier, NotifyError};
use leadcrm_shared::services::{CrmService, Signup};
use leadcrm_shared::store::MemoryStore;
use uuid::Uuid;

pub const SENDER: &str = "ops@leadcrm.test";
pub const LEAD_DESK: &str = "leads@leadcrm.test";

/// Notifier that remembers every email
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Email>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Notifier whose relay is always down
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&self, _email: &Email) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

pub struct Harness {
    pub service: CrmService,
    pub notifier: Arc<RecordingNotifier>,
}

/// One organisation with its organisor principal
pub struct Org {
    pub organisor: Principal,
    pub organisor_email: String,
}

impl Org {
    pub fn id(&self) -> Uuid {
        self.organisor.organisation_id()
    }
}

pub fn settings() -> NotificationSettings {
    NotificationSettings {
        sender: SENDER.to_string(),
        lead_recipients: vec![LEAD_DESK.to_string()],
    }
}

pub fn harness() -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let service = CrmService::new(Arc::new(MemoryStore::new()), notifier.clone(), settings());
    Harness { service, notifier }
}

pub fn failing_service() -> CrmService {
    CrmService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(FailingNotifier),
        settings(),
    )
}

pub fn signup_form(name: &str) -> Signup {
    Signup {
        email: format!("{}@example.com", name),
        username: name.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        password: "correct-horse-42".to_string(),
        organisation_name: Some(format!("{} Ltd", name)),
    }
}

pub fn agent_form(name: &str) -> AgentInput {
    AgentInput {
        email: format!("{}@example.com", name),
        username: name.to_string(),
        first_name: name.to_string(),
        last_name: "Agent".to_string(),
    }
}

pub fn lead_form(first_name: &str) -> LeadInput {
    LeadInput {
        first_name: first_name.to_string(),
        last_name: "Prospect".to_string(),
        age: Some(35),
        email: Some(format!("{}@prospect.test", first_name.to_lowercase())),
        ..Default::default()
    }
}

/// Signs up an organisor and returns their principal
pub async fn organisation(service: &CrmService, name: &str) -> Org {
    let outcome = service.signup(signup_form(name)).await.unwrap();
    let organisor = service.principal(outcome.value.id).await.unwrap().unwrap();
    Org {
        organisor,
        organisor_email: outcome.value.email,
    }
}

/// Creates an agent and returns the record plus the agent's principal
pub async fn agent(service: &CrmService, org: &Org, name: &str) -> (Agent, Principal) {
    let agent = service
        .create_agent(&org.organisor, agent_form(name))
        .await
        .unwrap()
        .value;
    let principal = service.principal(agent.user_id).await.unwrap().unwrap();
    (agent, principal)
}

pub async fn lead(service: &CrmService, org: &Org, first_name: &str) -> Lead {
    service
        .create_lead(&org.organisor, lead_form(first_name))
        .await
        .unwrap()
        .value
}

pub async fn category(service: &CrmService, org: &Org, name: &str) -> Category {
    service
        .list_categories(&org.organisor)
        .await
        .unwrap()
        .categories
        .into_iter()
        .map(|summary| summary.category)
        .find(|category| category.name == name)
        .unwrap()
}

pub fn ids(leads: &[Lead]) -> Vec<Uuid> {
    leads.iter().map(|lead| lead.id).collect()
}
