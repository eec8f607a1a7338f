//! Common test utilities for API route tests
//!
//! The router runs over an in-memory store and a notifier that records
//! outgoing mail, so no database or relay is needed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use leadcrm_api::app::{build_router, AppState};
use leadcrm_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, MailConfig};
use leadcrm_shared::auth::jwt::{create_token, Claims, TokenType};
use leadcrm_shared::identity::AccountRole;
use leadcrm_shared::notify::{Email, Notifier, NotifyError};
use leadcrm_shared::services::CrmService;
use leadcrm_shared::store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "route-test-secret-key-at-least-32-bytes";
pub const PASSWORD: &str = "correct-horse-42";

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

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        mail: MailConfig {
            from: "crm@leadcrm.test".to_string(),
            lead_recipients: vec!["desk@leadcrm.test".to_string()],
            relay_url: None,
        },
    }
}

/// Router plus the notifier it sends through
pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = CrmService::new(
            Arc::new(MemoryStore::new()),
            notifier.clone(),
            config.mail.notification_settings(),
        );

        Self {
            router: build_router(AppState::new(service, config)),
            notifier,
        }
    }

    /// Sends one request and returns the status and JSON body (`Null` when empty)
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    /// Signs up an organisor and logs them in, returning the access token
    pub async fn organisor(&self, name: &str) -> String {
        let (status, _) = self
            .call(
                Method::POST,
                "/v1/auth/signup",
                None,
                Some(json!({
                    "email": format!("{}@example.com", name),
                    "username": name,
                    "password": PASSWORD,
                    "organisation_name": format!("{} Ltd", name),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .call(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({
                    "email": format!("{}@example.com", name),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Creates an agent through the API, returning its id and an access token
    ///
    /// Agents start with a placeholder password, so the token is minted
    /// directly for the agent's account.
    pub async fn agent(&self, organisor_token: &str, name: &str) -> (Uuid, String) {
        let (status, body) = self
            .post(
                "/v1/agents",
                organisor_token,
                json!({
                    "email": format!("{}@example.com", name),
                    "username": name,
                    "first_name": name,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let agent_id = id_of(&body["data"]);
        let user_id: Uuid = body["data"]["user_id"].as_str().unwrap().parse().unwrap();
        (agent_id, token_for(user_id, AccountRole::Agent))
    }

    /// Creates a lead through the API and returns its id
    pub async fn lead(&self, organisor_token: &str, first_name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/v1/leads",
                organisor_token,
                json!({
                    "first_name": first_name,
                    "last_name": "Prospect",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        id_of(&body["data"])
    }
}

pub fn token_for(user_id: Uuid, role: AccountRole) -> String {
    create_token(&Claims::new(user_id, role, TokenType::Access), JWT_SECRET).unwrap()
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}
