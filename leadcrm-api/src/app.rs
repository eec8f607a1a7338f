/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use leadcrm_api::{app::{build_router, AppState}, config::Config};
/// use leadcrm_shared::notify::LogNotifier;
/// use leadcrm_shared::services::CrmService;
/// use leadcrm_shared::store::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let service = CrmService::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(LogNotifier),
///     config.mail.notification_settings(),
/// );
/// let app = build_router(AppState::new(service, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::jwt_auth_layer, security::security_headers},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use leadcrm_shared::services::CrmService;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Business operations over the configured store and notifier
    pub service: CrmService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(service: CrmService, config: Config) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/
///     ├── /auth/                     # Public
///     │   ├── POST /signup
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /leads                     # Bearer token
///     │   ├── GET|POST /
///     │   ├── GET|PUT|DELETE /:id
///     │   ├── POST /:id/assign
///     │   └── PUT  /:id/category
///     ├── /agents                    # Bearer token, organisors only
///     │   ├── GET|POST /
///     │   └── GET|PUT|DELETE /:id
///     └── /categories                # Bearer token
///         ├── GET /
///         └── GET /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let crm_routes = Router::new()
        .route(
            "/leads",
            get(routes::leads::list_leads).post(routes::leads::create_lead),
        )
        .route(
            "/leads/:id",
            get(routes::leads::get_lead)
                .put(routes::leads::update_lead)
                .delete(routes::leads::delete_lead),
        )
        .route("/leads/:id/assign", post(routes::leads::assign_lead))
        .route("/leads/:id/category", put(routes::leads::update_lead_category))
        .route(
            "/agents",
            get(routes::agents::list_agents).post(routes::agents::create_agent),
        )
        .route(
            "/agents/:id",
            get(routes::agents::get_agent)
                .put(routes::agents::update_agent)
                .delete(routes::agents::delete_agent),
        )
        .route("/categories", get(routes::categories::list_categories))
        .route("/categories/:id", get(routes::categories::get_category))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(crm_routes);

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security_headers,
        ))
        .with_state(state)
}
