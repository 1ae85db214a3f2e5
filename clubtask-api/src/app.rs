/// Application state and router builder
///
/// This module defines the shared application state, connects the configured
/// sheet store, and builds the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use clubtask_api::{app::{build_router, connect_store, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store = connect_store(&config.store).await?;
/// let app = build_router(AppState::new(store, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, StoreBackend, StoreConfig},
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use clubtask_shared::{
    auth::middleware::jwt_auth_middleware,
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
        sheet_store::PgSheetStore,
    },
    services::{membership::MembershipService, tasks::TaskService},
    store::{
        cache::SnapshotCache,
        google::{GoogleSheetsConfig, GoogleSheetsStore},
        members::MemberSheet,
        memory::MemorySheetStore,
        tasks::TaskSheet,
        SheetStore,
    },
};
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Everything
/// inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Backend holding both tables
    pub store: Arc<dyn SheetStore>,

    /// Snapshot cache shared by both table adapters
    pub cache: Arc<SnapshotCache>,

    /// Membership lifecycle operations
    pub members: MembershipService,

    /// Task operations
    pub tasks: TaskService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state over `store`
    pub fn new(store: Arc<dyn SheetStore>, config: Config) -> Self {
        let cache = Arc::new(SnapshotCache::new(Duration::from_secs(
            config.store.cache_ttl_secs,
        )));

        Self {
            members: MembershipService::new(MemberSheet::new(store.clone(), cache.clone())),
            tasks: TaskService::new(TaskSheet::new(store.clone(), cache.clone())),
            store,
            cache,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Connects the configured sheet store
///
/// The postgres backend creates a pool and applies pending migrations first.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, or the
/// HTTP client for Google Sheets cannot be built
pub async fn connect_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SheetStore>> {
    info!(backend = config.backend.label(), "Connecting sheet store");

    let store: Arc<dyn SheetStore> = match &config.backend {
        StoreBackend::Memory => Arc::new(MemorySheetStore::new()),
        StoreBackend::Postgres {
            url,
            max_connections,
        } => {
            let pool = create_pool(DatabaseConfig {
                max_connections: *max_connections,
                ..DatabaseConfig::new(url.clone())
            })
            .await?;
            run_migrations(&pool).await?;
            Arc::new(PgSheetStore::new(pool))
        }
        StoreBackend::GoogleSheets {
            spreadsheet_id,
            access_token,
            api_base,
        } => {
            let mut sheets = GoogleSheetsConfig::new(spreadsheet_id.clone(), access_token.clone());
            if let Some(api_base) = api_base {
                sheets = sheets.with_api_base(api_base.clone());
            }
            Arc::new(GoogleSheetsStore::new(sheets)?)
        }
    };

    info!(backend = store.backend_name(), "Sheet store connected");
    Ok(store)
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/                       # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   └── GET  /bootstrap
///     ├── /me/                         # Any Active member (Devs always)
///     │   ├── GET  /tasks
///     │   ├── GET  /summary
///     │   └── PUT  /tasks/:task_id/status
///     ├── /tasks/                      # Core, Domain and Associate Heads
///     │   ├── POST /
///     │   ├── GET  /subordinates
///     │   └── GET  /assigned           # Any Active member
///     ├── /members/                    # Devs
///     │   ├── GET    /
///     │   ├── GET    /pending
///     │   ├── GET    /stats
///     │   ├── POST   /:name/approve | /reject | /suspend | /reactivate
///     │   ├── PUT    /:name/role
///     │   └── DELETE /:name
///     └── /admin/                      # Devs
///         ├── POST   /members/reset-status
///         ├── DELETE /tasks
///         └── POST   /cache/clear
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. Compression
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
/// 5. Authentication (everything under `/v1` except `/auth`)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/bootstrap", get(routes::auth::bootstrap));

    let me_routes = Router::new()
        .route("/tasks", get(routes::me::my_tasks))
        .route("/summary", get(routes::me::my_summary))
        .route("/tasks/:task_id/status", put(routes::me::update_task_status));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/subordinates", get(routes::tasks::list_subordinates))
        .route("/assigned", get(routes::tasks::team_view));

    let member_routes = Router::new()
        .route("/", get(routes::members::list_members))
        .route("/pending", get(routes::members::list_pending))
        .route("/stats", get(routes::members::member_stats))
        .route("/:name", delete(routes::members::delete_member))
        .route("/:name/approve", post(routes::members::approve_member))
        .route("/:name/reject", post(routes::members::reject_member))
        .route("/:name/suspend", post(routes::members::suspend_member))
        .route("/:name/reactivate", post(routes::members::reactivate_member))
        .route("/:name/role", put(routes::members::change_role));

    let admin_routes = Router::new()
        .route("/members/reset-status", post(routes::admin::reset_member_statuses))
        .route("/tasks", delete(routes::admin::clear_tasks))
        .route("/cache/clear", post(routes::admin::clear_cache));

    let protected_routes = Router::new()
        .nest("/me", me_routes)
        .nest("/tasks", task_routes)
        .nest("/members", member_routes)
        .nest("/admin", admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
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
            .max_age(Duration::from_secs(3600))
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
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Validates the bearer token and stores an `AuthContext` on the request
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next)
        .await
        .map_err(ApiError::from)
}
