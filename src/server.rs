//! # Server Configuration
//!
//! Router assembly, shared state and the OpenAPI document for wedsite.
//!
//! The tenant resolver wraps the whole router rather than being a route
//! layer: it has to rewrite tenant hosts to `/{subdomain}{path}` before route
//! matching happens.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use tower::Layer;
use tower_http::trace::TraceLayer;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, TenantLookupMode};
use crate::domains::{DomainProvider, HttpDomainProvider};
use crate::handlers::{
    self, admin, auth, dashboard, domains, events, guests, internal, registry, seating, site,
};
use crate::routing::{
    DatabaseTenantLookup, HttpTenantLookup, TenantLookup, TenantResolver, resolve_tenant,
};
use crate::telemetry::trace_context_middleware;

/// Room for multipart framing on top of the configured import ceiling.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    /// Used by the resolver for custom-domain hosts
    pub tenant_lookup: Arc<dyn TenantLookup>,
    /// `None` when no domain provider credentials are configured
    pub domain_provider: Option<Arc<dyn DomainProvider>>,
}

impl AppState {
    /// State with in-process tenant lookup and the provider taken from config.
    pub fn new(config: Arc<AppConfig>, db: DatabaseConnection) -> Self {
        let domain_provider = HttpDomainProvider::from_config(&config)
            .map(|provider| Arc::new(provider) as Arc<dyn DomainProvider>);
        Self {
            tenant_lookup: Arc::new(DatabaseTenantLookup::new(db.clone())),
            config,
            db,
            domain_provider,
        }
    }
}

fn api_routes(config: &AppConfig) -> Router<AppState> {
    let import_limit = config.import_max_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/internal/tenants/lookup", get(internal::lookup_tenant))
        .route(
            "/api/dashboard/wedding",
            get(dashboard::get_wedding).put(dashboard::update_wedding),
        )
        .route(
            "/api/dashboard/guests",
            get(guests::list_guests).post(guests::create_guest),
        )
        .route(
            "/api/dashboard/guests/import",
            post(guests::import_guests).layer(DefaultBodyLimit::max(import_limit)),
        )
        .route("/api/dashboard/guests/export", get(guests::export_guests))
        .route("/api/dashboard/guests/{guest_id}", delete(guests::delete_guest))
        .route(
            "/api/dashboard/guests/{guest_id}/table",
            put(guests::assign_table),
        )
        .route(
            "/api/dashboard/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/dashboard/events/{event_id}/invitations",
            post(events::invite_guests),
        )
        .route(
            "/api/dashboard/events/{event_id}/stats",
            get(events::event_stats),
        )
        .route("/api/dashboard/rsvp/stats", get(events::rsvp_stats))
        .route(
            "/api/dashboard/seating/tables",
            get(seating::list_tables).post(seating::create_table),
        )
        .route("/api/dashboard/seating/export", get(seating::export_seating))
        .route(
            "/api/dashboard/domain",
            get(domains::get_domain)
                .post(domains::add_domain)
                .delete(domains::remove_domain),
        )
        .route("/api/dashboard/domain/verify", post(domains::verify_domain))
        .route(
            "/api/dashboard/gifts",
            get(registry::list_gifts).post(registry::create_gift),
        )
        .route("/api/dashboard/gifts/{gift_id}", delete(registry::delete_gift))
        .route("/api/dashboard/photos", get(registry::list_photos))
        .route(
            "/api/dashboard/photos/{photo_id}",
            put(registry::moderate_photo),
        )
        .route("/api/admin/tenants", get(admin::list_tenants))
        .route("/api/admin/tenants/{tenant_id}", delete(admin::delete_tenant))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/login", get(handlers::login_page))
        .route("/dashboard", get(dashboard::home))
        .route("/admin", get(admin::home))
}

fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/{subdomain}", get(site::get_site))
        .route("/{subdomain}/rsvp/lookup", get(site::lookup_guest))
        .route("/{subdomain}/rsvp", post(site::submit_rsvp))
        .route("/{subdomain}/registry", get(site::list_registry))
        .route(
            "/{subdomain}/registry/{gift_id}/claim",
            post(site::claim_gift),
        )
        .route(
            "/{subdomain}/photos",
            get(site::list_photos).post(site::submit_photo),
        )
}

/// Creates and configures the Axum application router
///
/// Requests pass through trace context, then tenant resolution, then routing.
pub fn create_app(state: AppState) -> Router {
    let resolver = TenantResolver {
        config: Arc::clone(&state.config),
        lookup: Arc::clone(&state.tenant_lookup),
    };

    let routes = Router::new()
        .merge(api_routes(&state.config))
        .merge(page_routes())
        .merge(site_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()));

    let resolved = middleware::from_fn_with_state(resolver, resolve_tenant).layer(routes);

    Router::new()
        .fallback_service(resolved)
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Picks the tenant lookup strategy configured for this deployment.
pub fn tenant_lookup_for(
    config: &AppConfig,
    db: &DatabaseConnection,
) -> anyhow::Result<Arc<dyn TenantLookup>> {
    Ok(match config.tenant_lookup_mode {
        TenantLookupMode::Database => Arc::new(DatabaseTenantLookup::new(db.clone())),
        TenantLookupMode::Http => Arc::new(HttpTenantLookup::from_config(config)?),
    })
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    let config = Arc::new(config);
    let mut state = AppState::new(Arc::clone(&config), db);
    state.tenant_lookup = tenant_lookup_for(&config, &state.db)?;
    if state.domain_provider.is_none() {
        tracing::warn!("Domain provider not configured; custom domain management disabled");
    }

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %addr,
        profile = %config.profile,
        root_domain = %config.root_domain,
        "Server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "internal_secret",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-internal-secret"))),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::login_page,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::internal::lookup_tenant,
        crate::handlers::dashboard::home,
        crate::handlers::dashboard::get_wedding,
        crate::handlers::dashboard::update_wedding,
        crate::handlers::guests::list_guests,
        crate::handlers::guests::create_guest,
        crate::handlers::guests::delete_guest,
        crate::handlers::guests::assign_table,
        crate::handlers::guests::import_guests,
        crate::handlers::guests::export_guests,
        crate::handlers::events::list_events,
        crate::handlers::events::create_event,
        crate::handlers::events::invite_guests,
        crate::handlers::events::event_stats,
        crate::handlers::events::rsvp_stats,
        crate::handlers::seating::list_tables,
        crate::handlers::seating::create_table,
        crate::handlers::seating::export_seating,
        crate::handlers::domains::get_domain,
        crate::handlers::domains::add_domain,
        crate::handlers::domains::remove_domain,
        crate::handlers::domains::verify_domain,
        crate::handlers::registry::list_gifts,
        crate::handlers::registry::create_gift,
        crate::handlers::registry::delete_gift,
        crate::handlers::registry::list_photos,
        crate::handlers::registry::moderate_photo,
        crate::handlers::admin::home,
        crate::handlers::admin::list_tenants,
        crate::handlers::admin::delete_tenant,
        crate::handlers::site::get_site,
        crate::handlers::site::lookup_guest,
        crate::handlers::site::submit_rsvp,
        crate::handlers::site::list_registry,
        crate::handlers::site::claim_gift,
        crate::handlers::site::list_photos,
        crate::handlers::site::submit_photo,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::models::sections::ContentSection,
            crate::models::sections::ThemeSettings,
            crate::rsvp::RsvpState,
            crate::rsvp::RsvpStats,
            crate::rsvp::EventRsvpStats,
            crate::rsvp::GuestEventStatus,
            crate::rsvp::import::ImportSummary,
            crate::domains::DomainView,
            crate::routing::TenantLookupResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "site", description = "Public wedding sites"),
        (name = "auth", description = "Signup and login"),
        (name = "dashboard", description = "Couple dashboard"),
        (name = "guests", description = "Guest list, import and export"),
        (name = "events", description = "Events, invitations and RSVP statistics"),
        (name = "seating", description = "Seating tables"),
        (name = "domains", description = "Custom domains"),
        (name = "registry", description = "Gift registry"),
        (name = "photos", description = "Guest photo moderation"),
        (name = "admin", description = "Platform back-office"),
        (name = "internal", description = "Service-to-service endpoints"),
    ),
    info(
        title = "Wedsite API",
        description = "Multi-tenant wedding websites with guest RSVP tracking",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
