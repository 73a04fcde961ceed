use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_project_auth};
use crate::routes::{health, notifications, projects, templates};
use crate::services::EmailAdapter;
use domain::services::DispatchService;
use persistence::repositories::{
    DeliveryAttemptRepository, NotificationDefinitionRepository, TemplateRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub dispatch: Arc<DispatchService>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    // The dispatch service gets its stores and adapters injected explicitly;
    // handlers construct repositories per request for everything else.
    let dispatch = DispatchService::new(
        Arc::new(NotificationDefinitionRepository::new(pool.clone())),
        Arc::new(TemplateRepository::new(pool.clone())),
        Arc::new(DeliveryAttemptRepository::new(pool.clone())),
    )
    .register_adapter(Arc::new(EmailAdapter::new(config.email.clone())))
    .with_transport_timeout(Duration::from_secs(config.dispatch.transport_timeout_secs));

    let state = AppState {
        pool,
        config: config.clone(),
        dispatch: Arc::new(dispatch),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Machine routes: authenticated by project API key
    let machine_routes = Router::new()
        .route(
            "/api/v1/notifications",
            post(notifications::submit_notification).get(notifications::list_definitions),
        )
        .route(
            "/api/v1/notifications/:definition_id/template",
            post(notifications::bind_template),
        )
        .route(
            "/api/v1/notifications/:definition_id/dispatch",
            post(notifications::dispatch_notification),
        )
        .route(
            "/api/v1/notifications/:definition_id/deliveries",
            get(notifications::delivery_history),
        )
        .route(
            "/api/v1/notifications/:definition_id/deliveries/last",
            get(notifications::last_delivery),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_project_auth,
        ));

    // User routes: identity resolved by the fronting auth layer
    let user_routes = Router::new()
        .route(
            "/api/v1/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/api/v1/projects/:project_id/rotate-key",
            post(projects::rotate_api_key),
        )
        .route(
            "/api/v1/projects/:project_id",
            delete(projects::delete_project),
        )
        .route(
            "/api/v1/templates",
            post(templates::create_template).get(templates::list_templates),
        )
        .route(
            "/api/v1/templates/:template_id",
            get(templates::get_template)
                .patch(templates::update_template)
                .delete(templates::delete_template),
        );

    Router::new()
        .merge(machine_routes)
        .merge(user_routes)
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .with_state(state)
}
