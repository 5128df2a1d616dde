use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alumni_registry::config::AppConfig;
use alumni_registry::error::AppError;
use alumni_registry::outbound::{FsDocumentStore, TracingNotifier};
use alumni_registry::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::infra::{build_registry, seed_admin, AppState, RegistryOptions, Snapshot};
use crate::routes::registry_routes;

fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args);
    telemetry::init(&config.telemetry)?;

    let (metrics_layer, metrics) = PrometheusMetricLayer::pair();
    let ready = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: Arc::clone(&ready),
        metrics: Arc::new(metrics),
    };

    let now = Utc::now();
    let registry = build_registry(
        RegistryOptions {
            frontend_url: config.portal.frontend_url.clone(),
            documents: Arc::new(FsDocumentStore::new(&config.portal.document_root)),
            notifier: Arc::new(TracingNotifier),
            passwords: None,
        },
        Snapshot::default(),
        now,
    )?;
    seed_admin(&registry, &config.admin, now)?;
    if config.admin.token.is_none() {
        warn!("APP_ADMIN_TOKEN is not set; approval routes will refuse every caller");
    }

    let app = registry_routes(&registry)
        .layer(Extension(state))
        .layer(metrics_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ready.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        document_root = %config.portal.document_root.display(),
        "alumni registry ready"
    );

    axum::serve(listener, app).await.map_err(AppError::from)
}
