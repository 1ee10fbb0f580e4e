//!
//! Parking reservation service over two calendar-backed spots.
//! Reads configuration from TOML file (~/.config/parking-service/config.toml).

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use beatrice_parking::api::handlers::AppState;
use beatrice_parking::application::{AvailabilityService, BookingService};
use beatrice_parking::infrastructure::{
    GoogleCalendarConfig, GoogleCalendarStore, IcsFeed, TokenProvider,
};
use beatrice_parking::support::shutdown::{listen_for_shutdown_signals, ShutdownSignal};
use beatrice_parking::{create_api_router, default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("PARKING_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting parking reservation service...");

    if config.google.calendar_id_northern.is_empty() || config.google.calendar_id_southern.is_empty()
    {
        warn!("Calendar ids are not configured; store writes will fail until they are");
    }

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("Prometheus metrics recorder installed");

    // ── Calendar collaborators ─────────────────────────────────
    // One bounded-timeout HTTP client shared by the store, the token
    // endpoint, and the feed; the store can be rate-limited or slow
    // and a hung call must not hang a request handler.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.http_timeout_secs))
        .build()?;

    let auth = Arc::new(TokenProvider::new(
        http.clone(),
        config.google.client_email.clone(),
        config.google_private_key(),
    ));

    let store = Arc::new(GoogleCalendarStore::new(
        http.clone(),
        auth,
        GoogleCalendarConfig {
            calendar_id_northern: config.google.calendar_id_northern.clone(),
            calendar_id_southern: config.google.calendar_id_southern.clone(),
            owner_email: config.google.owner_email.clone(),
            app_offset: config.app_offset(),
        },
    ));

    let feed = Arc::new(IcsFeed::new(
        http,
        config.google.ics_url_northern.clone(),
        config.google.ics_url_southern.clone(),
        config.app_offset(),
    ));

    // ── Services ───────────────────────────────────────────────
    let availability = Arc::new(AvailabilityService::new(feed.clone()));
    let booking = Arc::new(BookingService::new(
        AvailabilityService::new(feed),
        store,
        config.window_policy(),
        config.rate_card(),
    ));

    let state = AppState {
        booking,
        availability,
        rates: config.rate_card(),
        app_offset: config.app_offset(),
        metrics: prometheus_handle,
    };

    // ── HTTP server with graceful shutdown ─────────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let router = create_api_router(state);
    let address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("REST API server listening on http://{}", address);
    info!("Swagger UI available at http://{}/docs/", address);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            server_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await?;

    info!("Parking reservation service shutdown complete");
    Ok(())
}
