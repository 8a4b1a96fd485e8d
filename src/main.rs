use std::sync::Arc;

use clap::Parser;
use journey_rs::api;
use journey_rs::http_client::ProxyConfig;
use journey_rs::identity::{HttpIdentityService, IdentityService};
use journey_rs::journey::StepRegistry;
use journey_rs::model::arg::Args;
use journey_rs::model::config::Config;
use journey_rs::session::{SessionState, SessionStore};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {}", e);
        std::process::exit(1);
    });

    let proxy_config = ProxyConfig::from_config(&config);
    if let Some(proxy) = &proxy_config {
        tracing::info!("HTTP proxy configured: {}", proxy.url);
    }

    let identity: Arc<dyn IdentityService> = Arc::new(
        HttpIdentityService::new(&config, proxy_config.as_ref()).unwrap_or_else(|e| {
            tracing::error!("Failed to create identity client: {}", e);
            std::process::exit(1);
        }),
    );

    let registry = StepRegistry::with_defaults(config.form_steps.clone()).unwrap_or_else(|e| {
        tracing::error!("Invalid formSteps configuration: {}", e);
        std::process::exit(1);
    });
    tracing::info!("Step renderers bound: {}", registry.tags().join(", "));

    // Session store, with every change logged
    let store = SessionStore::new(SessionState::anonymous());
    let _session_log = store.subscribe(|state| match state.user_info() {
        Some(user) if state.is_authenticated() => {
            tracing::info!(
                "Session authenticated: {}",
                user.name().or_else(|| user.email()).unwrap_or("unknown user")
            );
        }
        _ => {
            tracing::info!("Session cleared");
        }
    });

    let service = Arc::new(api::SessionService::new(
        &config,
        identity,
        Arc::new(registry),
        store,
    ));

    let api_key = config.effective_api_key();
    if config.api_key.is_some() && api_key.is_none() {
        tracing::warn!("apiKey is empty, API authentication not enabled");
    }
    let app = api::create_router(service, api_key);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting session API endpoint: {}", addr);
    tracing::info!("Identity service: {}", config.identity_url);
    tracing::info!("Default journey: {}", config.default_journey);
    tracing::info!("Available APIs:");
    tracing::info!("  GET  /api/session");
    tracing::info!("  GET  /api/renderers/{{tag}}");
    tracing::info!("  GET  /api/journey");
    tracing::info!("  POST /api/journey/start");
    tracing::info!("  POST /api/journey/submit");
    tracing::info!("  POST /api/logout");
    tracing::info!("  POST /api/logout/cancel-redirect");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        });
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
