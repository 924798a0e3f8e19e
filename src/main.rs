use lead_qualifier::config::Config;
use lead_qualifier::handlers::{router, AppState};
use lead_qualifier::qualification::{LeadQualifier, QualifierSettings, SourceAdapters};
use lead_qualifier::services::ProfileApiClient;
use lead_qualifier::signals::Source;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Wires one HTTP profile client per configured provider.
fn build_adapters(config: &Config) -> anyhow::Result<SourceAdapters> {
    let mut adapters = SourceAdapters::default();

    for (source, endpoint) in config.endpoints() {
        let Some(endpoint) = endpoint else {
            continue;
        };
        let client = Arc::new(ProfileApiClient::new(source, endpoint, config.fetch_timeout)?);
        adapters = match source {
            Source::LinkedIn => adapters.with_linkedin(client),
            Source::Instagram => adapters.with_instagram(client),
            Source::Facebook => adapters.with_facebook(client),
            Source::Twitter => adapters.with_twitter(client),
        };
        tracing::info!("✓ {} profile client initialized", source);
    }

    Ok(adapters)
}

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, builds the qualifier with
/// its profile clients and starts the Axum server behind body-size,
/// rate-limit, trace and CORS layers.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_qualifier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let adapters = build_adapters(&config)?;
    let qualifier = LeadQualifier::new(
        adapters,
        QualifierSettings {
            policy: config.scoring.clone(),
            fetch_timeout: config.fetch_timeout,
            max_concurrent_leads: config.max_concurrent_leads,
        },
    );
    tracing::info!(
        "Lead qualifier ready (sources: {:?})",
        qualifier.configured_sources()
    );

    let app_state = Arc::new(AppState {
        qualifier: Arc::new(qualifier),
        config: config.clone(),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let app = router(app_state)
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
