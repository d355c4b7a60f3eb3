use anyhow::{Context, Result};
use std::sync::Arc;

use estimator_backend::{
    app,
    config::Settings,
    estimation::{
        BrandCatalog, BrandResolver, CurrencyService, EstimationPipeline, LocationPricing,
        PriceAdjuster, TakeoffEngine, TakeoffTable,
    },
    logging,
    services::AiClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        ai_adjustment = settings.ai_adjustment_enabled,
        "Starting estimator backend"
    );

    // Lookup tables, loaded once and read-only from here on
    let table = match &settings.takeoff_table_path {
        Some(path) => TakeoffTable::from_path(path)?,
        None => TakeoffTable::bundled()?,
    };
    let catalog = match &settings.brand_catalog_path {
        Some(path) => BrandCatalog::from_path(path)?,
        None => BrandCatalog::bundled()?,
    };
    tracing::info!(brands = catalog.entries().len(), "Estimation tables loaded");

    let config = settings.estimator_config();

    let ai_client = if config.ai_adjustment_enabled {
        let client = AiClient::new(
            &settings.ai_service_url,
            &settings.ai_service_token,
            config.ai_timeout(),
        )?;

        // Check AI service health (non-blocking)
        tokio::spawn({
            let client = client.clone();
            async move {
                match client.health_check().await {
                    Ok(()) => tracing::info!("AI service is healthy"),
                    Err(e) => tracing::warn!(error = %e, "AI service health check failed - estimates will use base prices until it recovers"),
                }
            }
        });
        Some(client)
    } else {
        None
    };

    let adjuster = match &ai_client {
        Some(client) => {
            let source: Arc<dyn LocationPricing> = Arc::new(client.clone());
            PriceAdjuster::new(source, config.ai_timeout(), config.multiplier_bounds)
        }
        None => PriceAdjuster::disabled(),
    };

    let pipeline = EstimationPipeline::new(
        TakeoffEngine::new(table, config.waste_buffer_percent),
        BrandResolver::new(catalog),
        CurrencyService::default(),
        adjuster,
    );

    // Create application state
    let state = app::AppState::new(settings.clone(), pipeline, ai_client);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server_addr))?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
