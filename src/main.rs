use anyhow::Context;
use product_analyzer::{
    api::{build_router, AppState},
    logging, Config, InMemoryStore, LlmClient, ProductAnalyzer, ReportGenerator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("loading configuration")?;

    logging::init(&config.logging).context("initializing logging")?;

    info!("Starting product analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        model = %config.llm.model,
        api_url = %config.llm.api_url,
        max_concurrent_requests = config.llm.max_concurrent_requests,
        "Generative-text service configured"
    );
    if !config.llm.has_api_key() {
        warn!(
            "No API key found (set {}); report generation will fail until one is provided",
            config.llm.api_key_env
        );
    }

    let client = LlmClient::new(config.llm.clone()).context("building LLM client")?;
    let reports = ReportGenerator::new(Arc::new(client), &config.llm, &config.report);
    let analyzer = ProductAnalyzer::new(Arc::new(InMemoryStore::new()), reports);

    let state = AppState {
        analyzer: Arc::new(analyzer),
        default_professional: config.report.default_professional,
    };
    let app = build_router(state, config.server.max_body_bytes);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
