mod analysis;
mod chat;
mod config;
mod errors;
mod routes;
mod state;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::client::OpenAiAssistants;
use crate::analysis::poller::PollConfig;
use crate::analysis::saga::AnalysisSaga;
use crate::chat::client::ChatClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{crate_target}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Assistants API client + analysis saga
    let assistants = Arc::new(OpenAiAssistants::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));
    let analysis = AnalysisSaga::new(
        assistants,
        PollConfig {
            timeout: config.run_timeout,
            interval: config.poll_interval,
        },
    );
    info!(
        "Analysis saga initialized (run timeout {:?}, poll interval {:?})",
        config.run_timeout, config.poll_interval
    );

    // Chat completions client for the resume Q&A feature
    let chat = ChatClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    );
    info!("Chat client initialized (model: {})", chat::client::CHAT_MODEL);

    let state = AppState {
        analysis,
        chat,
        conversations: Arc::new(Mutex::new(HashMap::new())),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
