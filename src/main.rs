//! Triage intake - AI-assisted medical intake service
//!
//! Walks a patient through a fixed intake interview, asks a few generated
//! follow-up questions and returns a preliminary assessment.

mod api;
mod catalog;
mod config;
mod dedup;
mod llm;
mod prompt;
mod runtime;
mod similarity;
mod state_machine;

use api::{create_router, AppState};
use axum::http::{header, HeaderValue, Method};
use config::AppConfig;
use dedup::QuestionDeduper;
use runtime::{IntakeEngine, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on how often idle sessions are swept
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triage_intake=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    let llm = llm::create_service(&config.gemini)?;
    if config.gemini.api_key.is_none() && config.gemini.gateway.is_none() {
        tracing::warn!(
            "No generation API key configured. Set GEMINI_API_KEY or LLM_GATEWAY; \
             follow-up questions and assessments will use fallback texts."
        );
    } else {
        tracing::info!(model = %llm.model_id(), "Generation service initialized");
    }

    let engine = IntakeEngine::new(llm, QuestionDeduper::new(config.max_question_attempts));
    let sessions = Arc::new(SessionManager::new(engine, config.session_idle_timeout));
    spawn_idle_sweeper(sessions.clone());

    let app = create_router(AppState::new(sessions))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Triage intake server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn spawn_idle_sweeper(sessions: Arc<SessionManager>) {
    let period = sessions
        .idle_timeout()
        .min(MAX_SWEEP_INTERVAL)
        .max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            sessions.evict_idle().await;
        }
    });
}
