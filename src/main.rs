use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use skydesk::config::AppConfig;
use skydesk::db::{self, BookingStore, FlightStore, SqliteStore};
use skydesk::handlers;
use skydesk::services::ai::groq::GroqProvider;
use skydesk::services::ai::ollama::OllamaProvider;
use skydesk::services::ai::LlmProvider;
use skydesk::services::orchestrator::Orchestrator;
use skydesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = SqliteStore::open(&config.database_url)?;
    if config.seed_demo_flights {
        db::seed::seed_demo_flights(&store)?;
    }
    let flights: Arc<dyn FlightStore> = Arc::new(store.clone());
    let bookings: Arc<dyn BookingStore> = Arc::new(store);

    let llm: Arc<dyn LlmProvider> = match config.llm_provider.as_str() {
        "groq" => {
            anyhow::ensure!(
                !config.groq_api_key.is_empty(),
                "GROQ_API_KEY must be set when LLM_PROVIDER=groq"
            );
            tracing::info!("using Groq LLM provider (model: {})", config.groq_model);
            Arc::new(GroqProvider::new(config.groq_api_key.clone(), config.groq_model.clone()))
        }
        _ => {
            tracing::info!(
                "using Ollama LLM provider (url: {}, model: {})",
                config.ollama_url,
                config.ollama_model
            );
            Arc::new(OllamaProvider::new(config.ollama_url.clone(), config.ollama_model.clone()))
        }
    };

    let orchestrator = Orchestrator::new(
        llm,
        flights.clone(),
        bookings.clone(),
        config.llm_timeout,
    );

    let state = Arc::new(AppState {
        orchestrator,
        flights,
        bookings,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/chat/status", get(handlers::chat::chat_status))
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route(
            "/api/bookings/:confirmation",
            get(handlers::bookings::get_booking),
        )
        .route("/api/flights", get(handlers::flights::list_flights))
        .route(
            "/api/flights/:flight_number",
            get(handlers::flights::get_flight),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
