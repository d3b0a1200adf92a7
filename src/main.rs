use std::net::SocketAddr;
use std::sync::Arc;

use app_planner::agent::AppPlannerAgent;
use app_planner::config::AppConfig;
use app_planner::llm::OpenAiClient;
use app_planner::AppState;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            tracing::info!("Set OPENAI_API_KEY (and optionally PORT, OPENAI_MODEL, OPENAI_BASE_URL) in the environment or .env");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Completion client: model {} at {} (timeout {:?}, retry budget {:?})",
        config.llm.model,
        config.llm.base_url,
        config.llm.request_timeout,
        config.llm.retry_budget
    );
    let client = Arc::new(OpenAiClient::new(&config.llm));

    let shared_state = Arc::new(AppState {
        agent: AppPlannerAgent::new(client),
    });
    let app = app_planner::app(shared_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Server running on port {}", config.port);

    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await {
        tracing::error!("Server error: {}", e);
    }
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,app_planner=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,app_planner=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    tracing::info!("App planner starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Build mode: {}", if cfg!(debug_assertions) { "development" } else { "production" });
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
