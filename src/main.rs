use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use recomenda::config::{LoggingSettings, Settings};
use recomenda::core::{RecommendationRecorder, Recommender};
use recomenda::routes::{self, AppState};
use recomenda::services::{GatewayClient, OpenAiEmbedder, PostgresClient, SharedIndex, SimilarityIndexClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for malformed request bodies
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    #[serde(skip)]
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

/// Reload the opportunity index whenever the process receives SIGHUP
#[cfg(unix)]
async fn reload_index_on_hangup(index: Arc<SharedIndex>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to install SIGHUP handler, index reload disabled: {}", e);
            return;
        }
    };

    while hangups.recv().await.is_some() {
        info!("SIGHUP received, reloading opportunity index");
        if let Err(e) = index.reload().await {
            error!("Index reload failed, keeping previous index: {}", e);
        }
    }
}

fn startup_error(what: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, err);
    std::io::Error::other(format!("{}: {}", what, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    init_logging(
        settings
            .as_ref()
            .map(|s| &s.logging)
            .unwrap_or(&LoggingSettings::default()),
    );

    info!("Starting Recomenda service...");

    let settings = settings.map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    let gateway = Arc::new(
        GatewayClient::new(
            settings.gateway.url.clone(),
            Duration::from_secs(settings.gateway.timeout_secs.unwrap_or(10)),
        )
        .map_err(|e| startup_error("Failed to build gateway client", e))?,
    );

    info!("Gateway client initialized for {}", settings.gateway.url);

    let embedder = Arc::new(
        OpenAiEmbedder::new(
            settings.embeddings.endpoint.clone(),
            settings.embeddings.api_key.clone(),
            settings.embeddings.model.clone(),
            Duration::from_secs(settings.embeddings.timeout_secs.unwrap_or(30)),
        )
        .map_err(|e| startup_error("Failed to build embeddings client", e))?,
    );

    // A missing or corrupt index is fatal
    let index = Arc::new(
        SharedIndex::load(&settings.index.path)
            .await
            .map_err(|e| startup_error("Failed to load opportunity index", e))?,
    );

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );

    info!("PostgreSQL client initialized");

    let recorder = RecommendationRecorder::new(
        gateway.clone(),
        postgres.clone(),
        settings.search.recording_policy,
    );

    let selector = settings.search.selector();

    let recommender = Recommender::new(
        gateway,
        Arc::new(SimilarityIndexClient::new(embedder, index.clone())),
        recorder,
        selector,
    );

    info!(
        "Recommender initialized ({:?}, recording policy: {:?})",
        selector, settings.search.recording_policy
    );

    #[cfg(unix)]
    actix_web::rt::spawn(reload_index_on_hangup(index.clone()));

    let app_state = AppState {
        recommender: Arc::new(recommender),
        store: postgres,
        index,
        propagate_upstream_status: settings.search.propagate_upstream_status,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
