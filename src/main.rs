use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use rideready::config::{LoggingSettings, Settings};
use rideready::core::{Catalog, Recommender};
use rideready::models::{KeysPresent, ScoringWeights};
use rideready::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use rideready::services::{ImageResolver, ImageSearchClient, NluClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    let logging = logging.with_env_overrides(|name| std::env::var(name).ok());

    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn build_image_resolver(settings: &Settings) -> ImageResolver {
    let images = &settings.images;
    let manifest = ImageResolver::load_manifest(&images.manifest_path);

    let search = images.search_credentials().and_then(|(key, cx)| {
        ImageSearchClient::new(
            images.search_endpoint.clone(),
            key.to_string(),
            cx.to_string(),
            Duration::from_secs(images.timeout_secs),
        )
        .map_err(|e| warn!("Image search client unavailable, running offline: {}", e))
        .ok()
    });

    if search.is_none() {
        info!("Image search not configured, serving local images only");
    }

    ImageResolver::new(
        manifest,
        images.static_prefix.clone(),
        images.fallback_image.clone(),
        search,
        images.cache_size,
        images.cache_ttl_secs,
    )
}

fn build_nlu_client(settings: &Settings) -> NluClient {
    let nlu = &settings.nlu;
    let Some(api_key) = nlu.active_key() else {
        info!("Chat model disabled, using keyword rules");
        return NluClient::keyword_only();
    };

    match NluClient::with_model(
        nlu.endpoint.clone(),
        api_key.to_string(),
        nlu.model.clone(),
        Duration::from_secs(nlu.timeout_secs),
    ) {
        Ok(client) => {
            info!("Chat model enabled: {}", nlu.model);
            client
        }
        Err(e) => {
            warn!("Chat model client unavailable, using keyword rules: {}", e);
            NluClient::keyword_only()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // The subscriber reads the [logging] section
    let settings = Settings::load();
    let logging = settings.as_ref().map(|s| s.logging.clone()).unwrap_or_default();
    init_tracing(&logging);

    info!("Starting RideReady recommendation service...");

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    info!("Configuration loaded successfully");

    // Loaded once; handlers only read it
    let catalog = match Catalog::load(&settings.catalog.path) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("Catalog {} unavailable, starting empty: {}", settings.catalog.path, e);
            Catalog::default()
        }
    };

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let recommender = Recommender::new(weights)
        .with_default_k(settings.recommend.default_k, settings.recommend.chat_default_k)
        .with_top_up(settings.recommend.top_up);

    info!("Recommender initialized with weights: {:?}", weights);

    let keys = KeysPresent {
        google_cse_key: settings.images.google_cse_key.as_deref().is_some_and(|k| !k.is_empty()),
        google_cse_cx: settings.images.google_cse_cx.as_deref().is_some_and(|c| !c.is_empty()),
        openai: settings.nlu.api_key.as_deref().is_some_and(|k| !k.is_empty()),
    };

    let app_state = AppState {
        catalog: Arc::new(catalog),
        recommender,
        images: Arc::new(build_image_resolver(&settings)),
        nlu: Arc::new(build_nlu_client(&settings)),
        keys,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(routes::security_headers())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
