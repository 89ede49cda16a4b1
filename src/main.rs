use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use curio::constants::{
    DB_HEALTH_CHECK_INTERVAL_SECS, DEFAULT_HOST, DEFAULT_PORT, MAX_REQUEST_BODY_SIZE,
};
use curio::{AppState, IssuerClient, MongoArtifactStore, create_database_connection, routes};
use dotenv::dotenv;
use governor::middleware::NoOpMiddleware;
use http::Method;
use http::header::{CONTENT_TYPE, HeaderName};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, warn};

type SecurityHeaderLayer =
    SetResponseHeaderLayer<fn(&http::Response<axum::body::Body>) -> Option<HeaderValue>>;

fn configure_cors() -> CorsLayer {
    let origins = env::var("CORS_ALLOWED_ORIGINS").ok();

    match origins.as_deref() {
        Some("*") => {
            warn!("CORS configured for all origins - use specific origins in production!");
            CorsLayer::permissive()
        }
        Some(origins_str) => {
            let valid_origins: Vec<HeaderValue> = origins_str
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if valid_origins.is_empty() {
                warn!("No valid CORS origins parsed, CORS will reject cross-origin requests");
                CorsLayer::new()
            } else {
                info!("CORS configured for {} origins", valid_origins.len());
                CorsLayer::new()
                    .allow_origin(valid_origins)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PATCH,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([CONTENT_TYPE, HeaderName::from_static("authorization")])
            }
        }
        None => {
            warn!("CORS_ALLOWED_ORIGINS not set - defaulting to permissive for development");
            CorsLayer::permissive()
        }
    }
}

fn configure_rate_limiter() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware, axum::body::Body> {
    let per_second = env::var("RATE_LIMIT_PER_SECOND")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(50u64);

    let burst_size = env::var("RATE_LIMIT_BURST")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(150u32);

    info!("Rate limiting: {} req/s, burst: {}", per_second, burst_size);

    let config = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst_size)
        .finish()
        .expect("Failed to build rate limiter config");

    GovernorLayer::new(config)
}

fn security_headers_layer() -> SecurityHeaderLayer {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        |_res: &http::Response<axum::body::Body>| Some(HeaderValue::from_static("nosniff")),
    )
}

fn frame_options_layer() -> SecurityHeaderLayer {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        |_res: &http::Response<axum::body::Body>| Some(HeaderValue::from_static("DENY")),
    )
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Artifacts Server");
    info!("Connecting to database...");

    let client = match create_database_connection().await {
        Ok(client) => {
            info!("Database connection successful");
            client
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(MongoArtifactStore::new(&client));
    let verifier = Arc::new(IssuerClient::from_env());
    let state = AppState::new(store, verifier);

    let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let server_port = env::var("SERVER_PORT")
        .or_else(|_| env::var("PORT"))
        .unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let bind_address = format!("{}:{}", server_host, server_port);

    let rate_limit_enabled = env::var("RATE_LIMIT_ENABLED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(true);

    let cors = configure_cors();

    let app = routes::register_routes()
        .layer(axum::extract::Extension(state.clone()))
        .layer(cors)
        .layer(security_headers_layer())
        .layer(frame_options_layer())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_SIZE));

    let app = if rate_limit_enabled {
        info!("Rate limiting enabled");
        app.layer(configure_rate_limiter())
    } else {
        warn!("Rate limiting disabled");
        app
    };

    let listener = TcpListener::bind(&bind_address).await.unwrap_or_else(|e| {
        error!("Failed to bind to address {}: {}", bind_address, e);
        std::process::exit(1);
    });

    info!("Server running on http://{}", bind_address);

    let health_check_store = state.store.clone();
    tokio::spawn(async move {
        let mut consecutive_failures = 0;
        const MAX_CONSECUTIVE_FAILURES: u32 = 3;

        loop {
            tokio::time::sleep(Duration::from_secs(DB_HEALTH_CHECK_INTERVAL_SECS)).await;

            match health_check_store.health_check().await {
                Ok(_) => {
                    if consecutive_failures > 0 {
                        info!("Database connection restored");
                        consecutive_failures = 0;
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    error!(
                        "Database health check failed ({}/{}): {}",
                        consecutive_failures, MAX_CONSECUTIVE_FAILURES, e
                    );

                    if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        error!(
                            "Database connection lost after {} consecutive failures, shutting down",
                            MAX_CONSECUTIVE_FAILURES
                        );
                        std::process::exit(1);
                    }
                }
            }
        }
    });

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server failed to start: {}", e);
        std::process::exit(1);
    }
}
