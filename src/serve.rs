use crate::logging::log_event;
use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    Router,
};
use log::Level;
use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

const REQUEST_ID_HEADER: &str = "x-request-id";
const DATA_PATH_PREFIX: &str = "/data/";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub port: u16,
    pub dist_dir: PathBuf,
}

/// Static files from the Trunk output. Unknown paths fall back to `index.html` so the
/// `/gallery` and `/albums` routes resolve client-side.
pub fn router(dist_dir: &Path) -> Router {
    let static_service =
        ServeDir::new(dist_dir).fallback(ServeFile::new(dist_dir.join("index.html")));

    Router::new()
        .fallback_service(static_service)
        .layer(middleware::from_fn(log_requests))
}

pub async fn run(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    log_event(
        Level::Info,
        "server_listening",
        serde_json::json!({
            "url": format!("http://127.0.0.1:{}", config.port),
            "dist_dir": config.dist_dir.display().to_string(),
        }),
    );

    serve_on(listener, &config.dist_dir).await
}

pub async fn serve_on(
    listener: TcpListener,
    dist_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    axum::serve(listener, router(dist_dir)).await?;
    Ok(())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(generate_request_id);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    if path.starts_with(DATA_PATH_PREFIX) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    log_event(
        Level::Info,
        "request_complete",
        serde_json::json!({
            "request_id": request_id,
            "method": method.as_str(),
            "path": path,
            "status": response.status().as_u16(),
            "duration_ms": started_at.elapsed().as_millis(),
        }),
    );

    response
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0);
    format!("req-{millis}-{counter}")
}
