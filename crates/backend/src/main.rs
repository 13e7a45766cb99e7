mod assets;
mod replay;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{Html, Response};
use axum::{routing::get, Router};
use futures_util::{SinkExt, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use assets::Replay;
use replay::ReplayCursor;

#[derive(Clone)]
struct AppState {
    replay: Arc<Replay>,
    min_speed: i32,
    max_speed: i32,
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(state: AppState, assets_dir: &Path) -> Router {
    // Static file routers are stateless, merge them before adding app state
    let static_files = Router::new()
        .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
        .nest(
            "/dist",
            cached_static_router(Path::new("dist"), CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(Path::new("dist/assets"), CACHE_IMMUTABLE),
        );

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/", get(serve_index))
        .with_state(state)
        .merge(static_files)
        .layer(CorsLayer::permissive())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_replay(socket, state))
}

/// Play the replay to one viewer, applying its control commands between frames.
async fn stream_replay(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut cursor = ReplayCursor::new(state.replay, state.min_speed, state.max_speed);
    tracing::info!("viewer connected");

    let mut next_frame = tokio::time::Instant::now();
    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    for line in text.as_str().lines() {
                        cursor.apply_line(line);
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(%e, "socket error");
                    break;
                }
            },
            _ = tokio::time::sleep_until(next_frame) => {
                next_frame = tokio::time::Instant::now() + cursor.period();
                if let Some(line) = cursor.advance() {
                    if sender.send(Message::Text(line.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    tracing::info!(frame = cursor.position(), "viewer disconnected");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let assets_dir =
        PathBuf::from(std::env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()));
    let cfg = match assets::check_manifests(&assets_dir) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%e, "invalid client assets");
            std::process::exit(1);
        }
    };

    let replay_path = PathBuf::from(
        std::env::var("REPLAY_PATH").unwrap_or_else(|_| "replays/latest.jsonl".to_string()),
    );
    let replay = match Replay::load(&replay_path) {
        Ok(replay) => replay,
        Err(e) => {
            tracing::error!(%e, "cannot load replay");
            std::process::exit(1);
        }
    };

    let state = AppState {
        replay: Arc::new(replay),
        min_speed: cfg.min_speed,
        max_speed: cfg.max_speed,
    };
    let app = build_app(state, &assets_dir);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, %e, "bind failed");
            std::process::exit(1);
        }
    };
    tracing::info!("Server running at http://localhost:{}", port);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(%e, "server stopped");
    }
}

async fn serve_index() -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match std::fs::read_to_string("dist/index.html") {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>MiniRTS Viewer</title></head>
<body>
<h1>MiniRTS Viewer</h1>
<p>Frontend not built yet. The replay stream is live at <code>/ws</code>.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}
