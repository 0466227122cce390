use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::engine::{DEFAULT_CANVAS, SociogramEngine};
use crate::interaction::{EngineEvent, PointerEvent};
use crate::scene::Scene;
use crate::sociogram::Sociogram;
use crate::viewport::{ViewBox, ZoomDirection};

/// Arguments for running the sociogram sync API server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sociograph serve",
    about = "Serve the sociogram engine to a host frontend."
)]
pub struct ServeArgs {
    /// Path to the sociogram definition that should be served.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5151)]
    pub port: u16,

    /// Background color for rendered previews.
    #[arg(long = "background-color", default_value = "#ffffff")]
    pub background_color: String,
}

struct ServeState {
    source_path: PathBuf,
    engine: RwLock<SociogramEngine>,
    source: RwLock<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SociogramPayload {
    source_path: String,
    source: String,
    scene: Scene,
}

#[derive(Debug, Deserialize)]
struct SourceUpdateRequest {
    source: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoomRequest {
    direction: ZoomDirection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PointerResponse {
    event: Option<EngineEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse {
    view_box: ViewBox,
    zoom: f32,
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let source = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let graph = Sociogram::parse(&source)
        .with_context(|| format!("failed to parse '{}'", args.input.display()))?;

    let mut engine = SociogramEngine::new(graph, DEFAULT_CANVAS);
    engine.set_background(args.background_color.clone());

    let state = Arc::new(ServeState {
        source_path: args.input.clone(),
        engine: RwLock::new(engine),
        source: RwLock::new(source),
    });

    let app = Router::new()
        .route("/api/sociogram", get(get_sociogram))
        .route("/api/sociogram/svg", get(get_svg))
        .route("/api/sociogram/source", put(put_source))
        .route("/api/sociogram/pointer", put(put_pointer))
        .route("/api/sociogram/zoom", put(put_zoom))
        .route("/api/sociogram/view/reset", put(put_view_reset))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP server to {addr}"))?;

    println!("sociograph server listening on http://{addr}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn get_sociogram(State(state): State<Arc<ServeState>>) -> Json<SociogramPayload> {
    let engine = state.engine.read().await;
    let source = state.source.read().await;
    Json(SociogramPayload {
        source_path: state.source_path.display().to_string(),
        source: source.clone(),
        scene: engine.scene(),
    })
}

async fn get_svg(State(state): State<Arc<ServeState>>) -> Response {
    let engine = state.engine.read().await;
    match engine.render_svg() {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

async fn put_source(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<SourceUpdateRequest>,
) -> Response {
    let graph = match Sociogram::parse(&request.source) {
        Ok(graph) => graph,
        Err(err) => return (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response(),
    };

    let mut engine = state.engine.write().await;
    engine.set_graph(graph);
    *state.source.write().await = request.source;

    Json(engine.scene()).into_response()
}

async fn put_pointer(
    State(state): State<Arc<ServeState>>,
    Json(event): Json<PointerEvent>,
) -> Json<PointerResponse> {
    let mut engine = state.engine.write().await;
    Json(PointerResponse {
        event: engine.dispatch_pointer(event),
    })
}

async fn put_zoom(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<ZoomRequest>,
) -> Json<ViewResponse> {
    let mut engine = state.engine.write().await;
    engine.zoom(request.direction);
    view_response(&engine)
}

async fn put_view_reset(State(state): State<Arc<ServeState>>) -> Json<ViewResponse> {
    let mut engine = state.engine.write().await;
    engine.reset_view();
    view_response(&engine)
}

fn view_response(engine: &SociogramEngine) -> Json<ViewResponse> {
    Json(ViewResponse {
        view_box: engine.viewport().view,
        zoom: engine.viewport().zoom_factor(),
    })
}
