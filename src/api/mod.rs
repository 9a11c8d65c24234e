//! HTTP surface for the content register.
//!
//! `GET /api/analysis` reads the content, `POST /api/analysis` appends a
//! sentence. Handlers only answer after the storage call has completed.

pub mod error;

use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::core::{ContentStore, SqliteContentStore};
use crate::domain::trim_addition;

pub use error::{ApiError, ErrorBody, ServeError};

/// Path of the single resource
pub const ANALYSIS_PATH: &str = "/api/analysis";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
}

/// Response for reads
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "gptOutput")]
    pub gpt_output: String,
}

/// Request body for appends
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppendRequest {
    #[serde(rename = "newSentence", default)]
    pub new_sentence: Option<String>,
}

/// Response for successful appends
#[derive(Debug, Serialize, Deserialize)]
pub struct AppendResponse {
    pub message: String,
    #[serde(rename = "gptOutput")]
    pub gpt_output: String,
}

/// Build the router over any store implementation
///
/// Sentences have no size cap, so the default request body limit is lifted.
pub fn router(store: Arc<dyn ContentStore>) -> Router {
    Router::new()
        .route(ANALYSIS_PATH, get(get_analysis).post(append_analysis))
        .layer(DefaultBodyLimit::disable())
        .with_state(AppState { store })
}

async fn get_analysis(State(state): State<AppState>) -> Result<Json<AnalysisResponse>, ApiError> {
    let gpt_output = state.store.get().await?;
    Ok(Json(AnalysisResponse { gpt_output }))
}

async fn append_analysis(
    State(state): State<AppState>,
    payload: Result<Json<AppendRequest>, JsonRejection>,
) -> Result<Json<AppendResponse>, ApiError> {
    // A body that is not a sentence object counts as an absent sentence.
    // Failing to receive the body at all is passed through as-is.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection @ JsonRejection::BytesRejection(_)) => {
            return Err(ApiError::Body(rejection));
        }
        Err(rejection) => {
            warn!("Rejected append body: {}", rejection);
            AppendRequest::default()
        }
    };

    let sentence = request.new_sentence.unwrap_or_default();
    let addition = trim_addition(&sentence).ok_or(ApiError::NoText)?;

    let gpt_output = state.store.append(addition).await?;
    Ok(Json(AppendResponse {
        message: format!("Content updated with new text: {}", addition),
        gpt_output,
    }))
}

/// Serve until `shutdown` resolves, then close the store.
///
/// In-flight requests are drained before the store is closed, so every
/// acknowledged append is on disk when this returns.
pub async fn serve<F>(
    listener: TcpListener,
    store: SqliteContentStore,
    shutdown: F,
) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(Arc::new(store.clone()));

    if let Ok(addr) = listener.local_addr() {
        info!("HTTP server listening on {}", addr);
    }

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    info!("HTTP server stopped, closing content store");
    let closed = store.close().await;
    if let Err(ref e) = closed {
        error!("Failed to close content store: {}", e);
    }

    served?;
    closed?;
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested");
}
