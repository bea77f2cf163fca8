//! JSON API over the release service.
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::*;
use serde_json::{Value, json};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

use crate::{
    assembler::GeneratedDocument,
    error::{RelnotesError, Result},
    release::{Release, ReleaseDraft, ReleasePatch},
    service::ReleaseService,
};

type AppState = Arc<ReleaseService>;

/// Error body returned by every failing endpoint: `{"error": "..."}`.
pub struct ApiError(RelnotesError);

impl From<RelnotesError> for ApiError {
    fn from(err: RelnotesError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            RelnotesError::Config(_) | RelnotesError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            RelnotesError::NotFound(_) => StatusCode::NOT_FOUND,
            RelnotesError::Conflict(_) | RelnotesError::GenerationInProgress(_) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("request failed: {}", self.0);
        } else {
            debug!("request rejected: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(RelnotesError::invalid_input(rejection.body_text()))
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/api/releases", get(list_releases).post(create_release))
        .route(
            "/api/releases/{id}",
            get(get_release).put(update_release).delete(delete_release),
        )
        .route("/api/releases/{id}/generate", post(generate))
        .with_state(service)
}

/// Serve the API until Ctrl+C.
pub async fn start_server(service: AppState, host: &str, port: u16) -> Result<()> {
    let host_addr: std::net::IpAddr = host.parse().map_err(|e| {
        RelnotesError::config(format!("invalid host address '{host}': {e}"))
    })?;
    let addr = SocketAddr::from((host_addr, port));

    let listener = TcpListener::bind(addr).await?;
    info!("serving release notes API at http://{addr}");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
}

async fn list_releases(State(service): State<AppState>) -> ApiResult<Json<Vec<Release>>> {
    Ok(Json(service.list_releases().await?))
}

async fn create_release(
    State(service): State<AppState>,
    draft: std::result::Result<Json<ReleaseDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(draft) = draft?;
    let release = service.create_release(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Release created", "id": release.id })),
    ))
}

async fn get_release(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Release>> {
    Ok(Json(service.get_release(&id).await?))
}

async fn update_release(
    State(service): State<AppState>,
    Path(id): Path<String>,
    patch: std::result::Result<Json<ReleasePatch>, JsonRejection>,
) -> ApiResult<Json<Release>> {
    let Json(patch) = patch?;
    Ok(Json(service.update_release(&id, patch).await?))
}

async fn delete_release(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    service.delete_release(&id).await?;
    Ok(Json(json!({ "message": "Release deleted" })))
}

async fn generate(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GeneratedDocument>> {
    Ok(Json(service.generate(&id).await?))
}
