use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::{instrument, warn};

use super::storage::content_type_for;
use crate::{error::AppError, state::AppState};

pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/uploads/:filename", get(serve_upload))
}

/// GET /uploads/:filename
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let body = state
        .uploads
        .open(&filename)
        .await
        .map_err(AppError::Storage)?
        .ok_or_else(|| {
            warn!(%filename, "upload not found");
            AppError::NotFound
        })?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], body))
}
