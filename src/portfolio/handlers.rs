use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::{
    dto::PHOTO_FIELD,
    repo_types::{Portfolio, PortfolioFields, PortfolioView},
};
use crate::{auth::AuthUser, error::AppError, pages, state::AppState};

pub fn portfolio_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/portfolio",
            // Uploads carry no size limit.
            get(portfolio_page).post(submit_portfolio).layer(DefaultBodyLimit::disable()),
        )
        .route("/save-progress", post(save_progress))
        .route("/load-progress", get(load_progress))
}

/// GET /portfolio: the editing form, for logged-in users only.
#[instrument]
pub async fn portfolio_page(AuthUser(user_id): AuthUser) -> Html<&'static str> {
    debug!(user_id, "serving portfolio form");
    Html(pages::PORTFOLIO_HTML)
}

/// POST /portfolio (multipart)
/// Text fields plus one `photo` file.
#[instrument(skip(state, mp))]
pub async fn submit_portfolio(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<&'static str, AppError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut photo: Option<(String, Bytes)> = None;

    while let Some(field) = mp.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == PHOTO_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(bad_multipart)?;
            // Browsers send an empty, unnamed part when no file was chosen.
            if !file_name.is_empty() || !data.is_empty() {
                photo = Some((file_name, data));
            }
        } else {
            let value = field.text().await.map_err(bad_multipart)?;
            pairs.push((name, value));
        }
    }

    let Some((file_name, data)) = photo else {
        warn!(user_id, "portfolio submitted without photo");
        return Err(AppError::BadRequest("photo is required".into()));
    };

    let stored = state
        .uploads
        .store(&file_name, data)
        .await
        .map_err(AppError::Storage)?;

    let fields = PortfolioFields::from_pairs(pairs);
    let portfolio_id = Portfolio::submit(&state.db, user_id, &fields, &stored.relative_path).await?;

    info!(user_id, portfolio_id, photo = %stored.relative_path, "portfolio submitted");
    Ok("Portfolio submitted successfully!")
}

/// POST /save-progress (urlencoded, any subset of the form fields)
#[instrument(skip(state, form))]
pub async fn save_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<&'static str, AppError> {
    let fields = PortfolioFields::from_pairs(form);
    let portfolio_id = Portfolio::save_progress(&state.db, user_id, &fields).await?;
    info!(user_id, portfolio_id, "progress saved");
    Ok("Progress saved!")
}

/// GET /load-progress: the stored portfolio, or `{}` when there is none.
#[instrument(skip(state))]
pub async fn load_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, AppError> {
    let Some(portfolio) = Portfolio::load_for_user(&state.db, user_id).await? else {
        return Ok(Json(json!({})));
    };
    let view = PortfolioView::from(portfolio);
    Ok(Json(serde_json::to_value(view).map_err(anyhow::Error::from)?))
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    warn!(error = %e, "malformed multipart body");
    AppError::BadRequest(e.body_text())
}
