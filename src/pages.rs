use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

pub const INDEX_HTML: &str = include_str!("../static/index.html");
pub const PORTFOLIO_HTML: &str = include_str!("../static/portfolio.html");

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(|| async { "ok" }))
}

pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}
