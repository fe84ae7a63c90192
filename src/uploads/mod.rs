use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod storage;

pub fn router() -> Router<AppState> {
    handlers::upload_routes()
}
