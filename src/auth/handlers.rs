use axum::{
    extract::{FromRef, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{is_valid_email, normalize_email, LoginForm, SignupForm},
        password::{hash_password, verify_password},
        repo_types::User,
        session::SessionKeys,
    },
    error::AppError,
    state::AppState,
};

/// Where a fresh session lands.
pub const PORTFOLIO_VIEW: &str = "/portfolio";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Start a session for `user_id` and redirect to the portfolio view.
fn start_session(state: &AppState, user_id: i64) -> Result<Response, AppError> {
    let keys = SessionKeys::from_ref(state);
    let token = keys.start(user_id)?;
    let cookie = keys.cookie(&token)?;
    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, HeaderValue::from_static(PORTFOLIO_VIEW)),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response())
}

#[instrument(skip(state, form))]
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    if form.password.is_empty() {
        warn!(%email, "empty password");
        return Err(AppError::BadRequest("Password is required".into()));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let hash = hash_password(&form.password)?;
    // A concurrent signup can still win the race; the UNIQUE constraint
    // turns that into DuplicateEmail as well.
    let user = User::create(&state.db, &email, &hash).await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    start_session(&state, user.id)
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = normalize_email(&form.email);

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&form.password, &user.password_hash) {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    start_session(&state, user.id)
}
