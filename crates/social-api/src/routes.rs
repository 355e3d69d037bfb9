use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, warn};

use social_db::Database;
use social_types::api::{AccountRequest, MessageRequest};
use social_types::models::{Account, Message};

use crate::accounts::AccountService;
use crate::error::ServiceError;
use crate::messages::MessageService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub accounts: AccountService,
    pub messages: MessageService,
}

impl AppStateInner {
    /// Wires both services to the same database.
    pub fn new(db: Arc<Database>) -> AppState {
        Arc::new(Self {
            accounts: AccountService::new(db.clone()),
            messages: MessageService::new(db.clone(), db),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/messages", get(get_all_messages).post(create_message))
        .route(
            "/messages/{message_id}",
            get(get_message).delete(delete_message).patch(update_message),
        )
        .route("/accounts/{account_id}/messages", get(get_account_messages))
        .with_state(state)
}

/// Runs a service call off the async runtime; the stores are blocking.
async fn run_blocking<F, T>(f: F) -> Result<T, StatusCode>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(StatusCode::from)
}

/// Unwraps a JSON body. Well-formed JSON of the wrong shape is a `400`, like
/// any other invalid input.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, StatusCode> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::JsonDataError(e)) => {
            warn!("Request body rejected: {}", e.body_text());
            Err(StatusCode::BAD_REQUEST)
        }
        Err(other) => Err(other.status()),
    }
}

/// `200` with the value, or `200` with an empty body when there is none.
fn json_or_empty<T: serde::Serialize>(value: Option<T>) -> Response {
    match value {
        Some(v) => Json(v).into_response(),
        None => StatusCode::OK.into_response(),
    }
}

// -- Accounts --

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<Account>, StatusCode> {
    let req = json_body(payload)?;
    let account = run_blocking(move || state.accounts.create_account(&req)).await?;
    Ok(Json(account))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<AccountRequest>, JsonRejection>,
) -> Result<Json<Account>, StatusCode> {
    let req = json_body(payload)?;
    let account = run_blocking(move || state.accounts.login_account(&req)).await?;
    Ok(Json(account))
}

// -- Messages --

pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<Message>, StatusCode> {
    let req = json_body(payload)?;
    let message = run_blocking(move || state.messages.create_message(&req)).await?;
    Ok(Json(message))
}

pub async fn get_all_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let messages = run_blocking(move || state.messages.get_all_messages()).await?;
    Ok(Json(messages))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Response, StatusCode> {
    let message = run_blocking(move || state.messages.get_message_by_id(message_id)).await?;
    Ok(json_or_empty(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Response, StatusCode> {
    let deleted = run_blocking(move || state.messages.delete_message_by_id(message_id)).await?;
    Ok(json_or_empty(deleted))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<u32>, StatusCode> {
    let req = json_body(payload)?;
    let updated = run_blocking(move || {
        state
            .messages
            .update_message_text(message_id, req.message_text.as_deref())
    })
    .await?;
    Ok(Json(updated))
}

pub async fn get_account_messages(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let messages =
        run_blocking(move || state.messages.get_messages_by_account(account_id)).await?;
    Ok(Json(messages))
}
