use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::Response,
};
use tracing::{info, Span};

use crate::{
    model::{InsertOutcome, StoreError, WaitlistEntry},
    web::{
        self,
        types::{DataParsingError, SubmitPayload, ValidEntry},
        ClientError, WebResult,
    },
    AppState,
};

pub const SUBMIT_SUCCESS_MSG: &str = "Form submitted successfully";

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("failed to decode the payload: {0}")]
    InvalidInput(String),
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
    #[error("email is already on the waiting list")]
    DuplicateEntry,
    #[error("store error: {0}")]
    Storage(#[from] StoreError),
}

impl SubmitError {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        match self {
            SubmitError::InvalidInput(_) => (StatusCode::BAD_REQUEST, ClientError::InvalidInput),
            SubmitError::DataParsing(data_er) if data_er.is_missing_field() => (
                StatusCode::BAD_REQUEST,
                ClientError::MissingField(data_er.client_message()),
            ),
            SubmitError::DataParsing(data_er) => (
                StatusCode::BAD_REQUEST,
                ClientError::InvalidField(data_er.client_message()),
            ),
            SubmitError::DuplicateEntry => (StatusCode::CONFLICT, ClientError::DuplicateEntry),
            SubmitError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ClientError::ServiceError)
            }
        }
    }
}

// ###################################
// ->   API
// ###################################
/// Validates the submission and stores it unless the email is already on the list.
/// There is no separate lookup: the store decides atomically whether the email is new.
///
/// The body is decoded as JSON whatever its `Content-Type`.
#[tracing::instrument(
    name = "Adding an entry to the waiting list",
    skip_all,
    fields(entry_email = tracing::field::Empty)
)]
pub async fn submit(
    State(app_state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> WebResult<Response> {
    let body = body.map_err(|rej| SubmitError::InvalidInput(rej.body_text()))?;
    let payload: SubmitPayload = serde_json::from_slice(&body)
        .map_err(|er| SubmitError::InvalidInput(er.to_string()))?;
    let entry = ValidEntry::parse(payload, &app_state.settings).map_err(SubmitError::DataParsing)?;
    Span::current().record("entry_email", entry.email.as_ref());

    let outcome = app_state
        .store
        .insert_if_absent(WaitlistEntry::from(entry))
        .await
        .map_err(SubmitError::Storage)?;

    if outcome == InsertOutcome::AlreadyPresent {
        return Err(SubmitError::DuplicateEntry.into());
    }
    info!("New entry successfully added to the waiting list.");

    Ok(web::format_response(
        app_state.settings.error_format,
        StatusCode::CREATED,
        "message",
        SUBMIT_SUCCESS_MSG,
    ))
}
