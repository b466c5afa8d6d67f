use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum_macros::AsRefStr;

use super::routes::SubmitError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("submit error: {0}")]
    Submit(#[from] SubmitError),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        match self {
            Error::Submit(submit_er) => submit_er.status_code_and_client_error(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that the response mapper can build the client body.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client gets to see. Internal details stay in the logs.
#[derive(Debug, Clone, PartialEq, Eq, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Invalid Input")]
    InvalidInput,
    #[display("{_0}")]
    InvalidField(&'static str),
    #[display("{_0}")]
    MissingField(&'static str),
    #[display("Email already registered for waiting list")]
    DuplicateEntry,
    #[display("Failed to save data")]
    ServiceError,
}
