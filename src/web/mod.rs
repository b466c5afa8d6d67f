mod error;
mod log;
pub mod midware;
pub mod routes;
pub mod serve;
pub mod types;

pub use error::{ClientError, Error, WebResult};
pub use serve::{build_router, serve};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::ErrorFormat;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds a response carrying a single message, either as `{"<key>": "<message>"}`
/// or as a plain text body.
pub fn format_response(
    format: ErrorFormat,
    status: StatusCode,
    key: &str,
    message: &str,
) -> Response {
    match format {
        ErrorFormat::Json => (status, Json(json!({ key: message }))).into_response(),
        ErrorFormat::Text => (status, message.to_string()).into_response(),
    }
}
