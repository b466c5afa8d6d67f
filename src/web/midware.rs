use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, Method, Uri},
    response::Response,
};

use crate::{
    web::{format_response, log, Error, REQUEST_ID_HEADER},
    AppState,
};

/// Turns an `Error` left in the response extensions by a handler into the client facing
/// response, formatted per `error_format`, and logs the request.
pub async fn response_mapper(
    State(app_state): State<AppState>,
    req_method: Method,
    uri: Uri,
    resp: Response,
) -> Response {
    let req_id = resp.headers().get(REQUEST_ID_HEADER).cloned();

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, client_error)| {
        let mut err_resp = format_response(
            app_state.settings.error_format,
            *status,
            "error",
            &client_error.to_string(),
        );
        if let Some(req_id) = req_id.clone() {
            err_resp.headers_mut().insert(REQUEST_ID_HEADER, req_id);
        }
        err_resp
    });

    log::log_request(
        req_id.as_ref().and_then(|id| HeaderValue::to_str(id).ok()),
        &req_method,
        &uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}
