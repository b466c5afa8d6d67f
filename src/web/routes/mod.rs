//! Contains all the routes that this application can handle.

mod home;
mod submit;

// re-export errors
pub use submit::{SubmitError, SUBMIT_SUCCESS_MSG};

use crate::AppState;
use home::home;
use submit::submit;

use axum::{
    routing::{get, post},
    Router,
};

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/submit", post(submit))
        .with_state(app_state)
        .route("/", get(home))
}
