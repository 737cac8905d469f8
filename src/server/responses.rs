use axum::{
    http::{
        header::{CACHE_CONTROL, EXPIRES, PRAGMA},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;

use crate::error::RunboardError;

const NO_STORE: &str = "no-store, no-cache, must-revalidate";
const ONE_HOUR: &str = "public, max-age=3600";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON response that browsers and proxies must not cache.
pub fn live<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(CACHE_CONTROL, NO_STORE), (PRAGMA, "no-cache"), (EXPIRES, "0")],
        Json(body),
    )
        .into_response()
}

/// Response for static documents, cacheable for an hour.
pub fn cacheable(body: impl IntoResponse) -> Response {
    ([(CACHE_CONTROL, ONE_HOUR)], body).into_response()
}

fn status_for(err: &RunboardError) -> StatusCode {
    match err {
        RunboardError::Validation(_) => StatusCode::BAD_REQUEST,
        RunboardError::AccessDenied(_) => StatusCode::FORBIDDEN,
        RunboardError::Duplicate(_) => StatusCode::CONFLICT,
        RunboardError::NotFound(_) => StatusCode::NOT_FOUND,
        RunboardError::Config(_)
        | RunboardError::Upstream { .. }
        | RunboardError::Network(_)
        | RunboardError::Json(_)
        | RunboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message shown to API clients. Transport and storage failures are reported
/// generically; the detail only goes to the server log.
fn public_message(err: &RunboardError) -> String {
    match err {
        RunboardError::Network(_) => "Failed to reach GitHub".to_string(),
        RunboardError::Json(_) | RunboardError::Io(_) => "Internal server error".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for RunboardError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        if status.is_server_error() {
            error!("Request failed ({status}): {self}");
        } else {
            warn!("Request rejected ({status}): {self}");
        }

        live(
            status,
            ErrorBody {
                error: public_message(&self),
            },
        )
    }
}
