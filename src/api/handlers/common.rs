use crate::Error;
use axum::http::StatusCode;
use tracing::{error, warn};

/// Maps a service error onto an HTTP status, logging at the severity the
/// condition deserves. Not-found and conflict are expected outcomes; anything
/// else is a server fault.
pub fn error_status(context: &str, err: Error) -> StatusCode {
    match err {
        Error::NotFound => {
            warn!("{}: {}", context, err);
            StatusCode::NOT_FOUND
        }
        Error::AlreadyRunning => {
            warn!("{}: {}", context, err);
            StatusCode::CONFLICT
        }
        other => {
            error!("{}: {}", context, other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
