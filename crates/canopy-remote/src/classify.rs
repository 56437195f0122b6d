use canopy_core::EngineError;
use canopy_core::ErrorCategory;
use canopy_core::RequestFailure;

use crate::error::RemoteError;

/// 404 is final, gateway trouble and dropped connections are worth another attempt, and
/// anything else is shown as a generic error carrying the service's message.
pub fn classify(error: &RemoteError) -> RequestFailure {
    match error {
        RemoteError::Status { status: 404, .. } => {
            RequestFailure::terminal(ErrorCategory::NotFound, None)
        }
        RemoteError::Status {
            status: 502 | 503 | 504,
            ..
        } => RequestFailure::transient(ErrorCategory::Overload),
        RemoteError::Status { status, message } => RequestFailure::terminal(
            ErrorCategory::GenericError,
            Some(
                message
                    .clone()
                    .unwrap_or_else(|| format!("the service answered {status}")),
            ),
        ),
        RemoteError::Connection(_) => RequestFailure::transient(ErrorCategory::ConnectionError),
        RemoteError::Io { .. } | RemoteError::Unscripted(_) => {
            RequestFailure::terminal(ErrorCategory::GenericError, Some(error.to_string()))
        }
    }
}

/// A body that arrived but could not be understood.
pub fn classify_malformed(error: &EngineError) -> RequestFailure {
    RequestFailure::terminal(ErrorCategory::GenericError, Some(error.to_string()))
}
