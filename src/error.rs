use crate::handler::BoxError;

/// Errors returned synchronously by the [`EventAggregator`](crate::EventAggregator) API.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AggregatorError {
    /// A required argument was absent.
    #[error("invalid argument: `{argument}` must be present")]
    InvalidArgument { argument: &'static str },
    /// No runtime handle was configured and the caller is not running inside a tokio runtime.
    #[error("no tokio runtime available to dispatch event handlers")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// A failure raised by a subscriber while handling an event.
///
/// Failures never reach the publisher: they are logged and handed to the configured
/// `error_handler`, and the failed handler simply misses that event.
#[derive(thiserror::Error, Debug)]
pub enum HandlerFailure {
    /// The handler returned an error.
    #[error("event handler `{handler}` failed to handle `{event_type}`: {source}")]
    Failed {
        handler: &'static str,
        event_type: &'static str,
        #[source]
        source: BoxError,
    },
    /// The handler panicked.
    #[error("event handler `{handler}` panicked while handling `{event_type}`: {message}")]
    Panicked {
        handler: &'static str,
        event_type: &'static str,
        message: String,
    },
}

impl HandlerFailure {
    /// Name of the handler that failed.
    pub fn handler(&self) -> &'static str {
        match self {
            Self::Failed { handler, .. } | Self::Panicked { handler, .. } => *handler,
        }
    }

    /// Name of the event type that was being handled.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Failed { event_type, .. } | Self::Panicked { event_type, .. } => *event_type,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Failed { .. } => "handler_failed",
            Self::Panicked { .. } => "handler_panicked",
        }
    }
}
