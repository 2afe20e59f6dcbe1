use std::error::Error;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type produced by handler code, boxed the same way request handlers box theirs.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Result of invoking a handler: the display string or the handler's own error.
pub type HandlerResult = Result<String, HandlerError>;

/// Errors raised while registering a route, never during dispatch.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("invalid route `{name}`: route urls must be a string of at least one character")]
    InvalidRoute { name: String },

    #[error("invalid route handler for `{pattern}`: handlers must be a callable or a plugin reference")]
    InvalidHandler { pattern: String },

    #[error("route `{pattern}` could not be compiled: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RouteError {
    pub fn invalid_route<S: ToString>(name: S) -> Self {
        Self::InvalidRoute { name: name.to_string() }
    }

    pub fn invalid_handler<S: ToString>(pattern: S) -> Self {
        Self::InvalidHandler { pattern: pattern.to_string() }
    }
}

/// Errors raised while dispatching a request.
///
/// "no route matched" and "not authorized" are not errors, see [`crate::Dispatch`].
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no routes have been defined for the application")]
    NoRoutesConfigured,

    #[error("plugin `{reference}` not found: {reason}")]
    HandlerNotFound { reference: String, reason: String },

    #[error("handler error: {source}")]
    Handler {
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    pub fn handler_not_found<R: ToString, S: ToString>(reference: R, reason: S) -> Self {
        Self::HandlerNotFound { reference: reference.to_string(), reason: reason.to_string() }
    }
}

impl From<HandlerError> for DispatchError {
    fn from(source: HandlerError) -> Self {
        Self::Handler { source }
    }
}

/// Errors raised while loading route definitions from a routes file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("empty routes file path provided")]
    EmptyPath,

    #[error("routes file {path:?} does not exist or is not readable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid routes file type {extension:?}, only json is accepted")]
    UnsupportedFormat { extension: String },

    #[error("could not parse the routes json: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("routes json must contain at least one route")]
    Empty,

    #[error("invalid route provided for `{name}`: {reason}")]
    InvalidRouteDefinition { name: String, reason: String },

    #[error(transparent)]
    Route {
        #[from]
        source: RouteError,
    },
}

impl ConfigError {
    pub fn invalid_definition<N: ToString, S: ToString>(name: N, reason: S) -> Self {
        Self::InvalidRouteDefinition { name: name.to_string(), reason: reason.to_string() }
    }
}
