use micro_router::{ConfigError, RouteError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the application environment file.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("invalid config file provided {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse the config file as json: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid config properties, expected an `all` and/or `{env}` property")]
    MissingEnv { env: String },

    #[error("invalid log level `{level}`: {reason}")]
    LogLevel { level: String, reason: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid roles provided for user authorization, at least one role is required")]
    NoRoles,
}

/// Errors raised while creating an [`crate::App`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Env {
        #[from]
        source: EnvError,
    },

    #[error(transparent)]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error(transparent)]
    Route {
        #[from]
        source: RouteError,
    },

    #[error("setting the default subscriber failed: {source}")]
    Logging {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}
