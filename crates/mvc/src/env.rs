//! The application environment.
//!
//! An environment file is json with an `all` section and one section per environment:
//!
//! ```json
//! {
//!     "all": { "routes": "config/routes.json", "sessionExpires": 3600 },
//!     "dev": { "profile": true, "logLevel": "debug" }
//! }
//! ```
//!
//! `all` and then the selected section are merged, key by key, over the defaults.

use crate::error::EnvError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_ENV: &str = "dev";
const SHARED_SECTION: &str = "all";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppEnv {
    pub timezone: String,
    /// Seconds an authorized session stays valid.
    pub session_expires: u64,
    pub default_handler_path: PathBuf,
    pub profile: bool,
    pub log_level: String,
    pub routes: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppEnv {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".into(),
            session_expires: 6 * 60 * 60,
            default_handler_path: PathBuf::from("plugins/"),
            profile: false,
            log_level: "info".into(),
            routes: None,
            extra: Map::new(),
        }
    }
}

impl AppEnv {
    /// Reads the environment file at `path` and selects the `env` section.
    ///
    /// # Errors
    /// [`EnvError::Io`] when the file cannot be read, then as [`AppEnv::from_json`].
    pub fn load(path: impl AsRef<Path>, env: &str) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| EnvError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&json, env)
    }

    /// # Errors
    /// [`EnvError::Json`] for malformed content, [`EnvError::MissingEnv`] when neither
    /// `all` nor `env` is present.
    pub fn from_json(json: &str, env: &str) -> Result<Self, EnvError> {
        let document = match serde_json::from_str::<Value>(json)? {
            Value::Object(document) => document,
            _ => return Err(EnvError::MissingEnv { env: env.to_owned() }),
        };
        if !document.contains_key(SHARED_SECTION) && !document.contains_key(env) {
            return Err(EnvError::MissingEnv { env: env.to_owned() });
        }

        let mut merged = Map::new();
        for section in [SHARED_SECTION, env] {
            // anything but a non-empty object counts as an empty section
            if let Some(Value::Object(values)) = document.get(section) {
                merged.extend(values.iter().map(|(key, value)| (key.clone(), value.clone())));
            }
        }

        let mut app_env: Self = serde_json::from_value(Value::Object(merged))?;
        app_env.routes = app_env.routes.filter(|routes| !routes.as_os_str().is_empty());
        Ok(app_env)
    }

    pub fn session_expires(&self) -> Duration {
        Duration::from_secs(self.session_expires)
    }

    /// # Errors
    /// [`EnvError::LogLevel`] for anything `tracing` does not recognize.
    pub fn log_level(&self) -> Result<Level, EnvError> {
        Level::from_str(&self.log_level).map_err(|e| EnvError::LogLevel { level: self.log_level.clone(), reason: e.to_string() })
    }

    pub fn routes(&self) -> Option<&Path> {
        self.routes.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
