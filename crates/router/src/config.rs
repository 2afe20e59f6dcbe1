//! Route definitions read from json routes files.
//!
//! Two layouts are accepted. A flat object keyed by route name:
//!
//! ```json
//! {
//!     "home": { "url": "/", "handler": "HomeController" },
//!     "post": { "url": "/posts/{id}", "handler": "PostController", "method": "get" }
//! }
//! ```
//!
//! or an array of route objects each carrying its `name`. Routes are added in file order.

use crate::error::ConfigError;
use crate::plugin::PluginOptions;
use crate::route::{RouteOptions, RouteTable, Security};
use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// One route as written in a routes file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "pattern")]
    pub url: Option<String>,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub security: Option<Security>,
    #[serde(default)]
    pub opts: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteDefinition {
    /// Builds the route options, keeping unknown keys as extra options.
    ///
    /// # Errors
    /// [`ConfigError::InvalidRouteDefinition`] for a method that is not a valid http token.
    pub fn options(&self, name: &str) -> Result<RouteOptions, ConfigError> {
        let mut options = RouteOptions::new();
        if let Some(method) = parse_method(self.method.as_deref())
            .map_err(|e| ConfigError::invalid_definition(name, format!("invalid method {:?}: {e}", self.method)))?
        {
            options = options.method(method);
        }
        if let Some(security) = self.security.clone().filter(|security| !security.is_empty()) {
            options = options.security(security);
        }
        if let Some(action) = self.action.as_deref().filter(|action| !action.is_empty()) {
            options = options.action(action);
        }
        if let Some(opts) = self.opts.clone() {
            options = options.opts(PluginOptions::from(opts));
        }
        for (key, value) in &self.extra {
            options = options.extra(key.clone(), value.clone());
        }
        Ok(options)
    }
}

/// `any` or an empty method places no restriction on the request method.
fn parse_method(method: Option<&str>) -> Result<Option<Method>, http::method::InvalidMethod> {
    match method.map(str::trim) {
        None | Some("") => Ok(None),
        Some(method) if method.eq_ignore_ascii_case("any") => Ok(None),
        Some(method) => Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map(Some),
    }
}

/// Parses routes json into `(name, definition)` pairs in file order.
///
/// # Errors
/// [`ConfigError::Json`] for malformed content, [`ConfigError::Empty`] when no route is
/// defined, [`ConfigError::InvalidRouteDefinition`] for an unnamed array entry or an
/// entry that is not an object.
pub fn parse_routes(json: &str) -> Result<Vec<(String, RouteDefinition)>, ConfigError> {
    if json.trim().is_empty() {
        return Err(ConfigError::Empty);
    }

    let definitions = match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, value)| -> Result<_, ConfigError> {
                let parsed = definition(&name, value)?;
                Ok((name, parsed))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?,
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(position, value)| -> Result<_, ConfigError> {
                let parsed = definition(&format!("#{position}"), value)?;
                let name = parsed
                    .name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| ConfigError::invalid_definition(format!("#{position}"), "missing route name"))?;
                Ok((name, parsed))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?,
        other => {
            return Err(ConfigError::invalid_definition("<root>", format!("expected an object or an array, found {other}")));
        }
    };

    if definitions.is_empty() {
        return Err(ConfigError::Empty);
    }
    Ok(definitions)
}

fn definition(name: &str, value: Value) -> Result<RouteDefinition, ConfigError> {
    if !value.is_object() {
        return Err(ConfigError::invalid_definition(name, "route must be an object"));
    }
    serde_json::from_value(value).map_err(|e| ConfigError::invalid_definition(name, e))
}

impl RouteTable {
    /// Adds every route of a routes json document, returning how many were added.
    ///
    /// # Errors
    /// See [`parse_routes`]. A route without `url` or `handler` fails with
    /// [`ConfigError::InvalidRouteDefinition`]. Routes before the failing one stay added.
    pub fn load_json(&mut self, json: &str) -> Result<usize, ConfigError> {
        let definitions = parse_routes(json)?;
        let count = definitions.len();

        for (name, definition) in definitions {
            let url = definition
                .url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| ConfigError::invalid_definition(&name, "missing url"))?;
            let handler = definition
                .handler
                .as_deref()
                .filter(|handler| !handler.trim().is_empty())
                .ok_or_else(|| ConfigError::invalid_definition(&name, "missing handler"))?;

            let options = definition.options(&name)?;
            self.add(name.as_str(), url, handler, options)?;
        }
        Ok(count)
    }

    /// Reads a `.json` routes file and adds its routes.
    ///
    /// # Errors
    /// [`ConfigError::EmptyPath`], [`ConfigError::UnsupportedFormat`] for any other
    /// extension, [`ConfigError::Io`] when the file cannot be read, then as
    /// [`RouteTable::load_json`].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, ConfigError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        if !extension.eq_ignore_ascii_case("json") {
            return Err(ConfigError::UnsupportedFormat { extension: extension.to_owned() });
        }

        debug!(path = %path.display(), "reading routes file");
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let count = self.load_json(&json)?;
        info!(path = %path.display(), count, "routes loaded");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::parse_routes;
    use crate::error::ConfigError;
    use crate::route::RouteTable;
    use http::Method;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;

    const FLAT: &str = r#"{
        "home": { "url": "/", "handler": "HomeController" },
        "post": { "url": "/posts/{id}", "handler": "PostController", "method": "get" },
        "admin": {
            "pattern": "/admin/*",
            "handler": "AdminController",
            "action": "dashboard",
            "security": ["admin", "owner"],
            "opts": { "theme": "dark" },
            "layout": "wide"
        }
    }"#;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("micro-router-{}-{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_flat_layout_keeps_file_order() {
        let mut table = RouteTable::new();
        assert_eq!(table.load_json(FLAT).unwrap(), 3);

        let names: Vec<_> = table.iter().map(|route| route.name()).collect();
        assert_eq!(names, ["home", "post", "admin"]);

        let admin = table.get("admin").unwrap();
        assert_eq!(admin.pattern().template(), "/admin/*");
        assert_eq!(admin.action(), Some("dashboard"));
        assert_eq!(admin.security().unwrap().roles(), ["admin", "owner"]);
        assert_eq!(admin.options().plugin_options().get("theme"), Some(&json!("dark")));
        assert_eq!(admin.options().get_extra("layout"), Some(&json!("wide")));
        assert_eq!(admin.method(), None);

        assert_eq!(table.get("post").unwrap().method(), Some(&Method::GET));
    }

    #[test]
    fn test_array_layout() {
        let json = r#"[
            { "name": "home", "url": "/", "handler": "HomeController", "method": "any" },
            { "name": "save", "url": "/save", "handler": "SaveController", "method": "Post", "security": "editor" }
        ]"#;

        let mut table = RouteTable::new();
        assert_eq!(table.load_json(json).unwrap(), 2);
        assert_eq!(table.get("home").unwrap().method(), None);

        let save = table.get("save").unwrap();
        assert_eq!(save.method(), Some(&Method::POST));
        assert_eq!(save.security().unwrap().roles(), ["editor"]);
    }

    #[test]
    fn test_array_entry_without_name() {
        let result = parse_routes(r#"[{ "url": "/", "handler": "HomeController" }]"#);
        assert!(matches!(result, Err(ConfigError::InvalidRouteDefinition { name, .. }) if name == "#0"));
    }

    #[test]
    fn test_missing_url_or_handler() {
        let mut table = RouteTable::new();
        let result = table.load_json(r#"{ "broken": { "handler": "HomeController" } }"#);
        assert!(matches!(result, Err(ConfigError::InvalidRouteDefinition { name, .. }) if name == "broken"));

        let result = table.load_json(r#"{ "broken": { "url": "/" } }"#);
        assert!(matches!(result, Err(ConfigError::InvalidRouteDefinition { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_documents() {
        assert!(matches!(parse_routes(""), Err(ConfigError::Empty)));
        assert!(matches!(parse_routes("{}"), Err(ConfigError::Empty)));
        assert!(matches!(parse_routes("[]"), Err(ConfigError::Empty)));
        assert!(matches!(parse_routes("{ not json"), Err(ConfigError::Json { .. })));
        assert!(matches!(parse_routes("42"), Err(ConfigError::InvalidRouteDefinition { .. })));
        assert!(matches!(parse_routes(r#"{ "home": "/" }"#), Err(ConfigError::InvalidRouteDefinition { .. })));
    }

    #[test]
    fn test_load_file() {
        let path = temp_file("routes.json", FLAT);
        let mut table = RouteTable::new();
        assert_eq!(table.load_file(&path).unwrap(), 3);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_file_errors() {
        let mut table = RouteTable::new();
        assert!(matches!(table.load_file(""), Err(ConfigError::EmptyPath)));
        assert!(matches!(
            table.load_file("routes.yaml"),
            Err(ConfigError::UnsupportedFormat { extension }) if extension == "yaml"
        ));
        assert!(matches!(table.load_file("/definitely/not/here/routes.json"), Err(ConfigError::Io { .. })));
    }
}
