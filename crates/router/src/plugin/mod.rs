//! Plugins: controllers resolved by name.
//!
//! A plugin is a [`Controller`] type registered in a [`PluginRegistry`] under a source
//! path such as `plugins/PostController.rs`. Routes refer to it by that path or, for
//! plugins in the default directory, by its bare name. Each dispatch constructs a fresh
//! controller from the route's `opts`.

mod registry;

pub use registry::{PluginConstructor, PluginFactory, PluginRegistry, PLUGIN_EXTENSION};

use crate::error::HandlerResult;
use crate::PathParams;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The unit of code a plugin route dispatches to.
///
/// Actions are an explicit table: [`Controller::actions`] lists the names
/// [`Controller::call_action`] answers to. Any other action name, including an empty one,
/// falls back to [`Controller::default_action`].
#[async_trait]
pub trait Controller: Send {
    /// Names of the actions served by [`Controller::call_action`].
    fn actions(&self) -> &'static [&'static str] {
        &[]
    }

    /// Runs a declared action with the path parameters in extraction order.
    async fn call_action(&mut self, action: &str, params: PathParams) -> HandlerResult {
        let _ = params;
        Err(format!("`{}` has no action `{action}`", std::any::type_name::<Self>()).into())
    }

    /// Runs when no declared action was selected.
    async fn default_action(&mut self) -> HandlerResult {
        Err(format!(
            "reached the default action of `{}`, implement `default_action` for it",
            std::any::type_name::<Self>()
        )
        .into())
    }
}

/// A controller that can be registered by type.
pub trait Plugin: Controller + Sized + 'static {
    /// Class name; must equal the file stem of the source path it is registered under.
    const NAME: &'static str;

    /// Builds the controller from the route's `opts`.
    ///
    /// # Errors
    /// Whatever the plugin considers an invalid configuration.
    fn create(options: &PluginOptions) -> Result<Self, crate::HandlerError>;
}

/// The constructor arguments configured on a route (`opts`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginOptions(Map<String, Value>);

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies the recognized keys to a configuration struct. Keys `T` does not declare
    /// are ignored; declare `#[serde(default)]` on `T` so absent keys keep their defaults.
    ///
    /// # Errors
    /// A recognized key holding a value of the wrong type.
    pub fn config<T: DeserializeOwned + Default>(&self) -> Result<T, serde_json::Error> {
        if self.0.is_empty() {
            return Ok(T::default());
        }
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for PluginOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Anything but a json object yields no options.
impl From<Value> for PluginOptions {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Controller, PluginOptions};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default, rename_all = "camelCase")]
    struct ViewConfig {
        view_path: String,
        page_size: u32,
    }

    #[test]
    fn test_config_ignores_unknown_keys() {
        let options = PluginOptions::from(json!({ "viewPath": "views/blog", "unknown": true }));
        let config: ViewConfig = options.config().unwrap();
        assert_eq!(config, ViewConfig { view_path: "views/blog".into(), page_size: 0 });
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: ViewConfig = PluginOptions::new().config().unwrap();
        assert_eq!(config, ViewConfig::default());
    }

    #[test]
    fn test_config_wrong_type() {
        let options = PluginOptions::from(json!({ "pageSize": "ten" }));
        assert!(options.config::<ViewConfig>().is_err());
    }

    struct Bare;
    impl Controller for Bare {}

    #[tokio::test]
    async fn test_default_action_reports_missing_override() {
        let err = Bare.default_action().await.unwrap_err();
        assert!(err.to_string().contains("default action"));
    }
}
