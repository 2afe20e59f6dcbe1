//! Turns a route handler into a response string.

use crate::error::DispatchError;
use crate::handler::Handler;
use crate::plugin::{PluginOptions, PluginRegistry};
use crate::PathParams;
use tracing::debug;

/// Resolves and invokes route handlers.
///
/// Callables are invoked with the parameters directly. Plugin references are loaded
/// from the registry, constructed with the route's `opts` and asked to run the action.
#[derive(Debug, Default)]
pub struct HandlerResolver {
    plugins: PluginRegistry,
}

impl HandlerResolver {
    pub fn new(plugins: PluginRegistry) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// # Errors
    /// [`DispatchError::HandlerNotFound`] for unknown plugins, [`DispatchError::Handler`]
    /// for anything the handler itself fails with.
    pub async fn resolve(
        &self,
        handler: &Handler,
        action: &str,
        options: &PluginOptions,
        params: PathParams,
    ) -> Result<String, DispatchError> {
        match handler {
            Handler::Callable(callable) => Ok(callable.invoke(params).await?),
            Handler::Plugin(reference) => {
                let factory = self.plugins.load(reference)?;
                debug!(plugin = factory.class(), "start plugin");
                let mut controller = factory.create(options)?;

                let action = normalize_action(action);
                let response = if !action.is_empty() && controller.actions().contains(&action.as_str()) {
                    debug!(plugin = factory.class(), action = %action, "calling action");
                    controller.call_action(&action, params).await?
                } else {
                    debug!(plugin = factory.class(), "calling default action");
                    controller.default_action().await?
                };
                Ok(response)
            }
        }
    }
}

/// Maps `this-method name` to `this_method_name`.
pub fn normalize_action(action: &str) -> String {
    action.chars().map(|c| if c == '-' || c.is_whitespace() { '_' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_action, HandlerResolver};
    use crate::error::{DispatchError, HandlerResult};
    use crate::handler::{handler_fn, Handler};
    use crate::plugin::{Controller, Plugin, PluginOptions, PluginRegistry};
    use crate::PathParams;
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct WidgetConfig {
        greeting: String,
    }

    struct Widgets {
        config: WidgetConfig,
    }

    #[async_trait]
    impl Controller for Widgets {
        fn actions(&self) -> &'static [&'static str] {
            &["edit", "bulk_delete"]
        }

        async fn call_action(&mut self, action: &str, params: PathParams) -> HandlerResult {
            let id = params.get("id").unwrap_or_default();
            Ok(format!("{} {action} {id}", self.config.greeting))
        }

        async fn default_action(&mut self) -> HandlerResult {
            Ok("widget index".into())
        }
    }

    impl Plugin for Widgets {
        const NAME: &'static str = "Widgets";

        fn create(options: &PluginOptions) -> Result<Self, crate::HandlerError> {
            Ok(Self { config: options.config()? })
        }
    }

    fn resolver() -> HandlerResolver {
        HandlerResolver::new(PluginRegistry::new("plugins").register::<Widgets>())
    }

    fn id(value: &str) -> PathParams {
        [("id", value)].into_iter().collect()
    }

    #[test]
    fn test_normalize_action() {
        assert_eq!(normalize_action("bulk-delete"), "bulk_delete");
        assert_eq!(normalize_action("bulk delete\tall"), "bulk_delete_all");
    }

    #[tokio::test]
    async fn test_declared_action() {
        let options = PluginOptions::from(serde_json::json!({ "greeting": "hi", "ignored": 1 }));
        let response = resolver().resolve(&Handler::from("Widgets"), "edit", &options, id("42")).await.unwrap();
        assert_eq!(response, "hi edit 42");
    }

    #[tokio::test]
    async fn test_hyphenated_action() {
        let response =
            resolver().resolve(&Handler::from("Widgets"), "bulk-delete", &PluginOptions::new(), id("1")).await.unwrap();
        assert_eq!(response, " bulk_delete 1");
    }

    #[tokio::test]
    async fn test_unknown_action_falls_back_to_default() {
        let resolver = resolver();
        let handler = Handler::from("Widgets");
        for action in ["_default", "missing", ""] {
            let response = resolver.resolve(&handler, action, &PluginOptions::new(), id("1")).await.unwrap();
            assert_eq!(response, "widget index");
        }
    }

    #[tokio::test]
    async fn test_unknown_plugin() {
        let result = resolver().resolve(&Handler::from("Gadgets"), "", &PluginOptions::new(), PathParams::empty()).await;
        assert!(matches!(result, Err(DispatchError::HandlerNotFound { .. })));
    }

    #[tokio::test]
    async fn test_constructor_error_propagates() {
        let options = PluginOptions::from(serde_json::json!({ "greeting": 5 }));
        let result = resolver().resolve(&Handler::from("Widgets"), "edit", &options, id("1")).await;
        assert!(matches!(result, Err(DispatchError::Handler { .. })));
    }

    #[tokio::test]
    async fn test_callable() {
        let handler = Handler::from(handler_fn(|id: String| async move { format!("post {id}") }));
        let response = resolver().resolve(&handler, "ignored", &PluginOptions::new(), id("77")).await.unwrap();
        assert_eq!(response, "post 77");
    }
}
