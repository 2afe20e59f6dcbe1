use crate::env::AppEnv;
use crate::error::AppError;
use crate::logging;
use crate::response::{html, set_html_content_type};
use crate::security::UserSession;
use http::{Request, Response, StatusCode};
use micro_router::plugin::{Plugin, PluginFactory};
use micro_router::{
    AfterExecute, Authorizer, BeforeExecute, Dispatcher, DispatcherBuilder, ErrorResponder, Handler, PluginRegistry,
    RequestContext, RouteOptions,
};
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// An application: its environment and the dispatcher built from its routes.
pub struct App {
    env: AppEnv,
    dispatcher: Dispatcher,
}

impl App {
    /// Reads the environment file, installs logging at the configured level and loads
    /// the configured routes file.
    ///
    /// # Errors
    /// [`AppError`] for an unreadable environment, an invalid log level, a broken routes
    /// file or a subscriber that cannot be installed.
    pub fn create(config: impl AsRef<Path>, env: &str) -> Result<AppBuilder, AppError> {
        let env = AppEnv::load(config, env)?;
        logging::init(env.log_level()?)?;
        Self::builder(env)
    }

    /// Starts an application from an environment, loading its routes file if one is set.
    ///
    /// # Errors
    /// [`AppError::Config`] when the routes file cannot be loaded.
    pub fn builder(env: AppEnv) -> Result<AppBuilder, AppError> {
        AppBuilder::new(env)
    }

    pub fn env(&self) -> &AppEnv {
        &self.env
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// A fresh session expiring after the environment's `sessionExpires`.
    pub fn new_session(&self) -> UserSession {
        UserSession::new(self.env.session_expires())
    }

    /// Dispatches an http request.
    ///
    /// Unmatched requests get a 404 page and refused ones a 503 page. A failing
    /// handler is logged and answered with a 500 page.
    pub async fn handle<B>(&self, request: &Request<B>, authorizer: &dyn Authorizer) -> Response<String> {
        let started = Instant::now();
        let context = RequestContext::from_request(request, authorizer);

        let mut response = match self.dispatcher.run_url(&context).await {
            Ok(response) => response,
            Err(e) => {
                error!(url = context.url(), method = %context.method(), cause = %e, "failed to dispatch request");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                html(status, self.dispatcher.error_pages().error_page(status, ""))
            }
        };
        set_html_content_type(&mut response);

        if self.env.profile {
            info!(
                url = context.url(),
                method = %context.method(),
                status = response.status().as_u16(),
                elapsed = ?started.elapsed(),
                "request profile"
            );
        }
        response
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App").field("env", &self.env).field("dispatcher", &self.dispatcher).finish()
    }
}

pub struct AppBuilder {
    env: AppEnv,
    plugins: PluginRegistry,
    dispatcher: DispatcherBuilder,
}

impl AppBuilder {
    fn new(env: AppEnv) -> Result<Self, AppError> {
        let plugins = PluginRegistry::new(&env.default_handler_path);
        let mut dispatcher = Dispatcher::builder();
        if let Some(routes) = env.routes() {
            dispatcher.routes_mut().load_file(routes)?;
        }
        Ok(Self { env, plugins, dispatcher })
    }

    /// Registers a plugin under the handler path of the environment.
    #[must_use]
    pub fn plugin<P: Plugin>(mut self) -> Self {
        self.plugins = self.plugins.register::<P>();
        self
    }

    /// Registers a plugin source at an explicit path.
    #[must_use]
    pub fn plugin_at(mut self, path: impl AsRef<Path>, factory: PluginFactory) -> Self {
        self.plugins = self.plugins.register_at(path, factory);
        self
    }

    /// # Errors
    /// [`AppError::Route`] for an invalid pattern or handler.
    pub fn route(
        mut self,
        name: impl Into<String>,
        pattern: &str,
        handler: impl Into<Handler>,
        options: RouteOptions,
    ) -> Result<Self, AppError> {
        self.dispatcher = self.dispatcher.route(name, pattern, handler, options)?;
        Ok(self)
    }

    /// Adds the routes of another routes file after those already defined.
    ///
    /// # Errors
    /// [`AppError::Config`] when the file cannot be loaded.
    pub fn routes_file(mut self, path: impl AsRef<Path>) -> Result<Self, AppError> {
        self.dispatcher.routes_mut().load_file(path)?;
        Ok(self)
    }

    #[must_use]
    pub fn add_before_execute<H: BeforeExecute + 'static>(mut self, hook: H) -> Self {
        self.dispatcher = self.dispatcher.before_execute(hook);
        self
    }

    #[must_use]
    pub fn add_after_execute<H: AfterExecute + 'static>(mut self, hook: H) -> Self {
        self.dispatcher = self.dispatcher.after_execute(hook);
        self
    }

    #[must_use]
    pub fn error_pages<E: ErrorResponder + 'static>(mut self, error_pages: E) -> Self {
        self.dispatcher = self.dispatcher.error_pages(error_pages);
        self
    }

    pub fn build(self) -> App {
        let dispatcher = self.dispatcher.plugins(self.plugins).build();
        info!(routes = dispatcher.state().routes().len(), "application ready");
        App { env: self.env, dispatcher }
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("env", &self.env)
            .field("plugins", &self.plugins)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::env::AppEnv;
    use crate::error::AppError;
    use crate::response;
    use async_trait::async_trait;
    use http::header::CONTENT_TYPE;
    use http::{Method, Request, StatusCode};
    use micro_router::plugin::{Controller, Plugin, PluginOptions};
    use micro_router::{handler_fn, Anonymous, ConfigError, HandlerError, HandlerResult, PathParams, RouteOptions};
    use serde::Deserialize;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;

    #[derive(Debug, Default, Deserialize)]
    struct PostConfig {
        per_page: usize,
    }

    struct PostController {
        config: PostConfig,
    }

    #[async_trait]
    impl Controller for PostController {
        fn actions(&self) -> &'static [&'static str] {
            &["show", "save_draft"]
        }

        async fn call_action(&mut self, action: &str, params: PathParams) -> HandlerResult {
            match action {
                "show" => Ok(format!("post {}", params.get("id").unwrap_or_default())),
                _ => Ok(response::success("draft saved", json!({ "id": params.get("id") }))?),
            }
        }

        async fn default_action(&mut self) -> HandlerResult {
            Ok(format!("{} posts per page", self.config.per_page))
        }
    }

    impl Plugin for PostController {
        const NAME: &'static str = "PostController";

        fn create(options: &PluginOptions) -> Result<Self, HandlerError> {
            Ok(Self { config: options.config()? })
        }
    }

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("micro-mvc-{}-{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    fn request(uri: &str) -> Request<()> {
        Request::builder().method(Method::GET).uri(uri).body(()).unwrap()
    }

    fn app() -> App {
        App::builder(AppEnv::default())
            .unwrap()
            .plugin::<PostController>()
            .route("home", "/", handler_fn(|| async { "<h1>home</h1>" }), RouteOptions::new())
            .unwrap()
            .route("post", "/posts/{_action}/{id}", "PostController", RouteOptions::new().opts(json!({ "per_page": 5 })))
            .unwrap()
            .route("posts", "/posts", "PostController", RouteOptions::new().opts(json!({ "per_page": 5 })))
            .unwrap()
            .route("admin", "/admin/*", handler_fn(|| async { "dashboard" }), RouteOptions::new().security("admin"))
            .unwrap()
            .route(
                "broken",
                "/broken",
                handler_fn(|| async { Err::<String, _>(std::io::Error::other("boom")) }),
                RouteOptions::new(),
            )
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn test_handle_ok() {
        let app = app();
        let response = app.handle(&request("/?utm=1"), &Anonymous).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(response.body(), "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_handle_plugin_actions() {
        let app = app();
        assert_eq!(app.handle(&request("/posts/show/12"), &Anonymous).await.body(), "post 12");
        assert_eq!(
            app.handle(&request("/posts/save-draft/12"), &Anonymous).await.body(),
            r#"{"error":false,"msg":"draft saved","data":{"id":"12"}}"#
        );
        assert_eq!(app.handle(&request("/posts"), &Anonymous).await.body(), "5 posts per page");
    }

    #[tokio::test]
    async fn test_handle_not_found() {
        let response = app().handle(&request("/nowhere"), &Anonymous).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), "<h1>Oh no! 404!</h1><p></p>");
    }

    #[tokio::test]
    async fn test_handle_secured() {
        let app = app();
        let session = app.new_session();

        let response = app.handle(&request("/admin/users"), &session).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        session.authorize(["admin"]).unwrap();
        let response = app.handle(&request("/admin/users"), &session).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "dashboard");
    }

    #[tokio::test]
    async fn test_handle_handler_error() {
        let response = app().handle(&request("/broken"), &Anonymous).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), "<h1>Oh no! 500!</h1><p></p>");
    }

    #[tokio::test]
    async fn test_handle_without_routes() {
        let app = App::builder(AppEnv::default()).unwrap().build();
        let response = app.handle(&request("/"), &Anonymous).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_routes_file_from_env() {
        let routes = temp_file(
            "routes.json",
            r#"{ "posts": { "url": "/posts", "handler": "PostController", "opts": { "per_page": 20 } } }"#,
        );
        let env = AppEnv { routes: Some(routes.clone()), ..AppEnv::default() };

        let app = App::builder(env).unwrap().plugin::<PostController>().build();
        assert_eq!(app.handle(&request("/posts/"), &Anonymous).await.body(), "20 posts per page");
        fs::remove_file(routes).unwrap();
    }

    #[test]
    fn test_broken_routes_file() {
        let env = AppEnv { routes: Some(PathBuf::from("routes.toml")), ..AppEnv::default() };
        let result = App::builder(env);
        assert!(matches!(result, Err(AppError::Config { source: ConfigError::UnsupportedFormat { .. } })));
    }

    #[test]
    fn test_create() {
        let config = temp_file("env.json", r#"{ "all": { "logLevel": "debug" }, "test": { "sessionExpires": 30 } }"#);
        let app = App::create(&config, "test").unwrap().build();
        assert_eq!(app.env().session_expires, 30);
        assert!(app.dispatcher().state().routes().is_empty());
        fs::remove_file(config).unwrap();
    }
}
