//! Per-request dispatch.
//!
//! ```text
//! MATCHING ──no match──▶ NOT_FOUND (404)
//!    │
//! AUTHORIZING ──refused──▶ FORBIDDEN (503)
//!    │
//! BEFORE_HOOKS → INVOKING → AFTER_HOOKS → DONE
//! ```
//!
//! Handler errors are not caught here: they surface as [`DispatchError::Handler`] and
//! the http boundary decides how to render them.

use crate::error::{DispatchError, RouteError};
use crate::error_page::{DefaultErrorPages, ErrorResponder};
use crate::handler::Handler;
use crate::hooks::{AfterExecute, BeforeExecute, Hooks};
use crate::params::{self, PathParams};
use crate::plugin::PluginRegistry;
use crate::request::RequestContext;
use crate::resolver::HandlerResolver;
use crate::route::{Route, RouteOptions, RouteTable, ACTION_PLACEHOLDER, DEFAULT_ACTION};
use http::{Method, Response, StatusCode};
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

/// The routes and hook queues of one application, read-only once dispatching starts.
#[derive(Debug, Default)]
pub struct RouterState {
    routes: RouteTable,
    hooks: Hooks,
}

impl RouterState {
    pub fn new(routes: RouteTable, hooks: Hooks) -> Self {
        Self { routes, hooks }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }
}

/// A matched route with the parameters extracted from the url.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    pub route: &'r Route,
    pub params: PathParams,
}

/// How a dispatch ended. Not finding a route and refusing access are ordinary outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Handled { route: String, body: String },
    NotFound,
    Forbidden { route: String },
}

impl Dispatch {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Handled { .. } => StatusCode::OK,
            Self::NotFound => StatusCode::NOT_FOUND,
            // kept as 503 rather than 401/403, see DESIGN.md
            Self::Forbidden { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub struct Dispatcher {
    state: RouterState,
    resolver: HandlerResolver,
    error_pages: Box<dyn ErrorResponder>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn resolver(&self) -> &HandlerResolver {
        &self.resolver
    }

    pub fn error_pages(&self) -> &dyn ErrorResponder {
        self.error_pages.as_ref()
    }

    /// Finds the first route for `url` and extracts its parameters.
    ///
    /// # Errors
    /// [`DispatchError::NoRoutesConfigured`] when no route was ever added.
    pub fn match_route(&self, url: &str, method: &Method) -> Result<Option<RouteMatch<'_>>, DispatchError> {
        let matched = self.state.routes.find_match(url, method)?.map(|route| RouteMatch {
            route,
            params: params::extract(url, route),
        });
        Ok(matched)
    }

    /// Runs the request through matching, authorization, hooks and the handler.
    ///
    /// # Errors
    /// [`DispatchError::NoRoutesConfigured`], [`DispatchError::HandlerNotFound`] and
    /// whatever the handler fails with.
    pub async fn dispatch(&self, req: &RequestContext<'_>) -> Result<Dispatch, DispatchError> {
        let started = Instant::now();

        let Some(RouteMatch { route, mut params }) = self.match_route(req.url(), req.method())? else {
            debug!(url = req.url(), method = %req.method(), "no route matched");
            return Ok(Dispatch::NotFound);
        };
        debug!(route = route.name(), url = req.url(), "route matched");

        let action = match params.remove(ACTION_PLACEHOLDER).filter(|action| !action.is_empty()) {
            Some(action) => action,
            None => route.action().unwrap_or(DEFAULT_ACTION).to_owned(),
        };

        if let Some(security) = route.security() {
            if !req.authorizer().is_authorized(security) {
                warn!(route = route.name(), roles = ?security.roles(), "not authorized");
                return Ok(Dispatch::Forbidden { route: route.name().to_owned() });
            }
        }

        self.state.hooks.run_before(route).await;

        let response = self.resolver.resolve(route.handler(), &action, route.options().plugin_options(), params).await?;

        let body = self.state.hooks.run_after(route, response).await;

        debug!(route = route.name(), action = %action, elapsed = ?started.elapsed(), "dispatched");
        Ok(Dispatch::Handled { route: route.name().to_owned(), body })
    }

    /// Like [`Dispatcher::dispatch`], rendering not-found and forbidden outcomes as error
    /// pages.
    ///
    /// # Errors
    /// See [`Dispatcher::dispatch`].
    pub async fn run_url(&self, req: &RequestContext<'_>) -> Result<Response<String>, DispatchError> {
        let dispatch = self.dispatch(req).await?;
        let status = dispatch.status();
        let body = match dispatch {
            Dispatch::Handled { body, .. } => body,
            Dispatch::NotFound | Dispatch::Forbidden { .. } => self.error_pages.error_page(status, ""),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        Ok(response)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").field("state", &self.state).field("resolver", &self.resolver).finish_non_exhaustive()
    }
}

pub struct DispatcherBuilder {
    routes: RouteTable,
    hooks: Hooks,
    plugins: PluginRegistry,
    error_pages: Box<dyn ErrorResponder>,
}

impl DispatcherBuilder {
    fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            hooks: Hooks::new(),
            plugins: PluginRegistry::default(),
            error_pages: Box::new(DefaultErrorPages),
        }
    }

    /// Adds a route, see [`RouteTable::add`].
    ///
    /// # Errors
    /// [`RouteError`] for an invalid pattern or handler.
    pub fn route(
        mut self,
        name: impl Into<String>,
        pattern: &str,
        handler: impl Into<Handler>,
        options: RouteOptions,
    ) -> Result<Self, RouteError> {
        self.routes.add(name, pattern, handler, options)?;
        Ok(self)
    }

    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn routes_mut(&mut self) -> &mut RouteTable {
        &mut self.routes
    }

    #[must_use]
    pub fn before_execute<H: BeforeExecute + 'static>(mut self, hook: H) -> Self {
        self.hooks.add_before_execute(hook);
        self
    }

    #[must_use]
    pub fn after_execute<H: AfterExecute + 'static>(mut self, hook: H) -> Self {
        self.hooks.add_after_execute(hook);
        self
    }

    #[must_use]
    pub fn plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    #[must_use]
    pub fn error_pages<E: ErrorResponder + 'static>(mut self, error_pages: E) -> Self {
        self.error_pages = Box::new(error_pages);
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            state: RouterState::new(self.routes, self.hooks),
            resolver: HandlerResolver::new(self.plugins),
            error_pages: self.error_pages,
        }
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("routes", &self.routes)
            .field("hooks", &self.hooks)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}
