//! Callbacks run around handler invocation.
//!
//! Before-hooks run once a route has been matched and authorized, before its handler.
//! They see the route and cannot stop the dispatch. After-hooks run once the handler has
//! produced a response; a non-empty string returned by an after-hook replaces the
//! response for the hooks that follow and for the caller.

use crate::route::Route;
use async_trait::async_trait;
use std::fmt;

#[async_trait]
pub trait BeforeExecute: Send + Sync {
    async fn before_execute(&self, route: &Route);
}

#[async_trait]
pub trait AfterExecute: Send + Sync {
    /// Returns a replacement response, or `None` to keep the current one.
    async fn after_execute(&self, route: &Route, response: &str) -> Option<String>;
}

#[async_trait]
impl<F> BeforeExecute for F
where
    F: Fn(&Route) + Send + Sync,
{
    async fn before_execute(&self, route: &Route) {
        (self)(route);
    }
}

#[async_trait]
impl<F, R> AfterExecute for F
where
    F: Fn(&Route, &str) -> R + Send + Sync,
    R: Into<Option<String>>,
{
    async fn after_execute(&self, route: &Route, response: &str) -> Option<String> {
        (self)(route, response).into()
    }
}

/// The before and after queues, run in registration order.
#[derive(Default)]
pub struct Hooks {
    before: Vec<Box<dyn BeforeExecute>>,
    after: Vec<Box<dyn AfterExecute>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_before_execute<H: BeforeExecute + 'static>(&mut self, hook: H) -> &mut Self {
        self.before.push(Box::new(hook));
        self
    }

    pub fn add_after_execute<H: AfterExecute + 'static>(&mut self, hook: H) -> &mut Self {
        self.after.push(Box::new(hook));
        self
    }

    pub async fn run_before(&self, route: &Route) {
        for hook in &self.before {
            hook.before_execute(route).await;
        }
    }

    pub async fn run_after(&self, route: &Route, mut response: String) -> String {
        for hook in &self.after {
            if let Some(replacement) = hook.after_execute(route, &response).await.filter(|s| !s.is_empty()) {
                response = replacement;
            }
        }
        response
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").field("before", &self.before.len()).field("after", &self.after.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{AfterExecute, Hooks};
    use crate::route::{Route, RouteOptions, RouteTable};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    fn route() -> RouteTable {
        let mut table = RouteTable::new();
        table.add("home", "/", "Home", RouteOptions::new()).unwrap();
        table
    }

    struct Append(&'static str);

    #[async_trait]
    impl AfterExecute for Append {
        async fn after_execute(&self, _route: &Route, response: &str) -> Option<String> {
            Some(format!("{response}{}", self.0))
        }
    }

    #[tokio::test]
    async fn test_before_hooks_run_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::new();
        for name in ["a", "b"] {
            let calls = Arc::clone(&calls);
            hooks.add_before_execute(move |route: &Route| calls.lock().unwrap().push(format!("{name}:{}", route.name())));
        }

        let table = route();
        hooks.run_before(table.get("home").unwrap()).await;
        assert_eq!(*calls.lock().unwrap(), ["a:home", "b:home"]);
    }

    #[tokio::test]
    async fn test_after_hooks_chain_responses() {
        let mut hooks = Hooks::new();
        hooks.add_after_execute(Append("-c")).add_after_execute(Append("-d"));

        let table = route();
        let response = hooks.run_after(table.get("home").unwrap(), "body".into()).await;
        assert_eq!(response, "body-c-d");
    }

    #[tokio::test]
    async fn test_empty_after_hook_result_keeps_response() {
        let mut hooks = Hooks::new();
        hooks
            .add_after_execute(|_route: &Route, _response: &str| String::new())
            .add_after_execute(|_route: &Route, _response: &str| None::<String>);

        let table = route();
        let response = hooks.run_after(table.get("home").unwrap(), "body".into()).await;
        assert_eq!(response, "body");
    }
}
