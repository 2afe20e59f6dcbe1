use crate::error::{DispatchError, RouteError};
use crate::handler::Handler;
use crate::route::{Route, RouteOptions, RoutePattern};
use http::Method;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ordered mapping from route name to route.
///
/// Iteration follows insertion order and the first matching route wins; there is no
/// reordering by specificity. Adding a name that already exists replaces the earlier
/// route in its original position.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route, compiling its pattern.
    ///
    /// # Errors
    /// [`RouteError::InvalidRoute`] for an empty pattern, [`RouteError::InvalidHandler`]
    /// for a blank plugin reference. The table is left untouched on error.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        handler: impl Into<Handler>,
        options: RouteOptions,
    ) -> Result<(), RouteError> {
        let name = name.into();
        if pattern.trim().is_empty() {
            return Err(RouteError::invalid_route(name));
        }

        let handler = handler.into();
        if !handler.is_valid() {
            return Err(RouteError::invalid_handler(pattern));
        }

        let compiled = RoutePattern::compile(pattern)
            .map_err(|source| RouteError::Compile { pattern: pattern.to_owned(), source })?;
        debug!(route = %name, pattern, regex = compiled.as_regex(), "route added");

        let route = Route::new(name.clone(), compiled, handler, options);
        match self.index.get(&name) {
            Some(&position) => {
                warn!(route = %name, "route name already registered, replacing the earlier route");
                self.routes[position] = route;
            }
            None => {
                self.index.insert(name, self.routes.len());
                self.routes.push(route);
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.index.get(name).map(|&position| &self.routes[position])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns the first route, in insertion order, accepting `url` and `method`.
    ///
    /// # Errors
    /// [`DispatchError::NoRoutesConfigured`] when the table is empty, which is distinct
    /// from `Ok(None)` for "nothing matched".
    pub fn find_match(&self, url: &str, method: &Method) -> Result<Option<&Route>, DispatchError> {
        if self.is_empty() {
            return Err(DispatchError::NoRoutesConfigured);
        }
        Ok(self.routes.iter().find(|route| route.is_match(url, method)))
    }
}
