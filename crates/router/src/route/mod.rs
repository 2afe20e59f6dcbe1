//! Route definitions and the ordered route table.
//!
//! ```text
//! RouteTable::add(name, pattern, handler, options)
//!     → validate pattern / handler
//!     → RoutePattern::compile (once)
//!     → stored under `name`, insertion order kept
//!
//! RouteTable::find_match(url, method)
//!     → scan in insertion order
//!     → method filter, then compiled pattern
//!     → first match wins
//! ```

mod pattern;
mod table;

pub use pattern::{normalize_path, RoutePattern};
pub use table::RouteTable;

use crate::handler::Handler;
use crate::plugin::PluginOptions;
use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// The action name used when neither the route nor the url selects one.
pub const DEFAULT_ACTION: &str = "_default";

/// The placeholder whose captured value selects the action instead of becoming a parameter.
pub const ACTION_PLACEHOLDER: &str = "_action";

/// A named rule mapping a url pattern to a handler. Immutable once added to a table.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: RoutePattern,
    handler: Handler,
    options: RouteOptions,
}

impl Route {
    pub(crate) fn new(name: String, pattern: RoutePattern, handler: Handler, options: RouteOptions) -> Self {
        Self { name, pattern, handler, options }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    pub fn method(&self) -> Option<&Method> {
        self.options.method.as_ref()
    }

    pub fn security(&self) -> Option<&Security> {
        self.options.security.as_ref().filter(|security| !security.is_empty())
    }

    /// The configured action, if any. Empty strings count as unset.
    pub fn action(&self) -> Option<&str> {
        self.options.action.as_deref().filter(|action| !action.is_empty())
    }

    /// The pattern up to its first placeholder, for building links back to this route.
    pub fn base_url(&self) -> &str {
        self.pattern.base_url()
    }

    /// Returns true when the route has no method filter or the filter equals `method`,
    /// ignoring case.
    pub fn accepts_method(&self, method: &Method) -> bool {
        self.method().is_none_or(|expected| expected.as_str().eq_ignore_ascii_case(method.as_str()))
    }

    pub fn is_match(&self, url: &str, method: &Method) -> bool {
        self.accepts_method(method) && self.pattern.is_match(url)
    }
}

/// The role, or set of roles, a route requires. Any single role is sufficient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct Security(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Security {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(role) => Self::from(role),
            OneOrMany::Many(roles) => Self::from(roles),
        }
    }
}

impl Security {
    pub fn roles(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Security {
    fn from(role: String) -> Self {
        if role.is_empty() { Self(vec![]) } else { Self(vec![role]) }
    }
}

impl From<&str> for Security {
    fn from(role: &str) -> Self {
        Self::from(role.to_owned())
    }
}

impl From<Vec<String>> for Security {
    fn from(roles: Vec<String>) -> Self {
        Self(roles.into_iter().filter(|role| !role.is_empty()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Security {
    fn from(roles: [&str; N]) -> Self {
        Self::from(roles.iter().map(ToString::to_string).collect::<Vec<_>>())
    }
}

/// Per-route configuration passed alongside the pattern and handler.
///
/// `opts` is handed to the plugin constructor untouched; `extra` keeps any other keys a
/// routes file declared.
#[derive(Clone, Default)]
pub struct RouteOptions {
    method: Option<Method>,
    security: Option<Security>,
    action: Option<String>,
    opts: PluginOptions,
    extra: Map<String, Value>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn security(mut self, security: impl Into<Security>) -> Self {
        self.security = Some(security.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn opts(mut self, opts: impl Into<PluginOptions>) -> Self {
        self.opts = opts.into();
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn plugin_options(&self) -> &PluginOptions {
        &self.opts
    }

    pub fn get_extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("method", &self.method)
            .field("security", &self.security)
            .field("action", &self.action)
            .field("opts", &self.opts)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}
