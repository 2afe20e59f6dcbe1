//! The per-request input of the dispatcher.

use crate::auth::Authorizer;
use crate::route::normalize_path;
use http::{Method, Request};
use std::fmt;

/// Represents the context of a request being dispatched: its normalized url, its method
/// and whoever decides on secured routes for this requester.
pub struct RequestContext<'a> {
    url: String,
    method: Method,
    authorizer: &'a dyn Authorizer,
}

impl<'a> RequestContext<'a> {
    /// Creates a new RequestContext, normalizing `url`
    pub fn new(url: &str, method: Method, authorizer: &'a dyn Authorizer) -> Self {
        Self { url: normalize_url(url).to_owned(), method, authorizer }
    }

    /// Creates a RequestContext from the path and method of an http request
    pub fn from_request<B>(request: &Request<B>, authorizer: &'a dyn Authorizer) -> Self {
        Self::new(request.uri().path(), request.method().clone(), authorizer)
    }

    /// Returns the normalized url
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer
    }
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext").field("url", &self.url).field("method", &self.method).finish_non_exhaustive()
    }
}

/// Strips the query string, the fragment and any trailing slash.
pub fn normalize_url(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    normalize_path(&url[..end])
}
