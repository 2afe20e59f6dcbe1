//! Route handlers.
//!
//! A route is handled either by a callable registered directly with the route, or by a
//! plugin referenced by name and resolved through the [`crate::PluginRegistry`].

mod fn_trait;
mod from_params;
mod responder;

pub use fn_trait::FnTrait;
pub use from_params::{FromParam, FromParams, ParamCursor, ParamError};
pub use responder::Responder;

use crate::error::HandlerResult;
use crate::PathParams;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, params: PathParams) -> HandlerResult;
}

/// a `FnTrait` holder which represents any async Fn taking path parameters positionally
pub struct FnHandler<F, Args> {
    f: F,
    _phantom: PhantomData<fn(Args)>,
}

impl<F, Args> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

pub fn handler_fn<F, Args>(f: F) -> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    FnHandler::new(f)
}

impl<F, Args> fmt::Debug for FnHandler<F, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("f", &std::any::type_name::<F>()).finish()
    }
}

#[async_trait]
impl<F, Args> RequestHandler for FnHandler<F, Args>
where
    F: FnTrait<Args>,
    F::Output: Future + Send,
    <F::Output as Future>::Output: Responder,
    Args: FromParams,
{
    async fn invoke(&self, params: PathParams) -> HandlerResult {
        let args = Args::from_params(&params)?;
        self.f.call(args).await.respond()
    }
}

/// What a route dispatches to.
#[derive(Clone)]
pub enum Handler {
    /// Invoked directly with the extracted parameters.
    Callable(Arc<dyn RequestHandler>),
    /// A plugin reference, e.g. `PostController` or `admin/Users.rs`.
    Plugin(String),
}

impl Handler {
    pub fn callable<H: RequestHandler + 'static>(handler: H) -> Self {
        Self::Callable(Arc::new(handler))
    }

    pub fn plugin(reference: impl Into<String>) -> Self {
        Self::Plugin(reference.into())
    }

    /// Plugin references must not be blank.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Callable(_) => true,
            Self::Plugin(reference) => !reference.trim().is_empty(),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable"),
            Self::Plugin(reference) => f.debug_tuple("Plugin").field(reference).finish(),
        }
    }
}

impl From<&str> for Handler {
    fn from(reference: &str) -> Self {
        Self::plugin(reference)
    }
}

impl From<String> for Handler {
    fn from(reference: String) -> Self {
        Self::plugin(reference)
    }
}

impl<F, Args> From<FnHandler<F, Args>> for Handler
where
    FnHandler<F, Args>: RequestHandler + 'static,
{
    fn from(handler: FnHandler<F, Args>) -> Self {
        Self::callable(handler)
    }
}
