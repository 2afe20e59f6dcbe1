mod auth;
mod dispatcher;
mod error;
mod error_page;
mod hooks;
mod params;
mod request;
mod resolver;

pub mod config;
pub mod handler;
pub mod plugin;
pub mod route;

pub use auth::Anonymous;
pub use auth::Authorizer;
pub use dispatcher::Dispatch;
pub use dispatcher::Dispatcher;
pub use dispatcher::DispatcherBuilder;
pub use dispatcher::RouteMatch;
pub use dispatcher::RouterState;
pub use error::ConfigError;
pub use error::DispatchError;
pub use error::HandlerError;
pub use error::HandlerResult;
pub use error::RouteError;
pub use error_page::DefaultErrorPages;
pub use error_page::ErrorResponder;
pub use handler::handler_fn;
pub use handler::FnHandler;
pub use handler::Handler;
pub use handler::RequestHandler;
pub use handler::Responder;
pub use hooks::AfterExecute;
pub use hooks::BeforeExecute;
pub use hooks::Hooks;
pub use params::extract as extract_params;
pub use params::PathParams;
pub use plugin::Controller;
pub use plugin::Plugin;
pub use plugin::PluginOptions;
pub use plugin::PluginRegistry;
pub use request::normalize_url;
pub use request::RequestContext;
pub use resolver::normalize_action;
pub use resolver::HandlerResolver;
pub use route::Route;
pub use route::RouteOptions;
pub use route::RouteTable;
pub use route::Security;
