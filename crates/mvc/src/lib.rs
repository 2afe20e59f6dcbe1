mod app;
mod env;
mod error;
mod security;

pub mod logging;
pub mod response;

pub use app::App;
pub use app::AppBuilder;
pub use env::AppEnv;
pub use env::DEFAULT_ENV;
pub use error::AppError;
pub use error::EnvError;
pub use error::SessionError;
pub use security::UserSession;

pub use micro_router as router;
