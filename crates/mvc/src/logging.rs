//! Installs the process wide `tracing` subscriber.

use crate::error::AppError;
use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static SUBSCRIBER: OnceCell<Level> = OnceCell::new();

/// Installs a fmt subscriber with `level` as max level.
///
/// Only the first call installs anything; later calls return the level already in use.
///
/// # Errors
/// [`AppError::Logging`] when another subscriber was installed outside of this function.
pub fn init(level: Level) -> Result<Level, AppError> {
    SUBSCRIBER
        .get_or_try_init(|| -> Result<Level, AppError> {
            let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(level)
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::init;
    use tracing::Level;

    #[test]
    fn test_init_once() {
        let installed = init(Level::DEBUG).unwrap();
        assert_eq!(init(Level::ERROR).unwrap(), installed);
    }
}
