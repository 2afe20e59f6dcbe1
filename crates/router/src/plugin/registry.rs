use crate::error::{DispatchError, HandlerError};
use crate::plugin::{Controller, Plugin, PluginOptions};
use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Extension appended to bare plugin references.
pub const PLUGIN_EXTENSION: &str = "rs";

pub type PluginConstructor = dyn Fn(&PluginOptions) -> Result<Box<dyn Controller>, HandlerError> + Send + Sync;

/// A named constructor for a plugin.
#[derive(Clone)]
pub struct PluginFactory {
    class: String,
    constructor: Arc<PluginConstructor>,
}

impl PluginFactory {
    pub fn new<F>(class: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&PluginOptions) -> Result<Box<dyn Controller>, HandlerError> + Send + Sync + 'static,
    {
        Self { class: class.into(), constructor: Arc::new(constructor) }
    }

    pub fn of<P: Plugin>() -> Self {
        Self::new(P::NAME, |options| Ok(Box::new(P::create(options)?) as Box<dyn Controller>))
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// # Errors
    /// The plugin's own construction error.
    pub fn create(&self, options: &PluginOptions) -> Result<Box<dyn Controller>, HandlerError> {
        (self.constructor)(options)
    }
}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFactory").field("class", &self.class).finish_non_exhaustive()
    }
}

/// Plugin sources known to the application, populated at startup.
///
/// Sources are keyed by path. A reference without a directory component is looked up in
/// the default directory, with [`PLUGIN_EXTENSION`] appended unless it already has an
/// extension; any other reference is used as the path itself.
#[derive(Debug)]
pub struct PluginRegistry {
    default_dir: PathBuf,
    sources: HashMap<PathBuf, PluginFactory>,
    loaded: Mutex<HashSet<PathBuf>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new("plugins")
    }
}

impl PluginRegistry {
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        Self { default_dir: default_dir.into(), sources: HashMap::new(), loaded: Mutex::new(HashSet::new()) }
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// Registers `P` as `<default dir>/<P::NAME>.rs`.
    #[must_use]
    pub fn register<P: Plugin>(self) -> Self {
        let path = self.default_dir.join(format!("{}.{PLUGIN_EXTENSION}", P::NAME));
        self.register_at(path, PluginFactory::of::<P>())
    }

    /// Registers a factory under an explicit source path.
    #[must_use]
    pub fn register_at(mut self, path: impl AsRef<Path>, factory: PluginFactory) -> Self {
        let path = normalize(path.as_ref());
        debug!(path = %path.display(), class = factory.class(), "plugin registered");
        self.sources.insert(path, factory);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The source path a reference resolves to.
    pub fn locate(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        let in_default_dir = path.parent().is_none_or(|parent| parent.as_os_str().is_empty() || parent == Path::new("."));
        if !in_default_dir {
            return normalize(path);
        }

        let file_name = path.file_name().and_then(OsStr::to_str).unwrap_or(reference);
        let file_name = if path.extension().is_some() {
            file_name.to_owned()
        } else {
            format!("{file_name}.{PLUGIN_EXTENSION}")
        };
        normalize(&self.default_dir.join(file_name))
    }

    /// Resolves a reference to its factory, marking the source as loaded.
    ///
    /// Loading the same source again is not an error; the source simply stays loaded.
    ///
    /// # Errors
    /// [`DispatchError::HandlerNotFound`] when no source is registered at the resolved
    /// path, or when the source does not define a class named after its file stem.
    pub fn load(&self, reference: &str) -> Result<&PluginFactory, DispatchError> {
        let path = self.locate(reference);
        let factory = self.sources.get(&path).ok_or_else(|| {
            DispatchError::handler_not_found(reference, format!("no plugin source at {}", path.display()))
        })?;

        self.mark_loaded(&path);

        let class = path.file_stem().and_then(OsStr::to_str).unwrap_or_default();
        if factory.class() != class {
            return Err(DispatchError::handler_not_found(
                reference,
                format!("{} does not define a plugin named `{class}`", path.display()),
            ));
        }
        Ok(factory)
    }

    pub fn is_loaded(&self, reference: &str) -> bool {
        let path = self.locate(reference);
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner).contains(&path)
    }

    fn mark_loaded(&self, path: &Path) {
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if loaded.insert(path.to_path_buf()) {
            debug!(path = %path.display(), "plugin source loaded");
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
