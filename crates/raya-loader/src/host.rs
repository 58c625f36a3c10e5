//! Host runtime capability
//!
//! Turning raw bytes into a runnable module is something only the host VM
//! can do. Loaders reach the host through [`ModuleHost`]:
//! - **find_loaded**: has this name already been materialized?
//! - **define**: materialize a module from bytes
//! - **link**: run the host's post-resolution step
//! - **system_resource**: the host's own resource lookup
//!
//! [`RegistryHost`] is a ready-made host keyed by module name, and
//! [`HostLoader`] is the bottom of every delegation chain.

use dashmap::{DashMap, DashSet};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use url::Url;

use crate::error::{DefineError, LoaderError};
use crate::loader::{ModuleLoader, ResourceStream};

/// Capabilities a host runtime provides to loaders.
pub trait ModuleHost: Send + Sync {
    /// Materialized module handle. Cloning must preserve identity.
    type Unit: Clone + Send + Sync + 'static;

    /// The module registered under `name`, if it has been materialized.
    fn find_loaded(&self, name: &str) -> Option<Self::Unit>;

    /// Materialize and register a module from its raw bytes.
    fn define(&self, name: &str, bytes: Vec<u8>) -> Result<Self::Unit, DefineError>;

    /// Post-resolution linking step.
    fn link(&self, _unit: &Self::Unit) {}

    /// The host's own resource lookup, consulted before the parent chain and
    /// any archive.
    fn system_resource(&self, _path: &str) -> Option<ResourceStream> {
        None
    }
}

type Decoder<T> = dyn Fn(&str, &[u8]) -> Result<T, DefineError> + Send + Sync;

/// Host that keeps materialized modules in a name-indexed registry.
///
/// Modules are decoded by a caller-supplied function and stored as `Arc<T>`,
/// so two resolutions of the same name compare equal with [`Arc::ptr_eq`].
pub struct RegistryHost<T> {
    modules: DashMap<String, Arc<T>>,
    linked: DashSet<String>,
    resources: HashMap<String, Vec<u8>>,
    decoder: Box<Decoder<T>>,
}

impl<T: Send + Sync + 'static> RegistryHost<T> {
    /// Create an empty registry that decodes modules with `decoder`.
    pub fn new<F>(decoder: F) -> Self
    where
        F: Fn(&str, &[u8]) -> Result<T, DefineError> + Send + Sync + 'static,
    {
        Self {
            modules: DashMap::new(),
            linked: DashSet::new(),
            resources: HashMap::new(),
            decoder: Box::new(decoder),
        }
    }

    /// Add a resource served by [`ModuleHost::system_resource`].
    pub fn with_resource(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.resources.insert(path.into(), data.into());
        self
    }

    /// Register an already built module under `name`.
    ///
    /// Replaces any previous module with that name.
    pub fn register(&self, name: impl Into<String>, module: T) -> Arc<T> {
        let module = Arc::new(module);
        self.modules.insert(name.into(), module.clone());
        module
    }

    /// Get a module by name
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.modules.get(name).map(|m| m.value().clone())
    }

    /// Whether [`ModuleHost::link`] has run for `name`.
    pub fn is_linked(&self, name: &str) -> bool {
        self.linked.contains(name)
    }

    /// Get the number of registered modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl<T> ModuleHost for RegistryHost<T>
where
    T: Send + Sync + 'static,
{
    type Unit = Arc<T>;

    fn find_loaded(&self, name: &str) -> Option<Arc<T>> {
        self.get(name)
    }

    fn define(&self, name: &str, bytes: Vec<u8>) -> Result<Arc<T>, DefineError> {
        if self.modules.contains_key(name) {
            return Err(DefineError::Duplicate(name.to_string()));
        }
        // Decode outside the map's shard lock; the decoder may call back in.
        let module = Arc::new((self.decoder)(name, &bytes)?);
        match self.modules.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(DefineError::Duplicate(name.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(module.clone());
                Ok(module)
            }
        }
    }

    fn link(&self, unit: &Arc<T>) {
        let registered = self
            .modules
            .iter()
            .find(|entry| Arc::ptr_eq(entry.value(), unit))
            .map(|entry| entry.key().clone());
        if let Some(name) = registered {
            self.linked.insert(name);
        }
    }

    fn system_resource(&self, path: &str) -> Option<ResourceStream> {
        let data = self.resources.get(path)?.clone();
        Some(Box::new(Cursor::new(data)))
    }
}

impl<T> std::fmt::Debug for RegistryHost<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryHost")
            .field("modules", &self.modules.len())
            .field("resources", &self.resources.len())
            .finish_non_exhaustive()
    }
}

/// The host's default loader: the root of a delegation chain.
///
/// Resolves only modules the host already knows and serves only the host's
/// own resources.
#[derive(Debug)]
pub struct HostLoader<H> {
    host: Arc<H>,
}

impl<H: ModuleHost> HostLoader<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }
}

impl<H: ModuleHost> ModuleLoader for HostLoader<H> {
    type Unit = H::Unit;

    fn resolve(&self, name: &str, link: bool) -> Result<H::Unit, LoaderError> {
        let unit = self
            .host
            .find_loaded(name)
            .ok_or_else(|| LoaderError::not_found(name))?;
        if link {
            self.host.link(&unit);
        }
        Ok(unit)
    }

    fn open_resource_stream(&self, path: &str) -> Option<ResourceStream> {
        self.host.system_resource(path)
    }

    fn resource_location(&self, _path: &str) -> Option<Url> {
        None
    }
}
