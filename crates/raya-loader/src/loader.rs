//! Archive-backed module loader with parent delegation
//!
//! Resolution order for a module name:
//! 1. the host's registry of already materialized modules
//! 2. the loader's archives, in priority order
//! 3. the parent loader
//!
//! Resource streams are looked up in the host's own resources, then through
//! the parent chain, and fall back to the archives.

use parking_lot::ReentrantMutex;
use std::io::{Cursor, Read};
use std::sync::Arc;
use url::Url;

use crate::archive::ArchiveSet;
use crate::config::LoaderConfig;
use crate::error::{ConfigError, DefineError, LoaderError};
use crate::host::ModuleHost;
use crate::resource::Resource;

/// Byte stream returned by resource lookups.
pub type ResourceStream = Box<dyn Read + Send>;

/// Something that can resolve modules and open resources.
///
/// Loaders form a delegation chain: each one holds a parent implementing
/// this same trait, down to a [`HostLoader`](crate::HostLoader).
pub trait ModuleLoader: Send + Sync {
    /// The materialized module type.
    type Unit;

    /// Resolve a fully-qualified module name, linking it if `link` is set.
    fn resolve(&self, name: &str, link: bool) -> Result<Self::Unit, LoaderError>;

    /// Open a resource as a byte stream. Absence is not an error.
    fn open_resource_stream(&self, path: &str) -> Option<ResourceStream>;

    /// Locate a resource by address.
    fn resource_location(&self, path: &str) -> Option<Url>;

    /// Resolve without linking.
    fn load(&self, name: &str) -> Result<Self::Unit, LoaderError> {
        self.resolve(name, false)
    }
}

/// Shared handle to a parent loader producing `U`.
pub type ParentLoader<U> = Arc<dyn ModuleLoader<Unit = U>>;

/// Module loader backed by an ordered set of zip archives.
///
/// The archive set is fixed at construction. Resolutions through one loader
/// are serialized by a single reentrant lock, so the "already resolved" check
/// and the materialization that may follow happen at most once per name even
/// when several threads race on it. A host may resolve dependencies through
/// the same loader from inside [`ModuleHost::define`].
pub struct ArchiveLoader<H: ModuleHost> {
    archives: ArchiveSet,
    config: LoaderConfig,
    host: Arc<H>,
    parent: ParentLoader<H::Unit>,
    resolve_lock: ReentrantMutex<()>,
}

impl<H: ModuleHost> ArchiveLoader<H> {
    /// Create a loader over `resources` with the default configuration.
    ///
    /// Unusable resources are skipped; see [`ArchiveSet::open`].
    pub fn new<I, R>(resources: I, host: Arc<H>, parent: ParentLoader<H::Unit>) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Resource,
    {
        Self::assemble(
            ArchiveSet::open(resources),
            LoaderConfig::default(),
            host,
            parent,
        )
    }

    /// Create a loader over the archives listed in `config`.
    ///
    /// Fails if `config` does not pass [`LoaderConfig::validate`]; no archive
    /// is opened in that case.
    pub fn from_config(
        config: LoaderConfig,
        host: Arc<H>,
        parent: ParentLoader<H::Unit>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let archives = ArchiveSet::open(&config.archives);
        Ok(Self::assemble(archives, config, host, parent))
    }

    /// Create a loader over an already opened archive set.
    pub fn with_archives(
        archives: ArchiveSet,
        config: LoaderConfig,
        host: Arc<H>,
        parent: ParentLoader<H::Unit>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(archives, config, host, parent))
    }

    fn assemble(
        archives: ArchiveSet,
        config: LoaderConfig,
        host: Arc<H>,
        parent: ParentLoader<H::Unit>,
    ) -> Self {
        tracing::debug!(archives = archives.len(), "archive loader created");
        Self {
            archives,
            config,
            host,
            parent,
            resolve_lock: ReentrantMutex::new(()),
        }
    }

    /// Number of archives that opened successfully.
    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    /// The loader consulted when no archive has a module.
    pub fn parent(&self) -> &ParentLoader<H::Unit> {
        &self.parent
    }

    /// The host that materializes modules for this loader.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Entry naming configuration in effect.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Look `name` up in this loader's archives only.
    ///
    /// Skips the already-resolved check and never delegates.
    pub fn find_local(&self, name: &str) -> Result<H::Unit, LoaderError> {
        let _guard = self.resolve_lock.lock();

        match self.define_local(name) {
            Ok(Some(unit)) => Ok(unit),
            Ok(None) => Err(LoaderError::not_found(name)),
            Err(cause) => Err(LoaderError::NotFound {
                name: name.to_string(),
                cause: Some(cause),
            }),
        }
    }

    /// Close every archive, ignoring individual failures.
    ///
    /// Must not race with in-flight resolutions. Calling it twice is harmless.
    pub fn close(&self) {
        self.archives.close();
    }

    /// Materialize `name` from the first archive that has it.
    ///
    /// `Ok(None)` means no archive yielded bytes for the name.
    fn define_local(&self, name: &str) -> Result<Option<H::Unit>, DefineError> {
        let key = self.config.entry_key(name);
        let Some(bytes) = self.archives.find_bytes(&key) else {
            return Ok(None);
        };

        match self.host.define(name, bytes) {
            Ok(unit) => {
                tracing::trace!(module = name, entry = %key, "module defined from archive");
                Ok(Some(unit))
            }
            Err(e) => {
                tracing::debug!(module = name, entry = %key, error = %e, "host rejected module bytes");
                Err(e)
            }
        }
    }
}

impl<H: ModuleHost> ModuleLoader for ArchiveLoader<H> {
    type Unit = H::Unit;

    fn resolve(&self, name: &str, link: bool) -> Result<H::Unit, LoaderError> {
        let _guard = self.resolve_lock.lock();

        let unit = match self.host.find_loaded(name) {
            Some(unit) => {
                tracing::trace!(module = name, "module already resolved");
                unit
            }
            None => match self.define_local(name) {
                Ok(Some(unit)) => unit,
                Ok(None) => {
                    tracing::trace!(module = name, "delegating to parent loader");
                    return self.parent.resolve(name, link);
                }
                Err(cause) => {
                    return Err(LoaderError::NotFound {
                        name: name.to_string(),
                        cause: Some(cause),
                    })
                }
            },
        };

        if link {
            self.host.link(&unit);
        }
        Ok(unit)
    }

    fn open_resource_stream(&self, path: &str) -> Option<ResourceStream> {
        if let Some(stream) = self.host.system_resource(path) {
            return Some(stream);
        }
        if let Some(stream) = self.parent.open_resource_stream(path) {
            return Some(stream);
        }

        let bytes = self.archives.find_bytes(path)?;
        Some(Box::new(Cursor::new(bytes)))
    }

    /// Always `None`, even for paths that [`open_resource_stream`] can serve.
    ///
    /// Archive entries have no addressable location.
    ///
    /// [`open_resource_stream`]: ModuleLoader::open_resource_stream
    fn resource_location(&self, _path: &str) -> Option<Url> {
        None
    }
}

impl<H: ModuleHost> std::fmt::Debug for ArchiveLoader<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveLoader")
            .field("archives", &self.archives)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
