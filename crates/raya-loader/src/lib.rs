//! Raya Archive Loader
//!
//! Loads compiled modules by name from an ordered set of zip archives, and
//! delegates to a parent loader when no archive has the module.
//!
//! - **archive**: archive handles, entry extraction, the ordered archive set
//! - **host**: the host runtime capability that materializes modules
//! - **loader**: the delegating [`ArchiveLoader`]
//! - **config**: `loader.toml` configuration
//! - **resource**: candidate archive sources
//!
//! ```ignore
//! let host = Arc::new(RegistryHost::new(decode_module));
//! let parent = Arc::new(HostLoader::new(host.clone()));
//! let loader = ArchiveLoader::new(["lib/core.zip", "lib/extra.zip"].map(PathBuf::from), host, parent);
//! let module = loader.resolve("pkg.Foo", true)?;
//! loader.close();
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod host;
pub mod loader;
pub mod resource;

pub use archive::{read_entry, Archive, ArchiveEntry, ArchiveSet, ZipArchiveHandle, READ_CHUNK};
pub use config::{LoaderConfig, DEFAULT_ENTRY_SUFFIX, DEFAULT_SEPARATOR};
pub use error::{ConfigError, DefineError, LoaderError};
pub use host::{HostLoader, ModuleHost, RegistryHost};
pub use loader::{ArchiveLoader, ModuleLoader, ParentLoader, ResourceStream};
pub use resource::Resource;
