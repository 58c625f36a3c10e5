//! Resource references for candidate archive sources.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// A reference to something that may be backed by a local archive file.
///
/// The loader only needs existence and readability checks plus a way to
/// obtain a native file handle. Anything that can answer those can be used
/// as an archive source.
pub trait Resource {
    /// Whether the resource exists at all.
    fn exists(&self) -> bool;

    /// Whether the resource is a plain file (not a directory).
    fn is_file(&self) -> bool;

    /// Whether the current process can read the resource.
    fn is_readable(&self) -> bool;

    /// Human-readable location, used in log events.
    fn display(&self) -> String;

    /// Open a native file handle for the resource.
    fn local_file(&self) -> io::Result<File>;
}

impl Resource for Path {
    fn exists(&self) -> bool {
        Path::exists(self)
    }

    fn is_file(&self) -> bool {
        Path::is_file(self)
    }

    fn is_readable(&self) -> bool {
        File::open(self).is_ok()
    }

    fn display(&self) -> String {
        Path::display(self).to_string()
    }

    fn local_file(&self) -> io::Result<File> {
        File::open(self)
    }
}

impl Resource for PathBuf {
    fn exists(&self) -> bool {
        self.as_path().exists()
    }

    fn is_file(&self) -> bool {
        self.as_path().is_file()
    }

    fn is_readable(&self) -> bool {
        Resource::is_readable(self.as_path())
    }

    fn display(&self) -> String {
        self.as_path().display().to_string()
    }

    fn local_file(&self) -> io::Result<File> {
        Resource::local_file(self.as_path())
    }
}

impl<T: Resource + ?Sized> Resource for &T {
    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn is_file(&self) -> bool {
        (**self).is_file()
    }

    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn display(&self) -> String {
        (**self).display()
    }

    fn local_file(&self) -> io::Result<File> {
        (**self).local_file()
    }
}

/// Why a candidate source was not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unusable {
    Missing,
    NotAFile,
    Unreadable,
}

impl Unusable {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Unusable::Missing => "does not exist",
            Unusable::NotAFile => "is not a file",
            Unusable::Unreadable => "is not readable",
        }
    }
}

/// Run the existence, type and readability checks in that order.
pub(crate) fn check_usable<R: Resource + ?Sized>(resource: &R) -> Result<(), Unusable> {
    if !resource.exists() {
        return Err(Unusable::Missing);
    }
    if !resource.is_file() {
        return Err(Unusable::NotAFile);
    }
    if !resource.is_readable() {
        return Err(Unusable::Unreadable);
    }
    Ok(())
}
