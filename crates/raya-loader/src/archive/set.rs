//! Ordered archive set and its lifecycle.

use parking_lot::Mutex;

use super::reader::{lookup, Lookup};
use super::{Archive, ZipArchiveHandle};
use crate::resource::{check_usable, Resource};

/// Ordered, immutable list of open archives.
///
/// The order is the lookup priority: the first archive containing an entry
/// wins. Each handle sits behind its own lock because entry readers need
/// exclusive access to the underlying file.
pub struct ArchiveSet {
    archives: Vec<Mutex<Box<dyn Archive>>>,
}

impl ArchiveSet {
    /// Open every usable resource as a zip archive, in order.
    ///
    /// Sources that do not exist, are not plain files, are not readable or
    /// fail to open are skipped. The result may be empty.
    pub fn open<I, R>(resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Resource,
    {
        let archives = resources
            .into_iter()
            .filter_map(|resource| open_one(&resource))
            .map(|handle| Box::new(handle) as Box<dyn Archive>)
            .collect();
        Self::from_archives(archives)
    }

    /// Build a set from handles that are already open.
    pub fn from_archives(archives: Vec<Box<dyn Archive>>) -> Self {
        Self {
            archives: archives.into_iter().map(Mutex::new).collect(),
        }
    }

    /// Number of open archives.
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether no archive opened successfully.
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Bytes of entry `key` from the first archive that contains it.
    ///
    /// Once an archive reports the entry, later archives are not consulted,
    /// even if reading it fails.
    pub fn find_bytes(&self, key: &str) -> Option<Vec<u8>> {
        for (index, archive) in self.archives.iter().enumerate() {
            let mut archive = archive.lock();
            match lookup(&mut **archive, key) {
                Lookup::Absent => continue,
                Lookup::Found(data) => {
                    tracing::trace!(entry = key, archive = index, size = data.len(), "entry found");
                    return Some(data);
                }
                Lookup::Unreadable => return None,
            }
        }
        None
    }

    /// Close every archive, ignoring individual failures.
    pub fn close(&self) {
        for archive in &self.archives {
            let _ = archive.lock().close();
        }
    }
}

impl std::fmt::Debug for ArchiveSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSet")
            .field("archives", &self.archives.len())
            .finish()
    }
}

fn open_one<R: Resource>(resource: &R) -> Option<ZipArchiveHandle> {
    if let Err(reason) = check_usable(resource) {
        tracing::debug!(source = %resource.display(), reason = reason.as_str(), "skipping archive source");
        return None;
    }

    let file = match resource.local_file() {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(source = %resource.display(), error = %e, "skipping archive source");
            return None;
        }
    };

    match ZipArchiveHandle::open(file, resource.display()) {
        Ok(handle) => {
            tracing::debug!(source = %resource.display(), entries = handle.len(), "opened archive");
            Some(handle)
        }
        Err(e) => {
            tracing::debug!(source = %resource.display(), error = %e, "skipping archive source");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_skips_unusable_sources() {
        let temp = tempfile::tempdir().unwrap();
        let good = temp.path().join("good.zip");
        write_zip(&good, &[("a.txt", b"a")]);
        let junk = temp.path().join("junk.zip");
        std::fs::write(&junk, b"not a zip").unwrap();

        let sources: Vec<PathBuf> = vec![
            temp.path().join("missing.zip"),
            temp.path().to_path_buf(),
            junk,
            good,
        ];
        let set = ArchiveSet::open(&sources);

        assert_eq!(set.len(), 1);
        assert_eq!(set.find_bytes("a.txt"), Some(b"a".to_vec()));
    }

    #[test]
    fn test_empty_set() {
        let set = ArchiveSet::open(Vec::<PathBuf>::new());
        assert!(set.is_empty());
        assert_eq!(set.find_bytes("anything"), None);
        set.close();
    }

    #[test]
    fn test_first_archive_wins() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a.zip");
        let b = temp.path().join("b.zip");
        write_zip(&a, &[("shared", b"from a")]);
        write_zip(&b, &[("shared", b"from b"), ("only-b", b"b")]);

        let set = ArchiveSet::open([a, b]);
        assert_eq!(set.find_bytes("shared"), Some(b"from a".to_vec()));
        assert_eq!(set.find_bytes("only-b"), Some(b"b".to_vec()));
        assert_eq!(set.find_bytes("nowhere"), None);
    }
}
