//! Shared fixtures for loader integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use raya_loader::{
    Archive, ArchiveEntry, DefineError, HostLoader, LoaderError, ModuleLoader, RegistryHost,
    ResourceStream,
};
use url::Url;
use zip::write::SimpleFileOptions;

/// Test module: the name it was defined under and the bytes it came from.
#[derive(Debug, PartialEq)]
pub struct TestModule {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub type TestHost = RegistryHost<TestModule>;

/// Host whose decoder rejects any payload starting with `BAD` and counts
/// every decode attempt.
pub fn counting_host() -> (Arc<TestHost>, Arc<AtomicUsize>) {
    let defines = Arc::new(AtomicUsize::new(0));
    let counter = defines.clone();
    let host = RegistryHost::new(move |name: &str, bytes: &[u8]| {
        counter.fetch_add(1, Ordering::SeqCst);
        if bytes.starts_with(b"BAD") {
            return Err(DefineError::Malformed(format!("{}: bad header", name)));
        }
        Ok(TestModule {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        })
    });
    (Arc::new(host), defines)
}

pub fn test_host() -> Arc<TestHost> {
    counting_host().0
}

pub fn module(name: &str, bytes: &[u8]) -> TestModule {
    TestModule {
        name: name.to_string(),
        bytes: bytes.to_vec(),
    }
}

/// Write a deflated zip archive with the given entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Parent loader that records how often it is consulted.
pub struct RecordingParent {
    inner: HostLoader<TestHost>,
    pub resolves: AtomicUsize,
    pub streams: AtomicUsize,
}

impl RecordingParent {
    pub fn new(host: Arc<TestHost>) -> Arc<Self> {
        Arc::new(Self {
            inner: HostLoader::new(host),
            resolves: AtomicUsize::new(0),
            streams: AtomicUsize::new(0),
        })
    }

    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

impl ModuleLoader for RecordingParent {
    type Unit = Arc<TestModule>;

    fn resolve(&self, name: &str, link: bool) -> Result<Self::Unit, LoaderError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(name, link)
    }

    fn open_resource_stream(&self, path: &str) -> Option<ResourceStream> {
        self.streams.fetch_add(1, Ordering::SeqCst);
        self.inner.open_resource_stream(path)
    }

    fn resource_location(&self, path: &str) -> Option<Url> {
        self.inner.resource_location(path)
    }
}

/// In-memory archive that counts entry lookups and close attempts.
pub struct CountingArchive {
    entries: HashMap<String, Vec<u8>>,
    pub lookups: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    fail_close: bool,
}

impl CountingArchive {
    pub fn new(entries: &[(&str, &[u8])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, data)| (name.to_string(), data.to_vec()))
                .collect(),
            lookups: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
        }
    }

    /// Make `close` fail after recording the attempt.
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Share the counters with another archive.
    pub fn sharing(mut self, lookups: &Arc<AtomicUsize>, closes: &Arc<AtomicUsize>) -> Self {
        self.lookups = lookups.clone();
        self.closes = closes.clone();
        self
    }
}

impl Archive for CountingArchive {
    fn entry(&mut self, name: &str) -> io::Result<Option<ArchiveEntry<'_>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .entries
            .get(name)
            .map(|data| ArchiveEntry::new(data.len() as u64, Cursor::new(data.as_slice()))))
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(io::Error::other("close failed"))
        } else {
            Ok(())
        }
    }
}

/// Archive whose entries exist but always fail to read.
pub struct BrokenArchive {
    names: Vec<String>,
}

impl BrokenArchive {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

struct BrokenReader;

impl io::Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::InvalidData, "invalid deflate stream"))
    }
}

impl Archive for BrokenArchive {
    fn entry(&mut self, name: &str) -> io::Result<Option<ArchiveEntry<'_>>> {
        if self.names.iter().any(|n| n == name) {
            Ok(Some(ArchiveEntry::new(16, BrokenReader)))
        } else {
            Ok(None)
        }
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
