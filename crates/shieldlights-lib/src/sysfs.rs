//! Sysfs access — trait + filesystem backend + in-memory mock.
//!
//! The prober only ever asks three questions of the filesystem: does this
//! directory exist, what entries does it have, and can this node be opened.
//! [`SysfsView`] captures exactly that so discovery can run against a fake
//! tree in tests.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Default sysfs mount point.
pub const SYSFS_ROOT: &str = "/sys";

/// How a node is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Write-only attribute (brightness, effects, state).
    Write,
    /// Read at startup, written afterwards (power LED brightness).
    ReadWrite,
}

/// An open sysfs attribute.
pub trait SysfsNode: Send {
    /// Absolute path of the node, for logging.
    fn path(&self) -> &Path;

    /// Write `value` followed by a newline as a single write.
    fn write_value(&mut self, value: &str) -> io::Result<()>;

    /// Read the first line of the node, without the trailing newline.
    fn read_value(&mut self) -> io::Result<String>;
}

/// Read-only view of a sysfs tree. Paths are relative to the view's root.
pub trait SysfsView {
    type Node: SysfsNode;

    fn exists(&self, rel: &Path) -> bool;

    /// Entries of `rel` in enumeration order, as paths relative to the root.
    /// The order is whatever the filesystem reports.
    fn list_dir(&self, rel: &Path) -> io::Result<Vec<PathBuf>>;

    /// Open a node. `None` when the node is absent or not accessible.
    fn open(&self, rel: &Path, access: Access) -> Option<Self::Node>;
}

// ── Filesystem backend ──

/// Sysfs tree rooted at a real directory (normally `/sys`).
#[derive(Debug, Clone)]
pub struct SysfsRoot {
    root: PathBuf,
}

impl SysfsRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SysfsRoot { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for SysfsRoot {
    fn default() -> Self {
        Self::new(SYSFS_ROOT)
    }
}

/// An open file under a [`SysfsRoot`].
#[derive(Debug)]
pub struct SysfsFile {
    path: PathBuf,
    file: File,
}

impl SysfsNode for SysfsFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn write_value(&mut self, value: &str) -> io::Result<()> {
        // One buffer, one write: sysfs attributes treat each write as a store.
        let line = format!("{value}\n");
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }

    fn read_value(&mut self) -> io::Result<String> {
        let mut line = String::new();
        BufReader::new(&mut self.file).read_line(&mut line)?;
        Ok(line.trim_end().to_string())
    }
}

impl SysfsView for SysfsRoot {
    type Node = SysfsFile;

    fn exists(&self, rel: &Path) -> bool {
        self.root.join(rel).exists()
    }

    fn list_dir(&self, rel: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(self.root.join(rel))? {
            entries.push(rel.join(entry?.file_name()));
        }
        Ok(entries)
    }

    fn open(&self, rel: &Path, access: Access) -> Option<Self::Node> {
        let path = self.root.join(rel);
        let mut opts = OpenOptions::new();
        opts.write(true);
        if access == Access::ReadWrite {
            opts.read(true);
        }
        // Never create: a missing attribute means missing hardware.
        let file = opts.open(&path).ok()?;
        Some(SysfsFile { path, file })
    }
}

// ── Mock sysfs for testing ──

/// In-memory sysfs tree for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// A single recorded write: node path (relative) and the exact bytes written.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedWrite {
        pub path: PathBuf,
        pub data: String,
    }

    /// Fake sysfs tree. Directories keep their entries in insertion order
    /// so tests can control enumeration order.
    #[derive(Default)]
    pub struct MockSysfs {
        dirs: HashMap<PathBuf, Vec<String>>,
        nodes: HashMap<PathBuf, String>,
        failing_dirs: HashSet<PathBuf>,
        failing_writes: HashSet<PathBuf>,
        /// Every write from every node, in the order it happened.
        pub writes: Arc<Mutex<Vec<RecordedWrite>>>,
    }

    impl MockSysfs {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a node with initial contents. Parent directories are created
        /// and the node's name is appended to its parent's entries.
        pub fn node(mut self, rel: &str, contents: &str) -> Self {
            let path = PathBuf::from(rel);
            self.add_parents(&path);
            self.nodes.insert(path, contents.to_string());
            self
        }

        /// Add an empty directory (no-op if it already exists).
        pub fn dir(mut self, rel: &str) -> Self {
            let path = PathBuf::from(rel);
            self.add_parents(&path);
            self.dirs.entry(path).or_default();
            self
        }

        /// Make enumeration of `rel` fail with an I/O error.
        pub fn fail_list(mut self, rel: &str) -> Self {
            self.failing_dirs.insert(PathBuf::from(rel));
            self.dir(rel)
        }

        /// Node opens, but every write to it fails.
        pub fn fail_writes(mut self, rel: &str) -> Self {
            self.failing_writes.insert(PathBuf::from(rel));
            self
        }

        fn add_parents(&mut self, path: &Path) {
            let mut child = path;
            while let Some(parent) = child.parent() {
                if parent.as_os_str().is_empty() {
                    break;
                }
                let name = child
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let entries = self.dirs.entry(parent.to_path_buf()).or_default();
                if !entries.contains(&name) {
                    entries.push(name);
                }
                child = parent;
            }
        }

        /// All recorded writes.
        pub fn all_writes(&self) -> Vec<RecordedWrite> {
            self.writes.lock().map(|w| w.clone()).unwrap_or_default()
        }

        /// Values written to one node, newline included, in order.
        pub fn writes_to(&self, rel: &str) -> Vec<String> {
            let rel = Path::new(rel);
            self.all_writes()
                .into_iter()
                .filter(|w| w.path == rel)
                .map(|w| w.data)
                .collect()
        }

        pub fn clear_writes(&self) {
            if let Ok(mut w) = self.writes.lock() {
                w.clear();
            }
        }
    }

    /// Node handle handed out by [`MockSysfs::open`].
    pub struct MockNode {
        path: PathBuf,
        contents: String,
        fail_writes: bool,
        writes: Arc<Mutex<Vec<RecordedWrite>>>,
    }

    impl SysfsNode for MockNode {
        fn path(&self) -> &Path {
            &self.path
        }

        fn write_value(&mut self, value: &str) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "mock: write failure injected",
                ));
            }
            let data = format!("{value}\n");
            self.writes
                .lock()
                .map_err(|_| io::Error::other("mock: write log poisoned"))?
                .push(RecordedWrite {
                    path: self.path.clone(),
                    data,
                });
            Ok(())
        }

        fn read_value(&mut self) -> io::Result<String> {
            Ok(self.contents.lines().next().unwrap_or("").to_string())
        }
    }

    impl SysfsView for MockSysfs {
        type Node = MockNode;

        fn exists(&self, rel: &Path) -> bool {
            self.dirs.contains_key(rel) || self.nodes.contains_key(rel)
        }

        fn list_dir(&self, rel: &Path) -> io::Result<Vec<PathBuf>> {
            if self.failing_dirs.contains(rel) {
                return Err(io::Error::other("mock: enumeration failure injected"));
            }
            match self.dirs.get(rel) {
                Some(entries) => Ok(entries.iter().map(|e| rel.join(e)).collect()),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "mock: no such directory")),
            }
        }

        fn open(&self, rel: &Path, _access: Access) -> Option<Self::Node> {
            let contents = self.nodes.get(rel)?;
            Some(MockNode {
                path: rel.to_path_buf(),
                contents: contents.clone(),
                fail_writes: self.failing_writes.contains(rel),
                writes: Arc::clone(&self.writes),
            })
        }
    }
}
