//! Resource resolution with a fixed fallback chain.
//!
//! A path is looked up, first success wins, as:
//! 1. a filesystem file (only for `./`, `../`, `/` or drive-letter paths),
//! 2. a bundled resource by exact name,
//! 3. a bundled resource with `config/` prepended (if absent),
//! 4. a bundled resource with `config/` stripped (if present).
//!
//! Bundled resources are blobs embedded in the binary plus any resource root
//! directories the resolver was given. Failed fallback steps are expected and
//! only logged at debug level.

use crate::paths::{absolute_normalized, display_path, is_filesystem_reference};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_PREFIX: &str = "config/";

/// Defaults embedded at build time.
pub mod embedded {
    pub const APPLICATION_YML: &str = include_str!("../config/application.yml");
}

/// Where a resolved resource came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOrigin {
    /// A file on disk, resolved from a filesystem-style path.
    File(PathBuf),
    /// A blob embedded in the process.
    Bundled(String),
    /// A file found under a resource root directory.
    Root { root: PathBuf, name: String },
}

impl fmt::Display for ResourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceOrigin::File(path) => write!(f, "{}", display_path(path)),
            ResourceOrigin::Bundled(name) => write!(f, "bundled:{}", name),
            ResourceOrigin::Root { root, name } => {
                write!(f, "{}", display_path(&root.join(name)))
            }
        }
    }
}

/// An open, readable resource. The underlying handle closes on drop.
pub struct Resource {
    origin: ResourceOrigin,
    reader: Box<dyn Read + Send>,
}

impl Resource {
    pub fn origin(&self) -> &ResourceOrigin {
        &self.origin
    }

    /// Read the whole resource as UTF-8 text.
    pub fn into_string(mut self) -> std::io::Result<String> {
        let mut content = String::new();
        self.reader.read_to_string(&mut content)?;
        Ok(content)
    }
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("origin", &self.origin).finish()
    }
}

/// Locates readable resources by path.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    working_dir: PathBuf,
    bundle: BTreeMap<String, Cow<'static, [u8]>>,
    roots: Vec<PathBuf>,
}

impl ResourceResolver {
    /// Resolver rooted at `working_dir` with no bundled resources.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            bundle: BTreeMap::new(),
            roots: Vec::new(),
        }
    }

    /// Resolver for the current process: current directory plus embedded defaults.
    pub fn for_process() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?)
            .with_resource("config/application.yml", embedded::APPLICATION_YML.as_bytes()))
    }

    /// Add a bundled resource.
    pub fn with_resource(
        mut self,
        name: impl Into<String>,
        content: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        self.bundle.insert(name.into(), content.into());
        self
    }

    /// Add a directory searched for bundled resources by relative name.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve `path` following the fallback chain.
    ///
    /// Returns `None` only after every strategy failed.
    pub fn resolve(&self, path: &str) -> Option<Resource> {
        debug!(path, "Attempting to load resource");

        if is_filesystem_reference(path)
            && let Some(resource) = self.open_path(Path::new(path))
        {
            return Some(resource);
        }

        if let Some(resource) = self.open_bundled(path) {
            debug!(path, "Loaded bundled resource");
            return Some(resource);
        }

        if let Some(stripped) = path.strip_prefix(CONFIG_PREFIX) {
            debug!(path = stripped, "Resource not found, trying without config/ prefix");
            if let Some(resource) = self.open_bundled(stripped) {
                debug!(path = stripped, "Loaded bundled resource without config/ prefix");
                return Some(resource);
            }
        } else {
            let prefixed = format!("{CONFIG_PREFIX}{path}");
            debug!(path = %prefixed, "Resource not found, trying with config/ prefix");
            if let Some(resource) = self.open_bundled(&prefixed) {
                debug!(path = %prefixed, "Loaded bundled resource with config/ prefix");
                return Some(resource);
            }
        }

        warn!(path, "Resource not found in filesystem or bundled resources");
        None
    }

    /// Open a filesystem path directly, relative paths against the working
    /// directory. Skips the bundled fallbacks.
    pub fn open_path(&self, path: &Path) -> Option<Resource> {
        let absolute = absolute_normalized(&self.working_dir, path);
        debug!(path = %absolute.display(), "Trying to load external file");

        if !absolute.is_file() {
            debug!(path = %absolute.display(), "External file not found");
            return None;
        }

        match File::open(&absolute) {
            Ok(file) => {
                info!(path = %absolute.display(), "Loading external file");
                Some(Resource {
                    origin: ResourceOrigin::File(absolute),
                    reader: Box::new(file),
                })
            }
            Err(e) => {
                debug!(path = %absolute.display(), error = %e, "Failed to open external file");
                None
            }
        }
    }

    fn open_bundled(&self, name: &str) -> Option<Resource> {
        if let Some(content) = self.bundle.get(name) {
            return Some(Resource {
                origin: ResourceOrigin::Bundled(name.to_string()),
                reader: Box::new(Cursor::new(content.clone().into_owned())),
            });
        }

        for root in &self.roots {
            let candidate = root.join(name);
            if candidate.is_file()
                && let Ok(file) = File::open(&candidate)
            {
                return Some(Resource {
                    origin: ResourceOrigin::Root {
                        root: root.clone(),
                        name: name.to_string(),
                    },
                    reader: Box::new(file),
                });
            }
        }

        None
    }
}
