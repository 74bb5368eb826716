//! Database - named, versioned roots with snapshot connections.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::connection::Connection;
use super::error::StoreError;
use crate::model::Root;

/// A value tagged with the commit count that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

type Roots = HashMap<String, Versioned<Root>>;

struct Inner {
    roots: RwLock<Roots>,
    path: Option<PathBuf>,
    open: AtomicUsize,
}

/// Object database holding one `Root` per base name.
///
/// Connections work on a private copy of a root taken at open time.
/// Committing replaces the stored root only if nobody else committed to
/// it in the meantime; otherwise the commit fails with
/// `StoreError::Conflict` and the caller may retry with a fresh
/// connection. File-backed databases rewrite their image on every commit.
///
/// Clone-friendly via Arc.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

impl Database {
    pub fn in_memory() -> Self {
        Self::with_roots(Roots::new(), None)
    }

    /// Open (or create on first commit) a database image at `path`.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let roots = if path.exists() {
            let bytes = fs::read(&path)?;
            bitcode::deserialize::<Roots>(&bytes)?
        } else {
            Roots::new()
        };
        tracing::debug!(path = %path.display(), roots = roots.len(), "opened database image");
        Ok(Self::with_roots(roots, Some(path)))
    }

    /// Open a database from `memory://` or `file://<path>`.
    pub fn from_uri(uri: &str) -> Result<Self, StoreError> {
        if uri == "memory://" {
            return Ok(Self::in_memory());
        }
        match uri.strip_prefix("file://") {
            Some(path) if !path.is_empty() => Self::open_file(path),
            _ => Err(StoreError::UnsupportedUri(uri.to_string())),
        }
    }

    fn with_roots(roots: Roots, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                roots: RwLock::new(roots),
                path,
                open: AtomicUsize::new(0),
            }),
        }
    }

    /// Create the root named `base` with `init` unless it already exists.
    ///
    /// Returns whether a root was created. Run once at startup, before
    /// serving requests.
    pub fn bootstrap<F>(&self, base: &str, init: F) -> Result<bool, StoreError>
    where
        F: FnOnce() -> Root,
    {
        let mut roots = self
            .inner
            .roots
            .write()
            .map_err(|_| StoreError::LockPoisoned("bootstrap"))?;
        if roots.contains_key(base) {
            return Ok(false);
        }
        roots.insert(
            base.to_string(),
            Versioned {
                data: init(),
                version: 1,
            },
        );
        if let Err(err) = self.persist(&roots) {
            roots.remove(base);
            return Err(err);
        }
        tracing::info!(base, "bootstrapped root");
        Ok(true)
    }

    /// Replace the root named `base` outright, discarding its history.
    pub fn reset(&self, base: &str, root: Root) -> Result<(), StoreError> {
        let mut roots = self
            .inner
            .roots
            .write()
            .map_err(|_| StoreError::LockPoisoned("reset"))?;
        let version = roots.get(base).map(|r| r.version + 1).unwrap_or(1);
        let previous = roots.insert(
            base.to_string(),
            Versioned {
                data: root,
                version,
            },
        );
        if let Err(err) = self.persist(&roots) {
            match previous {
                Some(previous) => roots.insert(base.to_string(), previous),
                None => roots.remove(base),
            };
            return Err(err);
        }
        tracing::info!(base, version, "reset root");
        Ok(())
    }

    /// Names of all bootstrapped roots, sorted.
    pub fn bases(&self) -> Result<Vec<String>, StoreError> {
        let roots = self
            .inner
            .roots
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        let mut bases: Vec<String> = roots.keys().cloned().collect();
        bases.sort();
        Ok(bases)
    }

    pub fn version(&self, base: &str) -> Result<u64, StoreError> {
        let roots = self
            .inner
            .roots
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        roots
            .get(base)
            .map(|r| r.version)
            .ok_or_else(|| StoreError::MissingRoot(base.to_string()))
    }

    /// Open a connection on a snapshot of the root named `base`.
    ///
    /// The connection is closed when dropped, committed or aborted.
    pub fn connect(&self, base: &str) -> Result<Connection, StoreError> {
        let snapshot = {
            let roots = self
                .inner
                .roots
                .read()
                .map_err(|_| StoreError::LockPoisoned("connect"))?;
            roots
                .get(base)
                .cloned()
                .ok_or_else(|| StoreError::MissingRoot(base.to_string()))?
        };
        self.inner.open.fetch_add(1, Ordering::SeqCst);
        Ok(Connection::new(self.clone(), base, snapshot))
    }

    /// Number of connections not yet closed.
    pub fn open_connections(&self) -> usize {
        self.inner.open.load(Ordering::SeqCst)
    }

    pub(crate) fn release(&self) {
        self.inner.open.fetch_sub(1, Ordering::SeqCst);
    }

    /// Run `f` against a fresh connection and commit its changes.
    ///
    /// If the commit conflicts, `f` runs again on a new snapshot, up to
    /// `attempts` times in total. An error from `f` aborts the
    /// transaction without retrying.
    pub fn transact<T, E, F>(&self, base: &str, attempts: usize, mut f: F) -> Result<T, E>
    where
        F: FnMut(&mut Root) -> Result<T, E>,
        E: From<StoreError>,
    {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            let mut conn = self.connect(base)?;
            let value = f(conn.root_mut())?;
            match conn.commit() {
                Ok(_) => return Ok(value),
                Err(StoreError::Conflict { .. }) if attempt < attempts => {
                    tracing::warn!(base, attempt, "commit conflict, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub(crate) fn commit_root(
        &self,
        base: &str,
        expected: u64,
        root: Root,
    ) -> Result<u64, StoreError> {
        let mut roots = self
            .inner
            .roots
            .write()
            .map_err(|_| StoreError::LockPoisoned("commit"))?;
        let actual = roots
            .get(base)
            .map(|r| r.version)
            .ok_or_else(|| StoreError::MissingRoot(base.to_string()))?;
        if actual != expected {
            tracing::debug!(base, expected, actual, "commit conflict");
            return Err(StoreError::Conflict {
                base: base.to_string(),
                expected,
                actual,
            });
        }

        let version = actual + 1;
        let previous = roots.insert(
            base.to_string(),
            Versioned {
                data: root,
                version,
            },
        );
        if let Err(err) = self.persist(&roots) {
            if let Some(previous) = previous {
                roots.insert(base.to_string(), previous);
            }
            return Err(err);
        }
        tracing::debug!(base, version, "committed");
        Ok(version)
    }

    fn persist(&self, roots: &Roots) -> Result<(), StoreError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let bytes = bitcode::serialize(roots)?;
        write_atomically(path, &bytes)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
