use super::database::{Database, Versioned};
use super::error::StoreError;
use crate::model::Root;

/// A private working copy of one root.
///
/// Changes stay invisible to other connections until `commit`. Dropping
/// the connection without committing discards them.
pub struct Connection {
    db: Database,
    base: String,
    version: u64,
    root: Root,
}

impl Connection {
    pub(crate) fn new(db: Database, base: &str, snapshot: Versioned<Root>) -> Self {
        Self {
            db,
            base: base.to_string(),
            version: snapshot.version,
            root: snapshot.data,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Version of the root this connection was opened on.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Root {
        &mut self.root
    }

    /// Publish the working copy and close the connection.
    ///
    /// Fails with `StoreError::Conflict` if another connection committed
    /// to the same root first; nothing is written in that case.
    pub fn commit(mut self) -> Result<u64, StoreError> {
        let root = std::mem::take(&mut self.root);
        self.db.commit_root(&self.base, self.version, root)
    }

    /// Discard the working copy and close the connection.
    pub fn abort(self) {
        tracing::trace!(base = %self.base, version = self.version, "aborted");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.db.release();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base", &self.base)
            .field("version", &self.version)
            .finish()
    }
}
