//! Parent collection provisioning.
//!
//! WebDAV refuses a PUT (and a MKCOL) whose parent collection is missing, so
//! every ancestor of a key is created first, shallowest first. MKCOL is sent
//! unconditionally: an answer meaning "already exists" counts as done, which
//! saves a PROPFIND/HEAD round trip per level.

use std::sync::Once;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::path;
use crate::transport::Transport;

/// `405 Method Not Allowed`: MKCOL on an already mapped URL (RFC 4918 §9.3.1).
const ALREADY_EXISTS: u16 = 405;

/// Creates the collection chain a write needs, remembering the prefix chain.
pub struct DirectoryProvisioner {
    transport: Transport,
    host: String,
    prefix: Option<String>,
    prefix_root: Once,
}

impl DirectoryProvisioner {
    /// Provisioner for keys under `host[/prefix]`.
    ///
    /// Nothing is sent until [`ensure_prefix_root`](Self::ensure_prefix_root)
    /// or [`ensure_path`](Self::ensure_path) is called.
    pub fn new(transport: Transport, host: impl Into<String>, prefix: Option<String>) -> Self {
        Self {
            transport,
            host: host.into(),
            prefix,
            prefix_root: Once::new(),
        }
    }

    /// Create the collections of the configured prefix under the bare host.
    ///
    /// Runs at most once per provisioner whatever the result. Concurrent first
    /// callers wait for the one doing the work; only that caller sees its
    /// error.
    pub fn ensure_prefix_root(&self) -> Result<()> {
        let mut result = Ok(());
        self.prefix_root.call_once(|| {
            result = self.create_prefix_root();
        });
        result
    }

    /// Whether the prefix chain has been attempted, successfully or not.
    pub fn is_prefix_provisioned(&self) -> bool {
        self.prefix_root.is_completed()
    }

    fn create_prefix_root(&self) -> Result<()> {
        let Some(prefix) = self.prefix.as_deref() else {
            return Ok(());
        };

        let dirs = path::directory_chain(prefix);
        if dirs.is_empty() {
            return Ok(());
        }

        info!(host = %self.host, prefix, "provisioning storage prefix");
        self.create_all(&self.host, &dirs)
    }

    /// Create every ancestor collection of `key` under `base_with_prefix`.
    ///
    /// Stops at the first level the server rejects with
    /// [`Error::Provisioning`].
    pub fn ensure_path(&self, base_with_prefix: &str, key: &str) -> Result<()> {
        self.create_all(base_with_prefix, &path::ancestor_segments(key))
    }

    fn create_all(&self, base: &str, dirs: &[String]) -> Result<()> {
        for dir in dirs {
            self.create_collection(&path::join(base, dir))?;
        }
        Ok(())
    }

    fn create_collection(&self, uri: &str) -> Result<()> {
        let outcome = self.transport.mkcol(uri)?;

        if outcome.success || outcome.status == ALREADY_EXISTS {
            debug!(uri, status = outcome.status, "collection ready");
            return Ok(());
        }

        warn!(uri, %outcome, "collection creation rejected");
        Err(Error::Provisioning {
            uri: uri.to_string(),
            status: outcome.status,
            response: outcome.response(),
        })
    }
}
