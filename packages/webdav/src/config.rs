//! Construction-time configuration.
//!
//! Every struct here deserializes with serde so the embedding application can
//! keep storage settings in whatever format it already loads.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Full configuration of a [`WebDavStorage`](crate::WebDavStorage).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebDavConfig {
    /// Absolute base URI of the WebDAV endpoint.
    pub host: String,

    /// Sub-path under `host` that every key is resolved relative to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Instance-level upload defaults.
    #[serde(default)]
    pub upload_options: UploadOptions,

    #[serde(default)]
    pub http_options: HttpOptions,
}

impl WebDavConfig {
    /// Configuration for `host` with no prefix and default options.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            prefix: None,
            upload_options: UploadOptions::default(),
            http_options: HttpOptions::default(),
        }
    }
}

/// Options recognized by `store`.
///
/// Unset fields fall through to the layer below when merged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadOptions {
    /// Skip parent collection creation; the caller asserts the path exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_full_put_path: Option<bool>,
}

impl UploadOptions {
    /// Options with only `create_full_put_path` set.
    pub fn create_full_put_path(value: bool) -> Self {
        Self {
            create_full_put_path: Some(value),
        }
    }

    /// Shallow merge: every field set in `overrides` replaces ours.
    pub fn merged_with(&self, overrides: &UploadOptions) -> UploadOptions {
        UploadOptions {
            create_full_put_path: overrides
                .create_full_put_path
                .or(self.create_full_put_path),
        }
    }

    /// Resolved `create_full_put_path`; unset means `false`.
    pub fn skips_provisioning(&self) -> bool {
        self.create_full_put_path.unwrap_or(false)
    }
}

/// Settings applied to every request the transport issues.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Timeout>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
}

impl HttpOptions {
    /// Set the timeout applied to every request.
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send `user`/`pass` as HTTP basic credentials on every request.
    pub fn with_basic_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth {
            user: user.into(),
            pass: pass.into(),
        });
        self
    }
}

/// Request timeout, in seconds.
///
/// Either a single number bounding the whole request or one value per phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Timeout {
    Total(f64),
    Phased { connect: f64, write: f64, read: f64 },
}

impl Timeout {
    /// Bound on connection establishment, when configured separately.
    pub fn connect(&self) -> Result<Option<Duration>> {
        match self {
            Timeout::Total(_) => Ok(None),
            Timeout::Phased { connect, .. } => seconds(*connect).map(Some),
        }
    }

    /// Bound on a full request once connected.
    ///
    /// The blocking client has no distinct write deadline, so phased values
    /// are summed into one per-request budget.
    pub fn request(&self) -> Result<Duration> {
        match self {
            Timeout::Total(total) => seconds(*total),
            Timeout::Phased { write, read, .. } => {
                seconds(*write)?;
                seconds(*read)?;
                seconds(write + read)
            }
        }
    }
}

/// Negative, NaN, and overflowing values are rejected.
fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| Error::InvalidTimeout { seconds: value })
}

/// HTTP basic credentials. `Debug` hides the password.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub pass: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}
