//! # webdav-store
//!
//! Object storage over a WebDAV endpoint.
//!
//! [`WebDavStorage`] implements the small [`ObjectStorage`] contract an
//! attachment layer needs (store, read, exists, delete, url) on top of plain
//! HTTP verbs plus WebDAV `MKCOL`.
//!
//! ## Directory provisioning
//!
//! WebDAV servers reject a PUT whose parent collection does not exist. Before
//! each upload the adapter creates every ancestor collection of the key,
//! shallowest first, treating "already exists" answers as success. A
//! configured prefix has its own collections created once per instance.
//!
//! ```ignore
//! use webdav_store::{ObjectStorage, UploadOptions, WebDavStorage};
//!
//! let storage = WebDavStorage::new("http://localhost/webdav")?.with_prefix("p/cache");
//!
//! // MKCOL .../p, .../p/cache, .../p/cache/dir, then PUT .../p/cache/dir/file.pdf
//! storage.store("dir/file.pdf", &mut file, &UploadOptions::default())?;
//!
//! // Caller guarantees the collections exist: PUT only
//! storage.store("dir/other.pdf", &mut file, &UploadOptions::create_full_put_path(true))?;
//! ```
//!
//! ## Logging
//!
//! Round trips and provisioning steps are emitted through `tracing`; the
//! embedding application installs the subscriber.

pub mod config;
pub mod error;
pub mod executor;
pub mod path;
pub mod provision;
pub mod transport;
pub mod types;

mod storage;

pub use config::{BasicAuth, HttpOptions, Timeout, UploadOptions, WebDavConfig};
pub use error::{Error, Result};
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use provision::DirectoryProvisioner;
pub use transport::Transport;
pub use types::{HttpRequest, HttpResponse, Method, Outcome};

pub use crate::storage::{ObjectReader, ObjectStorage, WebDavStorage};
