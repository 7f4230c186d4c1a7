use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::config::{HttpOptions, UploadOptions, WebDavConfig};
use crate::error::{Error, Result};
use crate::executor::HttpExecutor;
use crate::path;
use crate::provision::DirectoryProvisioner;
use crate::transport::Transport;
use crate::types::{Method, Outcome, ResponseBody};

/// Object storage contract consumed by an attachment layer.
pub trait ObjectStorage {
    type Reader: Read;

    /// Write `content` under `key`, creating parent collections as needed.
    fn store(&self, key: &str, content: &mut dyn Read, options: &UploadOptions) -> Result<()>;

    /// Open `key` for streaming. A missing object is [`Error::NotFound`].
    fn read(&self, key: &str) -> Result<Self::Reader>;

    /// Whether `key` answers a HEAD with success. Missing is `false`, not an
    /// error.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Remove `key`. The server's answer is returned, not judged.
    fn delete(&self, key: &str) -> Result<Outcome>;

    /// Address of `key`, computed without network access.
    fn url(&self, key: &str) -> String;
}

/// A store backed by a WebDAV server.
///
/// Keys map onto `host[/prefix]/key`. Parent collections are created with
/// MKCOL before each PUT, and the prefix's own collections once per instance.
///
/// # Example
///
/// ```ignore
/// use webdav_store::{HttpOptions, UploadOptions, WebDavStorage};
///
/// let storage = WebDavStorage::new("http://localhost/webdav")?
///     .with_prefix("uploads/cache")
///     .with_http_options(HttpOptions::default().with_basic_auth("user", "pass"))?;
///
/// storage.store("2024/report.pdf", &mut file, &UploadOptions::default())?;
/// let mut reader = storage.read("2024/report.pdf")?;
/// ```
pub struct WebDavStorage {
    host: String,
    prefix: Option<String>,
    prefixed_host: String,
    upload_options: UploadOptions,
    transport: Transport,
    provisioner: DirectoryProvisioner,
}

impl WebDavStorage {
    /// Create a storage for `host` with default HTTP settings.
    pub fn new(host: &str) -> Result<Self> {
        Self::from_config(WebDavConfig::new(host))
    }

    /// Create a storage from a full configuration.
    ///
    /// Fails on a host that is not an absolute URI or an invalid timeout.
    pub fn from_config(config: WebDavConfig) -> Result<Self> {
        let transport = Transport::new(config.http_options)?;
        Self::assemble(
            config.host,
            config.prefix,
            config.upload_options,
            transport,
        )
    }

    /// Create a storage that sends every request through `executor`.
    pub fn with_executor(host: &str, executor: Arc<dyn HttpExecutor>) -> Result<Self> {
        Self::assemble(
            host.to_string(),
            None,
            UploadOptions::default(),
            Transport::with_executor(executor),
        )
    }

    /// Resolve every key under `prefix`. An empty prefix means none.
    ///
    /// Resets the record of provisioned prefix collections.
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        let prefix = Some(prefix.into()).filter(|p| !p.is_empty());
        let transport = self.transport.clone();
        self.rebuild(prefix, transport)
    }

    /// Set the instance-level upload defaults that call options override.
    pub fn with_upload_options(mut self, options: UploadOptions) -> Self {
        self.upload_options = options;
        self
    }

    /// Replace the transport with one configured from `options`.
    pub fn with_http_options(self, options: HttpOptions) -> Result<Self> {
        let transport = Transport::new(options)?;
        let prefix = self.prefix.clone();
        Ok(self.rebuild(prefix, transport))
    }

    fn assemble(
        host: String,
        prefix: Option<String>,
        upload_options: UploadOptions,
        transport: Transport,
    ) -> Result<Self> {
        Url::parse(&host)?;

        let prefix = prefix.filter(|p| !p.is_empty());
        let prefixed_host = path::join_opt(&host, prefix.as_deref());
        let provisioner = DirectoryProvisioner::new(transport.clone(), &host, prefix.clone());

        Ok(Self {
            host,
            prefix,
            prefixed_host,
            upload_options,
            transport,
            provisioner,
        })
    }

    // Host was validated on the way in; only the derived parts change.
    fn rebuild(self, prefix: Option<String>, transport: Transport) -> Self {
        let prefixed_host = path::join_opt(&self.host, prefix.as_deref());
        let provisioner = DirectoryProvisioner::new(transport.clone(), &self.host, prefix.clone());

        Self {
            host: self.host,
            prefix,
            prefixed_host,
            upload_options: self.upload_options,
            transport,
            provisioner,
        }
    }

    /// Base URI as configured.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Configured prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Instance-level upload defaults.
    pub fn upload_options(&self) -> &UploadOptions {
        &self.upload_options
    }

    /// Create the prefix collections now instead of on the first `store`.
    pub fn provision_prefix(&self) -> Result<()> {
        self.provisioner.ensure_prefix_root()
    }

    /// Address of `key` under a different host and/or prefix.
    ///
    /// `None` keeps the instance value; `Some("")` drops the prefix.
    pub fn url_with(&self, key: &str, host: Option<&str>, prefix: Option<&str>) -> String {
        let host = host.unwrap_or(&self.host);
        let prefix = prefix.or(self.prefix.as_deref());
        path::resolve(host, prefix, key)
    }

    fn object_uri(&self, key: &str) -> String {
        path::join(&self.prefixed_host, key)
    }
}

impl ObjectStorage for WebDavStorage {
    type Reader = ObjectReader;

    fn store(&self, key: &str, content: &mut dyn Read, options: &UploadOptions) -> Result<()> {
        let options = self.upload_options.merged_with(options);

        if !options.skips_provisioning() {
            self.provisioner.ensure_prefix_root()?;
            self.provisioner.ensure_path(&self.prefixed_host, key)?;
        }

        let mut payload = Vec::new();
        content.read_to_end(&mut payload)?;

        let uri = self.object_uri(key);
        let outcome = self.transport.put(&uri, payload)?;
        if !outcome.success {
            warn!(%uri, %outcome, "upload rejected");
            return Err(Error::Upload {
                uri,
                status: outcome.status,
                response: outcome.response(),
            });
        }

        debug!(%uri, status = outcome.status, "stored object");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<ObjectReader> {
        let uri = self.object_uri(key);
        let response = self.transport.get(&uri)?;

        if response.is_not_found() {
            return Err(Error::NotFound { uri });
        }

        if !response.is_success() {
            let outcome = response.into_outcome(Method::GET);
            return Err(Error::UnexpectedStatus {
                method: Method::GET,
                uri,
                status: outcome.status,
                response: outcome.response(),
            });
        }

        Ok(ObjectReader {
            uri,
            body: response.body,
        })
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.transport.head(&self.object_uri(key))?.success)
    }

    fn delete(&self, key: &str) -> Result<Outcome> {
        self.transport.delete(&self.object_uri(key))
    }

    fn url(&self, key: &str) -> String {
        self.object_uri(key)
    }
}

impl fmt::Debug for WebDavStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavStorage")
            .field("host", &self.host)
            .field("prefix", &self.prefix)
            .field("upload_options", &self.upload_options)
            .finish_non_exhaustive()
    }
}

/// Forward-only stream over a stored object's bytes.
///
/// Not restartable: call `read` on the storage again to start over. I/O
/// failures mid-stream surface as `io::Error` wrapping a transport
/// [`Error`].
pub struct ObjectReader {
    uri: String,
    body: ResponseBody,
}

impl ObjectReader {
    /// URI the object is being read from.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Read for ObjectReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf).map_err(|e| {
            let kind = e.kind();
            io::Error::new(kind, Error::transport(self.uri.clone(), e))
        })
    }
}

impl fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::MockExecutor;

    const HOST: &str = "http://h/webdav";

    fn storage(executor: &MockExecutor) -> WebDavStorage {
        WebDavStorage::with_executor(HOST, Arc::new(executor.clone())).unwrap()
    }

    fn store(storage: &WebDavStorage, key: &str, options: &UploadOptions) -> Result<()> {
        storage.store(key, &mut &b"content"[..], options)
    }

    #[test]
    fn rejects_relative_host() {
        let result = WebDavStorage::with_executor("webdav", Arc::new(MockExecutor::new()));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn store_creates_directory_then_puts() {
        let executor = MockExecutor::new().with_default_status(201);
        store(&storage(&executor), "dir/file.pdf", &UploadOptions::default()).unwrap();

        assert_eq!(
            executor.recorded_lines(),
            vec!["MKCOL http://h/webdav/dir", "PUT http://h/webdav/dir/file.pdf"]
        );
        assert_eq!(
            executor.recorded_requests()[1].body,
            Some(b"content".to_vec())
        );
    }

    #[test]
    fn store_flat_key_puts_only() {
        let executor = MockExecutor::new().with_default_status(201);
        store(&storage(&executor), "file.pdf", &UploadOptions::default()).unwrap();

        assert_eq!(executor.recorded_lines(), vec!["PUT http://h/webdav/file.pdf"]);
    }

    #[test]
    fn store_with_prefix_provisions_prefix_once() {
        let executor = MockExecutor::new().with_default_status(201);
        let storage = storage(&executor).with_prefix("p/cache");

        store(&storage, "dir/file.pdf", &UploadOptions::default()).unwrap();
        assert_eq!(
            executor.recorded_lines(),
            vec![
                "MKCOL http://h/webdav/p",
                "MKCOL http://h/webdav/p/cache",
                "MKCOL http://h/webdav/p/cache/dir",
                "PUT http://h/webdav/p/cache/dir/file.pdf",
            ]
        );

        executor.clear_recorded();
        store(&storage, "other/file.pdf", &UploadOptions::default()).unwrap();
        assert_eq!(
            executor.recorded_lines(),
            vec![
                "MKCOL http://h/webdav/p/cache/other",
                "PUT http://h/webdav/p/cache/other/file.pdf",
            ]
        );
    }

    #[test]
    fn eager_prefix_provisioning_is_not_repeated_by_store() {
        let executor = MockExecutor::new().with_default_status(201);
        let storage = storage(&executor).with_prefix("p/cache");

        storage.provision_prefix().unwrap();
        assert_eq!(executor.count(Method::MKCOL), 2);

        store(&storage, "file.pdf", &UploadOptions::default()).unwrap();
        assert_eq!(executor.count(Method::MKCOL), 2);
        assert_eq!(executor.count(Method::PUT), 1);
    }

    #[test]
    fn instance_level_full_put_path_skips_provisioning() {
        let executor = MockExecutor::new().with_default_status(201);
        let storage = storage(&executor)
            .with_prefix("p/cache")
            .with_upload_options(UploadOptions::create_full_put_path(true));

        store(&storage, "dir/file.pdf", &UploadOptions::default()).unwrap();
        assert_eq!(
            executor.recorded_lines(),
            vec!["PUT http://h/webdav/p/cache/dir/file.pdf"]
        );
    }

    #[test]
    fn call_level_full_put_path_skips_provisioning() {
        let executor = MockExecutor::new().with_default_status(201);
        let storage = storage(&executor).with_prefix("p/cache");

        store(&storage, "dir/file.pdf", &UploadOptions::create_full_put_path(true)).unwrap();
        assert_eq!(executor.count(Method::MKCOL), 0);
        assert_eq!(executor.count(Method::PUT), 1);
    }

    #[test]
    fn call_level_false_overrides_instance_true() {
        let executor = MockExecutor::new().with_default_status(201);
        let storage = storage(&executor)
            .with_upload_options(UploadOptions::create_full_put_path(true));

        store(&storage, "dir/file.pdf", &UploadOptions::create_full_put_path(false)).unwrap();
        assert_eq!(executor.count(Method::MKCOL), 1);
    }

    #[test]
    fn rejected_put_is_upload_error() {
        let executor = MockExecutor::new()
            .with_response(Method::MKCOL, "http://h/webdav/dir", 201)
            .with_body(Method::PUT, "http://h/webdav/dir/file.pdf", 507, "disk full");

        let err = store(&storage(&executor), "dir/file.pdf", &UploadOptions::default())
            .unwrap_err();
        match err {
            Error::Upload {
                uri,
                status,
                response,
            } => {
                assert_eq!(uri, "http://h/webdav/dir/file.pdf");
                assert_eq!(status, 507);
                assert!(response.contains("disk full"));
            }
            other => panic!("expected upload error, got {:?}", other),
        }
    }

    #[test]
    fn failed_provisioning_skips_put() {
        let executor = MockExecutor::new().with_response(Method::MKCOL, "http://h/webdav/dir", 409);

        let err = store(&storage(&executor), "dir/file.pdf", &UploadOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Provisioning { status: 409, .. }));
        assert_eq!(executor.count(Method::PUT), 0);
    }

    #[test]
    fn read_streams_body() {
        let executor = MockExecutor::new().with_body(
            Method::GET,
            "http://h/webdav/dir/file.pdf",
            200,
            "test_content",
        );

        let mut reader = storage(&executor).read("dir/file.pdf").unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();

        assert_eq!(content, "test_content");
        assert_eq!(reader.uri(), "http://h/webdav/dir/file.pdf");
    }

    #[test]
    fn read_missing_is_not_found() {
        let executor = MockExecutor::new();
        let err = storage(&executor).read("dir/wrong_name").unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn read_server_error_is_unexpected_status() {
        let executor = MockExecutor::new().with_default_status(500);
        let err = storage(&executor).read("file.pdf").unwrap_err();

        assert!(matches!(
            err,
            Error::UnexpectedStatus {
                method: Method::GET,
                status: 500,
                ..
            }
        ));
    }

    #[test]
    fn read_transport_fault_propagates() {
        let executor = MockExecutor::new().fail_with("timed out");
        let err = storage(&executor).read("file.pdf").unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
    }

    #[test]
    fn exists_maps_status_to_bool() {
        let executor = MockExecutor::new().with_response(Method::HEAD, "http://h/webdav/a.pdf", 200);
        let storage = storage(&executor);

        assert!(storage.exists("a.pdf").unwrap());
        assert!(!storage.exists("missing.pdf").unwrap());
    }

    #[test]
    fn exists_propagates_transport_fault() {
        let executor = MockExecutor::new().fail_with("unreachable");
        assert!(storage(&executor).exists("a.pdf").is_err());
    }

    #[test]
    fn delete_returns_raw_outcome() {
        let executor =
            MockExecutor::new().with_response(Method::DELETE, "http://h/webdav/dir/a.pdf", 204);
        let storage = storage(&executor);

        let deleted = storage.delete("dir/a.pdf").unwrap();
        assert_eq!(deleted.status, 204);
        assert!(deleted.success);

        let missing = storage.delete("dir/wrong_name").unwrap();
        assert_eq!(missing.status, 404);
        assert!(!missing.success);
    }

    #[test]
    fn url_is_computed_locally() {
        let executor = MockExecutor::new();
        let storage = storage(&executor).with_prefix("p/cache");

        assert_eq!(storage.url("dir/file.pdf"), "http://h/webdav/p/cache/dir/file.pdf");
        assert_eq!(
            storage.url_with("dir/file.pdf", Some("https://cdn.example.com"), None),
            "https://cdn.example.com/p/cache/dir/file.pdf"
        );
        assert_eq!(
            storage.url_with("dir/file.pdf", None, Some("public")),
            "http://h/webdav/public/dir/file.pdf"
        );
        assert_eq!(
            storage.url_with("dir/file.pdf", Some("https://cdn.example.com/"), Some("")),
            "https://cdn.example.com/dir/file.pdf"
        );
        assert!(executor.recorded_requests().is_empty());
    }

    #[test]
    fn empty_prefix_is_no_prefix() {
        let storage = storage(&MockExecutor::new()).with_prefix("");
        assert_eq!(storage.prefix(), None);
        assert_eq!(storage.url("a.pdf"), "http://h/webdav/a.pdf");
    }
}
