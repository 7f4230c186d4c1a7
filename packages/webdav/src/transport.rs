use std::sync::Arc;

use tracing::debug;

use crate::config::HttpOptions;
use crate::error::Result;
use crate::executor::{HttpExecutor, ReqwestExecutor};
use crate::types::{HttpRequest, HttpResponse, Method, Outcome};

/// The five verbs the adapter needs, over a shared [`HttpExecutor`].
///
/// Every call is a single round trip. Statuses are classified, never raised;
/// only faults that produced no status come back as `Err`.
#[derive(Clone)]
pub struct Transport {
    executor: Arc<dyn HttpExecutor>,
}

impl Transport {
    /// Transport over a [`ReqwestExecutor`] configured from `options`.
    pub fn new(options: HttpOptions) -> Result<Self> {
        Ok(Self::with_executor(Arc::new(ReqwestExecutor::new(options)?)))
    }

    /// Transport over a caller-supplied executor.
    pub fn with_executor(executor: Arc<dyn HttpExecutor>) -> Self {
        Self { executor }
    }

    /// Write `payload` to `uri`. Success is any 2xx.
    pub fn put(&self, uri: &str, payload: Vec<u8>) -> Result<Outcome> {
        self.exchange(HttpRequest::put(uri, payload))
    }

    /// GET with the body left unread.
    pub fn get(&self, uri: &str) -> Result<HttpResponse> {
        self.send(HttpRequest::get(uri))
    }

    /// Probe `uri` without a body. Success is any 2xx.
    pub fn head(&self, uri: &str) -> Result<Outcome> {
        self.exchange(HttpRequest::head(uri))
    }

    /// Remove `uri`. Success is any 2xx.
    pub fn delete(&self, uri: &str) -> Result<Outcome> {
        self.exchange(HttpRequest::delete(uri))
    }

    /// Create the collection at `uri`. Success is 200 through 301.
    pub fn mkcol(&self, uri: &str) -> Result<Outcome> {
        self.exchange(HttpRequest::mkcol(uri))
    }

    fn exchange(&self, request: HttpRequest) -> Result<Outcome> {
        let method = request.method;
        Ok(self.send(request)?.into_outcome(method))
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let uri = request.uri.clone();
        let response = self.executor.execute(request)?;
        debug!(%method, %uri, status = response.status, "webdav round trip");
        Ok(response)
    }
}
