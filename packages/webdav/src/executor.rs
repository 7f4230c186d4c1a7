//! HTTP execution abstraction.
//!
//! The adapter never talks to reqwest directly; it goes through
//! [`HttpExecutor`] so tests can record traffic without a server.

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::config::HttpOptions;
use crate::error::{Error, Result};
use crate::types::{HttpRequest, HttpResponse};

/// Trait for executing HTTP requests.
///
/// One call is one blocking round trip. Implementations must not retry.
/// An `Ok` response is returned for every HTTP status; `Err` is reserved for
/// requests that never produced one.
pub trait HttpExecutor: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production HTTP executor using reqwest.
pub struct ReqwestExecutor {
    client: Client,
    options: HttpOptions,
}

impl ReqwestExecutor {
    /// Build a client from `options`.
    ///
    /// Redirects are never followed: a 3xx must reach the status checks
    /// unchanged (MKCOL counts 301 as done, PUT counts it as a failure), and
    /// a replayed request would carry the credentials to another URI.
    ///
    /// Fails with [`Error::InvalidTimeout`] for a negative or NaN timeout.
    pub fn new(options: HttpOptions) -> Result<Self> {
        let mut builder = Client::builder().redirect(Policy::none());

        if let Some(timeout) = &options.timeout {
            builder = builder.timeout(timeout.request()?);
            if let Some(connect) = timeout.connect()? {
                builder = builder.connect_timeout(connect);
            }
        }

        let client = builder.build()?;
        Ok(Self { client, options })
    }

    /// Create a new executor with a custom reqwest client.
    ///
    /// Timeouts in `options` are ignored; the client's own apply. Basic auth
    /// is still added per request. The client must be built with
    /// `redirect(Policy::none())`, otherwise 3xx answers are replaced by
    /// whatever the redirect target returns.
    pub fn with_client(client: Client, options: HttpOptions) -> Self {
        Self { client, options }
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method: http::Method = request.method.try_into()?;
        let mut req_builder = self.client.request(method, &request.uri);

        if let Some(auth) = &self.options.basic_auth {
            req_builder = req_builder.basic_auth(&auth.user, Some(&auth.pass));
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .send()
            .map_err(|e| Error::transport(&request.uri, e))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        // The blocking response reads its body on demand.
        Ok(HttpResponse {
            status,
            status_text,
            body: Box::new(response),
        })
    }
}
