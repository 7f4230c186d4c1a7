use std::fmt;
use std::io::Read;

use tracing::debug;

use crate::error::Error;

/// HTTP method used by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    PUT,
    HEAD,
    DELETE,
    /// WebDAV collection creation (RFC 4918 §9.3).
    MKCOL,
}

impl Method {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::HEAD => "HEAD",
            Method::DELETE => "DELETE",
            Method::MKCOL => "MKCOL",
        }
    }

    /// Whether `status` counts as success for this method.
    ///
    /// MKCOL tolerates the 3xx answers some servers give for a collection
    /// that is already mapped, up to 301.
    pub fn is_success(&self, status: u16) -> bool {
        match self {
            Method::MKCOL => (200..=301).contains(&status),
            _ => (200..300).contains(&status),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<Method> for http::Method {
    type Error = Error;

    fn try_from(method: Method) -> Result<Self, Self::Error> {
        match method {
            Method::GET => Ok(http::Method::GET),
            Method::PUT => Ok(http::Method::PUT),
            Method::HEAD => Ok(http::Method::HEAD),
            Method::DELETE => Ok(http::Method::DELETE),
            Method::MKCOL => {
                http::Method::from_bytes(b"MKCOL").map_err(|_| Error::InvalidMethod {
                    method: method.to_string(),
                })
            }
        }
    }
}

/// A single request sent through an [`HttpExecutor`](crate::HttpExecutor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,

    /// Absolute URI.
    pub uri: String,

    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Request with no body.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// PUT carrying the whole object as its body.
    pub fn put(uri: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(Method::PUT, uri).with_body(body)
    }

    pub fn head(uri: impl Into<String>) -> Self {
        Self::new(Method::HEAD, uri)
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// Collection creation at `uri`.
    pub fn mkcol(uri: impl Into<String>) -> Self {
        Self::new(Method::MKCOL, uri)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Lazily read response body.
pub type ResponseBody = Box<dyn Read + Send>;

/// HTTP response with a streaming body.
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    pub body: ResponseBody,
}

impl HttpResponse {
    /// Response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: impl Read + Send + 'static) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();

        Self {
            status,
            status_text,
            body: Box::new(body),
        }
    }

    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the server reported the resource as missing (404)
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Drain the body and collapse the response into an [`Outcome`].
    ///
    /// Body read failures are not fatal here; the status already decided the
    /// outcome and the text is only kept for diagnostics.
    pub fn into_outcome(mut self, method: Method) -> Outcome {
        let mut raw = Vec::new();
        if let Err(error) = self.body.read_to_end(&mut raw) {
            debug!(%method, status = self.status, %error, "response body unreadable");
        }

        Outcome {
            status: self.status,
            success: method.is_success(self.status),
            status_text: self.status_text,
            body: String::from_utf8_lossy(&raw).into_owned(),
        }
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .finish_non_exhaustive()
    }
}

/// Normalized result of a round trip whose body is not needed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: u16,

    /// Status classified per method, see [`Method::is_success`].
    pub success: bool,
    pub status_text: String,
    pub body: String,
}

impl Outcome {
    /// Server response rendered for error messages.
    pub fn response(&self) -> String {
        if self.body.is_empty() {
            self.status_text.clone()
        } else {
            format!("{}: {}", self.status_text, self.body)
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.response())
    }
}
