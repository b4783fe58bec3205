//! The network seam: something that turns an `HttpRequest` into an
//! `HttpResponse`.
//!
//! `UreqTransport` is the blocking production implementation. Tests plug in
//! scripted transports instead.

use std::io;
use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes one HTTP round-trip.
///
/// Implementations must return every status code as an `HttpResponse`;
/// `Err` is reserved for failures where no response arrived.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// `ureq`-backed transport with a per-attempt timeout.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    timeout: Duration,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl UreqTransport {
    /// Status-code-as-error is disabled so 4xx/5xx come back as data.
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(url), &request.headers);
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(url), &request.headers);
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let bytes = response.body_mut().read_to_vec().map_err(map_ureq_error)?;
        let body = decode_body(bytes)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// The server answered, so a body that is not text is a decode failure.
fn decode_body(bytes: Vec<u8>) -> Result<String, TransportError> {
    String::from_utf8(bytes).map_err(|e| TransportError::InvalidBody(e.to_string()))
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(io_err) => map_io_error(&io_err),
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => {
            TransportError::InvalidRequest(err.to_string())
        }
        other => TransportError::Failed(other.to_string()),
    }
}

pub(crate) fn map_io_error(err: &io::Error) -> TransportError {
    match err.kind() {
        io::ErrorKind::ConnectionReset => TransportError::ConnectionReset,
        io::ErrorKind::TimedOut => TransportError::Timeout,
        _ => TransportError::Failed(err.to_string()),
    }
}
