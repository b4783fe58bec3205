//! Authenticated request executor.
//!
//! # Design
//! `ApiExecutor` pairs the stateless `ApiClient` with a `Transport` and a
//! read `RetryPolicy`. Its four operations never fail: every outcome,
//! including a missing token, is folded into an `ApiResponse`.
//!
//! Only `read` retries. Create, replace and remove make exactly one attempt.
//! Each attempt is bounded by the transport's timeout, so a read's worst
//! case is `max_attempts` timeouts plus the backoff sleeps between them.

use std::thread;

use serde::de::DeserializeOwned;

use crate::body::RequestBody;
use crate::classify;
use crate::client::{ApiClient, Parsed};
use crate::config::ApiConfig;
use crate::credentials::CredentialProvider;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::retry::RetryPolicy;
use crate::transport::{Transport, UreqTransport};

#[derive(Debug, Clone)]
pub struct ApiExecutor<T> {
    client: ApiClient,
    transport: T,
    retry: RetryPolicy,
}

impl ApiExecutor<UreqTransport> {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(ApiClient::new(&config.base_url), UreqTransport::new(config.timeout))
            .with_retry(config.retry)
    }
}

impl<T: Transport> ApiExecutor<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self {
            client,
            transport,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// A view that fetches the token from `provider` on every call.
    pub fn with_credentials<'a, P: CredentialProvider>(&'a self, provider: &'a P) -> Authorized<'a, T, P> {
        Authorized {
            executor: self,
            provider,
        }
    }

    /// GET with retry and linear backoff.
    pub fn read<P: DeserializeOwned>(&self, url: &str, token: &str) -> ApiResponse<P> {
        let mut attempt = 1;
        loop {
            let error = match self.attempt(|| self.client.build_read(url, token)) {
                Ok(parsed) => return success(HttpMethod::Get, url, parsed),
                Err(error) => error,
            };

            if !self.retry.should_retry(attempt, &error) {
                let error = exhausted(attempt, self.retry.max_attempts, error);
                classify::report(&error, HttpMethod::Get, url);
                return error.into();
            }

            tracing::warn!(
                url,
                attempt,
                max_attempts = self.retry.max_attempts,
                cause = %error,
                "Retry {attempt}/{} for {url}",
                self.retry.max_attempts
            );
            thread::sleep(self.retry.delay_after(attempt));
            attempt += 1;
        }
    }

    /// POST, single attempt.
    pub fn create<P: DeserializeOwned>(&self, url: &str, body: &RequestBody, token: &str) -> ApiResponse<P> {
        self.once(HttpMethod::Post, url, || self.client.build_create(url, body, token))
    }

    /// PUT, single attempt.
    pub fn replace<P: DeserializeOwned>(&self, url: &str, body: &RequestBody, token: &str) -> ApiResponse<P> {
        self.once(HttpMethod::Put, url, || self.client.build_replace(url, body, token))
    }

    /// DELETE, single attempt.
    pub fn remove<P: DeserializeOwned>(&self, url: &str, token: &str) -> ApiResponse<P> {
        self.once(HttpMethod::Delete, url, || self.client.build_remove(url, token))
    }

    fn once<P: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        build: impl FnOnce() -> Result<HttpRequest, ApiError>,
    ) -> ApiResponse<P> {
        match self.attempt(build) {
            Ok(parsed) => success(method, url, parsed),
            Err(error) => {
                classify::report(&error, method, url);
                error.into()
            }
        }
    }

    /// Build, send and parse one request. A build failure means nothing was
    /// sent.
    fn attempt<P: DeserializeOwned>(
        &self,
        build: impl FnOnce() -> Result<HttpRequest, ApiError>,
    ) -> Result<Parsed<P>, ApiError> {
        let request = build()?;
        let response = self.transport.execute(&request)?;
        self.client.parse(response)
    }
}

fn success<P>(method: HttpMethod, url: &str, parsed: Parsed<P>) -> ApiResponse<P> {
    tracing::debug!(%method, url, "request succeeded");
    ApiResponse::ok(parsed.value, parsed.message)
}

/// Transport-level failures on the last of several attempts become
/// `MaxRetriesExceeded`. A server answer or a missing token is reported as
/// itself.
fn exhausted(attempt: u32, max_attempts: u32, error: ApiError) -> ApiError {
    if max_attempts > 1 && attempt >= max_attempts && error.is_transport() {
        ApiError::MaxRetriesExceeded {
            attempts: attempt,
            last: Box::new(error),
        }
    } else {
        error
    }
}

/// Executor operations with the token sourced from a `CredentialProvider`.
pub struct Authorized<'a, T, P> {
    executor: &'a ApiExecutor<T>,
    provider: &'a P,
}

impl<T: Transport, P: CredentialProvider> Authorized<'_, T, P> {
    fn token(&self) -> String {
        self.provider.bearer_token().unwrap_or_default()
    }

    pub fn read<R: DeserializeOwned>(&self, url: &str) -> ApiResponse<R> {
        self.executor.read(url, &self.token())
    }

    pub fn create<R: DeserializeOwned>(&self, url: &str, body: &RequestBody) -> ApiResponse<R> {
        self.executor.create(url, body, &self.token())
    }

    pub fn replace<R: DeserializeOwned>(&self, url: &str, body: &RequestBody) -> ApiResponse<R> {
        self.executor.replace(url, body, &self.token())
    }

    pub fn remove<R: DeserializeOwned>(&self, url: &str) -> ApiResponse<R> {
        self.executor.remove(url, &self.token())
    }
}
