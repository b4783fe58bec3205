//! Where bearer tokens come from.
//!
//! The executor never stores a token. Callers either pass one per call or
//! hand over a `CredentialProvider` that is asked again on every call.

use std::collections::HashMap;
use std::sync::RwLock;

pub const TOKEN_COOKIE: &str = "token";

/// Supplies the current bearer token, if any.
pub trait CredentialProvider {
    fn bearer_token(&self) -> Option<String>;
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<String>,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}

/// A fixed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// No credentials at all; every call fails with `NoToken`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// In-memory cookie store. A login flow writes the `token` cookie; API
/// calls read it.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<HashMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .ok()
            .and_then(|cookies| cookies.get(name).cloned())
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.insert(name.into(), value.into());
        }
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.cookies
            .write()
            .ok()
            .and_then(|mut cookies| cookies.remove(name))
    }
}

impl CredentialProvider for CookieJar {
    fn bearer_token(&self) -> Option<String> {
        self.get(TOKEN_COOKIE).filter(|token| !token.is_empty())
    }
}
