//! Authenticated API access layer for the Eco Market backend.
//!
//! # Overview
//! Every UI action that touches the backend goes through one of four
//! operations (`read`, `create`, `replace`, `remove`) on `ApiExecutor`. Each
//! returns an `ApiResponse` envelope and never an error: transport failures,
//! server rejections and a missing bearer token all become
//! `success == false` with a human-readable message.
//!
//! # Design
//! - `ApiClient` is stateless. It builds `HttpRequest` values and parses
//!   `HttpResponse` values as plain data (host-does-IO).
//! - `Transport` is the only I/O seam; `UreqTransport` is the production
//!   implementation and tests script their own.
//! - Tokens are passed per call or pulled from a `CredentialProvider` per
//!   call; nothing is cached.
//! - Only reads retry, with linear backoff (`RetryPolicy`).
//! - `EcoMarketApi` layers typed product/user/order/favorite endpoints on top.

pub mod body;
pub mod catalog;
pub mod classify;
pub mod client;
pub mod config;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod http;
pub mod retry;
pub mod transport;
pub mod types;

pub use body::{FilePart, MultipartForm, RequestBody};
pub use catalog::{DashboardCounts, EcoMarketApi, Reply};
pub use client::{ApiClient, Parsed};
pub use config::ApiConfig;
pub use credentials::{CookieJar, CredentialProvider, NoCredentials, StaticToken, TOKEN_COOKIE};
pub use envelope::ApiResponse;
pub use error::{ApiError, ConfigError, TransportError};
pub use executor::{ApiExecutor, Authorized};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use retry::{RetryMode, RetryPolicy};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Category, NewOrder, Order, OrderLine, OrderStatus, PaymentMethod, Product, ProductForm, Role,
    ServerReply, User, UserForm,
};
