//! Typed Eco Market resources on top of `ApiExecutor`.
//!
//! Each method maps to one backend endpoint used by the admin and storefront
//! screens. Replies keep the backend's `{status, message, data}` shape inside
//! the envelope payload.

use crate::body::RequestBody;
use crate::credentials::CredentialProvider;
use crate::envelope::ApiResponse;
use crate::executor::{ApiExecutor, Authorized};
use crate::transport::Transport;
use crate::types::{NewOrder, Order, Product, ProductForm, ServerReply, User, UserForm};

pub type Reply<T> = ApiResponse<ServerReply<T>>;

/// Record counts for the admin dashboard. A count is `None` when its fetch
/// failed, so a failure is never shown as zero records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardCounts {
    pub users: Option<usize>,
    pub products: Option<usize>,
    pub orders: Option<usize>,
}

pub struct EcoMarketApi<T, P> {
    executor: ApiExecutor<T>,
    credentials: P,
}

impl<T: Transport, P: CredentialProvider> EcoMarketApi<T, P> {
    pub fn new(executor: ApiExecutor<T>, credentials: P) -> Self {
        Self {
            executor,
            credentials,
        }
    }

    pub fn executor(&self) -> &ApiExecutor<T> {
        &self.executor
    }

    pub fn credentials(&self) -> &P {
        &self.credentials
    }

    pub fn list_products(&self, search: &str) -> Reply<Vec<Product>> {
        self.authorized().read(&with_search("/product", search))
    }

    pub fn create_product(&self, form: &ProductForm) -> Reply<Product> {
        let body = RequestBody::Multipart(form.to_multipart());
        self.authorized().create("/product/create", &body)
    }

    pub fn update_product(&self, id: u64, form: &ProductForm) -> Reply<Product> {
        let body = RequestBody::Multipart(form.to_multipart());
        self.authorized().replace(&format!("/product/{id}"), &body)
    }

    pub fn delete_product(&self, id: u64) -> Reply<serde_json::Value> {
        self.authorized().remove(&format!("/product/{id}"))
    }

    pub fn list_users(&self, search: &str) -> Reply<Vec<User>> {
        self.authorized().read(&with_search("/user", search))
    }

    pub fn create_user(&self, form: &UserForm) -> Reply<User> {
        let body = RequestBody::Multipart(form.to_multipart());
        self.authorized().create("/user/create", &body)
    }

    pub fn update_user(&self, id: u64, form: &UserForm) -> Reply<User> {
        let body = RequestBody::Multipart(form.to_multipart());
        self.authorized().replace(&format!("/user/{id}"), &body)
    }

    pub fn delete_user(&self, id: u64) -> Reply<serde_json::Value> {
        self.authorized().remove(&format!("/user/{id}"))
    }

    pub fn list_orders(&self) -> Reply<Vec<Order>> {
        self.authorized().read("/order")
    }

    pub fn create_order(&self, order: &NewOrder) -> Reply<Order> {
        match RequestBody::json(order) {
            Ok(body) => self.authorized().create("/order/create", &body),
            Err(err) => err.into(),
        }
    }

    /// Product ids the current user has liked.
    pub fn list_favorites(&self) -> Reply<Vec<u64>> {
        self.authorized().read("/favorite")
    }

    pub fn toggle_favorite(&self, product_id: u64) -> Reply<serde_json::Value> {
        self.authorized()
            .create(&format!("/favorite/{product_id}"), &RequestBody::empty())
    }

    pub fn dashboard_counts(&self) -> DashboardCounts {
        DashboardCounts {
            users: count(self.list_users("")),
            products: count(self.list_products("")),
            orders: count(self.list_orders()),
        }
    }

    fn authorized(&self) -> Authorized<'_, T, P> {
        self.executor.with_credentials(&self.credentials)
    }
}

fn with_search(path: &str, search: &str) -> String {
    let search = search.trim();
    if search.is_empty() {
        return path.to_string();
    }
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("search", search)
        .finish();
    format!("{path}?{query}")
}

fn count<T>(reply: Reply<Vec<T>>) -> Option<usize> {
    let reply = reply.into_result().ok()?;
    if !reply.status {
        return None;
    }
    reply.data.map(|items| items.len())
}
