use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "validtoken";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub uuid: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub picture: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "profile_picture")]
    pub profile_picture: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: u32,
    pub note: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    pub payment_method: String,
    pub status: String,
    pub orderlists: Vec<OrderLine>,
}

#[derive(Deserialize)]
pub struct NewOrder {
    pub customer: String,
    pub payment_method: String,
    #[serde(default = "new_status")]
    pub status: String,
    pub orderlists: Vec<OrderLine>,
}

fn new_status() -> String {
    "NEW".to_string()
}

/// The backend's reply wrapper.
#[derive(Serialize, Deserialize, Debug)]
pub struct Reply<T> {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    products: BTreeMap<u64, Product>,
    users: BTreeMap<u64, User>,
    orders: BTreeMap<u64, Order>,
    favorites: Vec<u64>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    db: Db,
}

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/product", get(list_products))
        .route("/product/create", post(create_product))
        .route("/product/{id}", put(update_product).delete(delete_product))
        .route("/user", get(list_users))
        .route("/user/create", post(create_user))
        .route("/user/{id}", put(update_user).delete(delete_user))
        .route("/order", get(list_orders))
        .route("/order/create", post(create_order))
        .route("/favorite", get(list_favorites))
        .route("/favorite/{id}", post(toggle_favorite))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

fn reply<T: Serialize>(status: StatusCode, message: Option<&str>, data: Option<T>) -> Response {
    let body = Reply {
        status: status.is_success(),
        message: message.map(str::to_string),
        data,
    };
    (status, Json(body)).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    reply::<()>(status, Some(message), None)
}

async fn require_bearer(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match presented {
        Some(token) if token == &*state.token => next.run(request).await,
        _ => fail(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

#[derive(Deserialize)]
pub struct Search {
    #[serde(default)]
    search: String,
}

fn matches(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Text fields plus the file name of any uploaded `picture`.
#[derive(Default)]
struct FormFields {
    text: BTreeMap<String, String>,
    picture: Option<String>,
}

impl FormFields {
    fn get(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }
}

async fn read_form(mut multipart: Multipart) -> Result<FormFields, Response> {
    let bad = |e: axum::extract::multipart::MultipartError| {
        fail(StatusCode::BAD_REQUEST, &format!("Invalid form data: {e}"))
    };
    let mut fields = FormFields::default();
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        if let Some(file_name) = file_name {
            field.bytes().await.map_err(bad)?;
            if name == "picture" {
                fields.picture = Some(file_name);
            }
        } else {
            let value = field.text().await.map_err(bad)?;
            fields.text.insert(name, value);
        }
    }
    Ok(fields)
}

fn now() -> String {
    "2024-01-01T00:00:00.000Z".to_string()
}

const CATEGORIES: [&str; 3] = ["FOOD", "DRINK", "ITEMS"];
const ROLES: [&str; 2] = ["ADMIN", "USER"];

// --- products ---

async fn list_products(State(state): State<AppState>, Query(q): Query<Search>) -> Response {
    let db = state.db.read().await;
    let products: Vec<Product> = db
        .products
        .values()
        .filter(|p| matches(&p.name, &q.search))
        .cloned()
        .collect();
    reply(StatusCode::OK, None, Some(products))
}

async fn create_product(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let (Some(name), Some(price), Some(category)) =
        (form.get("name"), form.get("price"), form.get("category"))
    else {
        return fail(StatusCode::BAD_REQUEST, "name, price and category are required");
    };
    let Ok(price) = price.parse::<f64>() else {
        return fail(StatusCode::BAD_REQUEST, "price must be a number");
    };
    if !CATEGORIES.contains(&category) {
        return fail(StatusCode::BAD_REQUEST, "category must be FOOD, DRINK or ITEMS");
    }

    let mut db = state.db.write().await;
    let product = Product {
        id: db.next_id(),
        uuid: Uuid::new_v4(),
        name: name.to_string(),
        price,
        description: form.get("description").unwrap_or_default().to_string(),
        category: category.to_string(),
        picture: form.picture.clone().unwrap_or_default(),
        created_at: now(),
        updated_at: now(),
    };
    db.products.insert(product.id, product.clone());
    reply(StatusCode::CREATED, Some("New product has been created"), Some(product))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    multipart: Multipart,
) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let price = match form.get("price").map(str::parse::<f64>) {
        Some(Ok(price)) => Some(price),
        Some(Err(_)) => return fail(StatusCode::BAD_REQUEST, "price must be a number"),
        None => None,
    };
    let category = form.get("category");
    if category.is_some_and(|c| !CATEGORIES.contains(&c)) {
        return fail(StatusCode::BAD_REQUEST, "category must be FOOD, DRINK or ITEMS");
    }

    let mut db = state.db.write().await;
    let Some(product) = db.products.get_mut(&id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    if let Some(name) = form.get("name") {
        product.name = name.to_string();
    }
    if let Some(price) = price {
        product.price = price;
    }
    if let Some(description) = form.get("description") {
        product.description = description.to_string();
    }
    if let Some(category) = category {
        product.category = category.to_string();
    }
    if let Some(picture) = form.picture.clone() {
        product.picture = picture;
    }
    product.updated_at = now();
    let product = product.clone();
    reply(StatusCode::OK, Some("Product has been updated"), Some(product))
}

async fn delete_product(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut db = state.db.write().await;
    match db.products.remove(&id) {
        Some(product) => {
            db.favorites.retain(|fav| *fav != id);
            reply(StatusCode::OK, Some("Product has been deleted"), Some(product))
        }
        None => fail(StatusCode::NOT_FOUND, "Product not found"),
    }
}

// --- users ---

async fn list_users(State(state): State<AppState>, Query(q): Query<Search>) -> Response {
    let db = state.db.read().await;
    let users: Vec<User> = db
        .users
        .values()
        .filter(|u| matches(&u.name, &q.search) || matches(&u.email, &q.search))
        .cloned()
        .collect();
    reply(StatusCode::OK, None, Some(users))
}

async fn create_user(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let (Some(name), Some(email), Some(_password), Some(role)) = (
        form.get("name"),
        form.get("email"),
        form.get("password"),
        form.get("role"),
    ) else {
        return fail(StatusCode::BAD_REQUEST, "name, email, password and role are required");
    };
    if !ROLES.contains(&role) {
        return fail(StatusCode::BAD_REQUEST, "role must be ADMIN or USER");
    }

    let mut db = state.db.write().await;
    if db.users.values().any(|u| u.email == email) {
        return fail(StatusCode::BAD_REQUEST, "Email has already been used");
    }
    let user = User {
        id: db.next_id(),
        uuid: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        profile_picture: form.picture.clone().unwrap_or_default(),
        created_at: now(),
        updated_at: now(),
    };
    db.users.insert(user.id, user.clone());
    reply(StatusCode::CREATED, Some("New user has been created"), Some(user))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    multipart: Multipart,
) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let role = form.get("role");
    if role.is_some_and(|r| !ROLES.contains(&r)) {
        return fail(StatusCode::BAD_REQUEST, "role must be ADMIN or USER");
    }

    let mut db = state.db.write().await;
    if !db.users.contains_key(&id) {
        return fail(StatusCode::NOT_FOUND, "User not found");
    }
    let email = form.get("email");
    if let Some(email) = email {
        if db.users.values().any(|u| u.id != id && u.email == email) {
            return fail(StatusCode::BAD_REQUEST, "Email has already been used");
        }
    }
    let Some(user) = db.users.get_mut(&id) else {
        return fail(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(name) = form.get("name") {
        user.name = name.to_string();
    }
    if let Some(email) = email {
        user.email = email.to_string();
    }
    if let Some(role) = role {
        user.role = role.to_string();
    }
    if let Some(picture) = form.picture.clone() {
        user.profile_picture = picture;
    }
    user.updated_at = now();
    let user = user.clone();
    reply(StatusCode::OK, Some("User has been updated"), Some(user))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut db = state.db.write().await;
    match db.users.remove(&id) {
        Some(user) => reply(StatusCode::OK, Some("User has been deleted"), Some(user)),
        None => fail(StatusCode::NOT_FOUND, "User not found"),
    }
}

// --- orders ---

async fn list_orders(State(state): State<AppState>) -> Response {
    let db = state.db.read().await;
    let orders: Vec<Order> = db.orders.values().cloned().collect();
    reply(StatusCode::OK, None, Some(orders))
}

async fn create_order(State(state): State<AppState>, Json(input): Json<NewOrder>) -> Response {
    if input.customer.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "customer is required");
    }
    if input.orderlists.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "orderlists must not be empty");
    }
    let mut db = state.db.write().await;
    if let Some(missing) = input
        .orderlists
        .iter()
        .find(|line| !db.products.contains_key(&line.product_id))
    {
        return fail(
            StatusCode::NOT_FOUND,
            &format!("Product {} not found", missing.product_id),
        );
    }
    let order = Order {
        id: db.next_id(),
        customer: input.customer,
        payment_method: input.payment_method,
        status: input.status,
        orderlists: input.orderlists,
    };
    db.orders.insert(order.id, order.clone());
    reply(StatusCode::CREATED, Some("New order has been created"), Some(order))
}

// --- favorites ---

async fn list_favorites(State(state): State<AppState>) -> Response {
    let db = state.db.read().await;
    reply(StatusCode::OK, None, Some(db.favorites.clone()))
}

async fn toggle_favorite(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let mut db = state.db.write().await;
    if !db.products.contains_key(&id) {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    }
    if let Some(pos) = db.favorites.iter().position(|fav| *fav == id) {
        db.favorites.remove(pos);
        reply(StatusCode::OK, Some("Removed from favorites"), Some(db.favorites.clone()))
    } else {
        db.favorites.push(id);
        reply(StatusCode::OK, Some("Added to favorites"), Some(db.favorites.clone()))
    }
}
