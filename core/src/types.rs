//! Domain DTOs for the Eco Market backend.
//!
//! # Design
//! Field names follow the backend's JSON (`createdAt`, `payment_method`,
//! `orderlists`). The mock-server crate defines its own copies; the
//! integration tests catch drift between the two.

use serde::{Deserialize, Serialize};

use crate::body::{FilePart, MultipartForm};

/// The backend's own reply wrapper: `{status, message?, data?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerReply<T> {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Food,
    Drink,
    Items,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "FOOD",
            Category::Drink => "DRINK",
            Category::Items => "ITEMS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, rename = "profile_picture")]
    pub profile_picture: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Qris,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Paid,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: u32,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[serde(default)]
    pub orderlists: Vec<OrderLine>,
}

/// Payload for `POST /order/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub orderlists: Vec<OrderLine>,
}

impl NewOrder {
    /// A fresh order. Blank line notes are replaced with `-`, which the
    /// backend requires.
    pub fn new(customer: &str, payment_method: PaymentMethod, lines: Vec<OrderLine>) -> Self {
        Self {
            customer: customer.trim().to_string(),
            payment_method,
            status: OrderStatus::New,
            orderlists: lines
                .into_iter()
                .map(|mut line| {
                    if line.note.trim().is_empty() {
                        line.note = "-".to_string();
                    }
                    line
                })
                .collect(),
        }
    }
}

/// Product fields for multipart create/update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: Category,
    pub picture: Option<FilePart>,
}

impl ProductForm {
    pub fn to_multipart(&self) -> MultipartForm {
        let form = MultipartForm::new()
            .text("name", self.name.as_str())
            .text("price", self.price.to_string())
            .text("description", self.description.as_str())
            .text("category", self.category.as_str());
        match &self.picture {
            Some(file) => form.file("picture", file.clone()),
            None => form,
        }
    }
}

/// User fields for multipart create/update. The password is optional on
/// update and omitted from the form when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
    pub picture: Option<FilePart>,
}

impl UserForm {
    pub fn to_multipart(&self) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("name", self.name.as_str())
            .text("email", self.email.as_str());
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            form = form.text("password", password);
        }
        form = form.text("role", self.role.as_str());
        match &self.picture {
            Some(file) => form.file("picture", file.clone()),
            None => form,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_without_data_decodes_for_any_dto() {
        let reply: ServerReply<Product> = serde_json::from_str(r#"{"status":true}"#).unwrap();
        assert!(reply.status);
        assert!(reply.data.is_none());
        assert!(reply.message.is_none());

        let reply: ServerReply<Order> =
            serde_json::from_str(r#"{"status":false,"message":"Order not found"}"#).unwrap();
        assert_eq!(reply.message.as_deref(), Some("Order not found"));
        assert!(reply.data.is_none());
    }

    #[test]
    fn product_uses_backend_field_names() {
        let product: Product = serde_json::from_str(
            r#"{"id":1,"name":"Tea","price":5000,"category":"DRINK","createdAt":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(product.category, Category::Drink);
        assert_eq!(product.created_at, "2024-01-01");
        assert!(product.picture.is_empty());
    }

    #[test]
    fn new_order_serializes_like_checkout() {
        let order = NewOrder::new(
            "  Budi ",
            PaymentMethod::Qris,
            vec![OrderLine {
                product_id: 3,
                quantity: 2,
                note: String::new(),
            }],
        );
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customer"], "Budi");
        assert_eq!(json["payment_method"], "QRIS");
        assert_eq!(json["status"], "NEW");
        assert_eq!(json["orderlists"][0]["productId"], 3);
        assert_eq!(json["orderlists"][0]["note"], "-");
    }

    #[test]
    fn server_reply_tolerates_missing_data() {
        let reply: ServerReply<Vec<Product>> =
            serde_json::from_str(r#"{"status":false,"message":"Unauthorized"}"#).unwrap();
        assert!(!reply.status);
        assert!(reply.data.is_none());
    }

    #[test]
    fn product_form_fields() {
        let form = ProductForm {
            name: "Tea".into(),
            price: 5000.0,
            description: "Green".into(),
            category: Category::Drink,
            picture: Some(FilePart::new("tea.png", "image/png", vec![1])),
        }
        .to_multipart()
        .with_boundary("X");
        let encoded = String::from_utf8_lossy(&form.encode()).into_owned();
        assert!(encoded.contains("name=\"category\"\r\n\r\nDRINK\r\n"));
        assert!(encoded.contains("name=\"price\"\r\n\r\n5000\r\n"));
        assert!(form.has_files());
    }

    #[test]
    fn user_form_skips_blank_password() {
        let form = UserForm {
            name: "Ann".into(),
            email: "ann@eco.test".into(),
            password: Some(String::new()),
            role: Role::Admin,
            picture: None,
        }
        .to_multipart()
        .with_boundary("X");
        let encoded = String::from_utf8_lossy(&form.encode()).into_owned();
        assert!(!encoded.contains("password"));
        assert!(encoded.contains("ADMIN"));
        assert!(!form.has_files());
    }
}
