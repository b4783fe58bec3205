use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Order, Product, Reply, User, DEFAULT_TOKEN};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(method: &str, uri: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {DEFAULT_TOKEN}"))
}

fn empty(method: &str, uri: &str) -> Request<String> {
    authed(method, uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    authed(method, uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn multipart_request(method: &str, uri: &str, fields: &[(&str, &str)], file: Option<(&str, &str)>) -> Request<String> {
    let boundary = "XBOUNDARYX";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((name, file_name)) = file {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    authed(method, uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .unwrap()
}

fn tea() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Green Tea"),
        ("price", "5000"),
        ("description", "Hot"),
        ("category", "DRINK"),
    ]
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let resp = app(DEFAULT_TOKEN)
        .oneshot(Request::builder().uri("/product").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let reply: Reply<serde_json::Value> = body_json(resp).await;
    assert!(!reply.status);
    assert_eq!(reply.message.as_deref(), Some("Unauthorized"));
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let resp = app("other")
        .oneshot(empty("GET", "/product"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- products ---

#[tokio::test]
async fn list_products_empty() {
    let resp = app(DEFAULT_TOKEN).oneshot(empty("GET", "/product")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let reply: Reply<Vec<Product>> = body_json(resp).await;
    assert!(reply.status);
    assert!(reply.data.unwrap().is_empty());
}

#[tokio::test]
async fn create_product_from_multipart() {
    let resp = app(DEFAULT_TOKEN)
        .oneshot(multipart_request("POST", "/product/create", &tea(), Some(("picture", "tea.png"))))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let reply: Reply<Product> = body_json(resp).await;
    let product = reply.data.unwrap();
    assert_eq!(product.name, "Green Tea");
    assert_eq!(product.price, 5000.0);
    assert_eq!(product.category, "DRINK");
    assert_eq!(product.picture, "tea.png");
}

#[tokio::test]
async fn create_product_rejects_unknown_category() {
    let resp = app(DEFAULT_TOKEN)
        .oneshot(multipart_request(
            "POST",
            "/product/create",
            &[("name", "Lamp"), ("price", "10"), ("category", "FURNITURE")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_search_filters_by_name() {
    let app = app(DEFAULT_TOKEN);
    app.clone()
        .oneshot(multipart_request("POST", "/product/create", &tea(), None))
        .await
        .unwrap();
    app.clone()
        .oneshot(multipart_request(
            "POST",
            "/product/create",
            &[("name", "Rice"), ("price", "12000"), ("category", "FOOD")],
            None,
        ))
        .await
        .unwrap();

    let resp = app.oneshot(empty("GET", "/product?search=tea")).await.unwrap();
    let reply: Reply<Vec<Product>> = body_json(resp).await;
    let names: Vec<String> = reply.data.unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Green Tea".to_string()]);
}

#[tokio::test]
async fn update_and_delete_product() {
    let app = app(DEFAULT_TOKEN);
    let resp = app
        .clone()
        .oneshot(multipart_request("POST", "/product/create", &tea(), None))
        .await
        .unwrap();
    let created: Reply<Product> = body_json(resp).await;
    let id = created.data.unwrap().id;

    let resp = app
        .clone()
        .oneshot(multipart_request("PUT", &format!("/product/{id}"), &[("price", "6500")], None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Reply<Product> = body_json(resp).await;
    let updated = updated.data.unwrap();
    assert_eq!(updated.price, 6500.0);
    assert_eq!(updated.name, "Green Tea");

    let resp = app
        .clone()
        .oneshot(empty("DELETE", &format!("/product/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(empty("DELETE", &format!("/product/{id}"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let reply: Reply<serde_json::Value> = body_json(resp).await;
    assert_eq!(reply.message.as_deref(), Some("Product not found"));
}

#[tokio::test]
async fn rejected_update_leaves_product_untouched() {
    let app = app(DEFAULT_TOKEN);
    let resp = app
        .clone()
        .oneshot(multipart_request("POST", "/product/create", &tea(), None))
        .await
        .unwrap();
    let created: Reply<Product> = body_json(resp).await;
    let id = created.data.unwrap().id;

    for fields in [
        [("name", "Black Tea"), ("price", "cheap")],
        [("name", "Black Tea"), ("category", "FURNITURE")],
    ] {
        let resp = app
            .clone()
            .oneshot(multipart_request("PUT", &format!("/product/{id}"), &fields, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let resp = app.oneshot(empty("GET", "/product")).await.unwrap();
    let reply: Reply<Vec<Product>> = body_json(resp).await;
    let product = &reply.data.unwrap()[0];
    assert_eq!(product.name, "Green Tea");
    assert_eq!(product.price, 5000.0);
    assert_eq!(product.category, "DRINK");
}

// --- users ---

#[tokio::test]
async fn create_user_requires_password() {
    let resp = app(DEFAULT_TOKEN)
        .oneshot(multipart_request(
            "POST",
            "/user/create",
            &[("name", "Ann"), ("email", "ann@eco.test"), ("role", "ADMIN")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_and_list_users() {
    let app = app(DEFAULT_TOKEN);
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "POST",
            "/user/create",
            &[
                ("name", "Ann"),
                ("email", "ann@eco.test"),
                ("password", "secret"),
                ("role", "ADMIN"),
            ],
            Some(("picture", "ann.png")),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Reply<User> = body_json(resp).await;
    assert_eq!(created.data.unwrap().profile_picture, "ann.png");

    let resp = app.oneshot(empty("GET", "/user")).await.unwrap();
    let reply: Reply<Vec<User>> = body_json(resp).await;
    assert_eq!(reply.data.unwrap().len(), 1);
}

#[tokio::test]
async fn update_missing_user_is_404() {
    let resp = app(DEFAULT_TOKEN)
        .oneshot(multipart_request("PUT", "/user/99", &[("name", "Nobody")], None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_user_rejects_taken_email() {
    let app = app(DEFAULT_TOKEN);
    let mut ids = Vec::new();
    for (name, email) in [("Ann", "ann@eco.test"), ("Bob", "bob@eco.test")] {
        let resp = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/user/create",
                &[("name", name), ("email", email), ("password", "secret"), ("role", "USER")],
                None,
            ))
            .await
            .unwrap();
        let created: Reply<User> = body_json(resp).await;
        ids.push(created.data.unwrap().id);
    }

    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &format!("/user/{}", ids[1]),
            &[("name", "Robert"), ("email", "ann@eco.test")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let reply: Reply<serde_json::Value> = body_json(resp).await;
    assert_eq!(reply.message.as_deref(), Some("Email has already been used"));

    // Keeping one's own email is not a conflict.
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &format!("/user/{}", ids[0]),
            &[("email", "ann@eco.test"), ("role", "ADMIN")],
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(empty("GET", "/user")).await.unwrap();
    let reply: Reply<Vec<User>> = body_json(resp).await;
    let bob = reply.data.unwrap().into_iter().find(|u| u.id == ids[1]).unwrap();
    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.email, "bob@eco.test");
}

// --- orders ---

#[tokio::test]
async fn order_for_unknown_product_is_404() {
    let resp = app(DEFAULT_TOKEN)
        .oneshot(json_request(
            "POST",
            "/order/create",
            r#"{"customer":"Budi","payment_method":"CASH","status":"NEW","orderlists":[{"productId":7,"quantity":1,"note":"-"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_order_then_list() {
    let app = app(DEFAULT_TOKEN);
    let resp = app
        .clone()
        .oneshot(multipart_request("POST", "/product/create", &tea(), None))
        .await
        .unwrap();
    let created: Reply<Product> = body_json(resp).await;
    let product_id = created.data.unwrap().id;

    let body = format!(
        r#"{{"customer":"Budi","payment_method":"QRIS","status":"NEW","orderlists":[{{"productId":{product_id},"quantity":2,"note":"-"}}]}}"#
    );
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/order/create", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.oneshot(empty("GET", "/order")).await.unwrap();
    let reply: Reply<Vec<Order>> = body_json(resp).await;
    let orders = reply.data.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].payment_method, "QRIS");
    assert_eq!(orders[0].orderlists[0].quantity, 2);
}

// --- favorites ---

#[tokio::test]
async fn toggle_favorite_adds_then_removes() {
    let app = app(DEFAULT_TOKEN);
    let resp = app
        .clone()
        .oneshot(multipart_request("POST", "/product/create", &tea(), None))
        .await
        .unwrap();
    let created: Reply<Product> = body_json(resp).await;
    let id = created.data.unwrap().id;

    let resp = app
        .clone()
        .oneshot(json_request("POST", &format!("/favorite/{id}"), "{}"))
        .await
        .unwrap();
    let reply: Reply<Vec<u64>> = body_json(resp).await;
    assert_eq!(reply.message.as_deref(), Some("Added to favorites"));
    assert_eq!(reply.data.unwrap(), vec![id]);

    let resp = app
        .clone()
        .oneshot(json_request("POST", &format!("/favorite/{id}"), "{}"))
        .await
        .unwrap();
    let reply: Reply<Vec<u64>> = body_json(resp).await;
    assert_eq!(reply.message.as_deref(), Some("Removed from favorites"));

    let resp = app.oneshot(empty("GET", "/favorite")).await.unwrap();
    let reply: Reply<Vec<u64>> = body_json(resp).await;
    assert!(reply.data.unwrap().is_empty());
}

#[tokio::test]
async fn favorite_for_unknown_product_is_404() {
    let resp = app(DEFAULT_TOKEN)
        .oneshot(json_request("POST", "/favorite/42", "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
