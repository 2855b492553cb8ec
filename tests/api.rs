mod support;

use reqwest::{multipart, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use support::{eventually, spawn_app};
use uuid::Uuid;

use catalog_service::models::Product;

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn image_form(filename: &str) -> anyhow::Result<multipart::Form> {
    let part = multipart::Part::bytes(b"\xFF\xD8\xFF\xE0fake-jpeg".to_vec())
        .file_name(filename.to_string())
        .mime_str("image/jpeg")?;
    Ok(multipart::Form::new().part("file", part))
}

#[tokio::test]
async fn create_product_successfully() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let code = Uuid::new_v4().to_string();

    let res = client()
        .post(format!("{}/api/products", app.base_url))
        .json(&json!({
            "code": code,
            "name": format!("Product {}", code),
            "description": format!("Product {} description", code),
            "price": 10.0
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers().get("location").expect("location header").to_str()?;
    assert!(location.ends_with(&format!("/api/products/{}", code)));
    Ok(())
}

#[tokio::test]
async fn get_product_by_code_successfully() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let res = client()
        .get(format!("{}/api/products/P101", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let product: Product = res.json().await?;
    assert_eq!(product.code, "P101");
    assert_eq!(product.name, "Product P101");
    assert_eq!(product.description.as_deref(), Some("Product P101 description"));
    assert_eq!(product.price, Decimal::new(340, 1));
    assert!(product.available);
    assert!(product.image_url.is_none());
    Ok(())
}

#[tokio::test]
async fn get_product_by_wrong_code_returns_problem_detail() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let res = client()
        .get(format!("{}/api/products/P100001", app.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );

    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "P100001 is not found");
    assert_eq!(body["status"], 404);
    Ok(())
}

#[tokio::test]
async fn fails_to_create_product_if_payload_invalid() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let code = Uuid::new_v4().to_string();

    let res = client()
        .post(format!("{}/api/products", app.base_url))
        .json(&json!({
            "code": code,
            "description": format!("Product {} description", code),
            "price": 10.0
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "name is required");
    Ok(())
}

fn assert_problem(res: &reqwest::Response, status: StatusCode) {
    assert_eq!(res.status(), status);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
}

#[tokio::test]
async fn wrong_typed_field_is_bad_request() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    for payload in [
        json!({ "code": "X1", "name": 5, "price": 10.0 }),
        json!({ "code": "X1", "name": "X", "price": "abc" }),
    ] {
        let res = client()
            .post(format!("{}/api/products", app.base_url))
            .json(&payload)
            .send()
            .await?;
        assert_problem(&res, StatusCode::BAD_REQUEST);

        let body: Value = res.json().await?;
        assert_eq!(body["status"], 400);
    }

    assert!(app.products.get_product_by_code("X1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn create_without_json_content_type_is_bad_request() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let res = client()
        .post(format!("{}/api/products", app.base_url))
        .body(r#"{"code":"X2","name":"X","price":10.0}"#)
        .send()
        .await?;
    assert_problem(&res, StatusCode::BAD_REQUEST);

    assert!(app.products.get_product_by_code("X2").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn unaddressable_code_is_rejected_before_storing() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    for code in ["P\u{1} 9", "P1/2"] {
        let res = client()
            .post(format!("{}/api/products", app.base_url))
            .json(&json!({ "code": code, "name": "X", "price": 10.0 }))
            .send()
            .await?;
        assert_problem(&res, StatusCode::BAD_REQUEST);
        assert!(app.products.get_product_by_code(code).await?.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn fails_to_create_product_if_code_exists() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let code = Uuid::new_v4().to_string();

    let first = client()
        .post(format!("{}/api/products", app.base_url))
        .json(&json!({
            "code": code,
            "name": format!("Product {}", code),
            "description": format!("Product {} description", code),
            "price": 10.0
        }))
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client()
        .post(format!("{}/api/products", app.base_url))
        .json(&json!({
            "code": code,
            "name": format!("Another Product {}", code),
            "description": format!("Another product {} description", code),
            "price": 11.0
        }))
        .send()
        .await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let stored = app.products.get_product_by_code(&code).await?.expect("first product");
    assert_eq!(stored.name, format!("Product {}", code));
    Ok(())
}

#[tokio::test]
async fn upload_product_image_successfully() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let before = app.products.get_product_by_code("P101").await?.expect("P101");
    assert!(before.image_url.is_none());

    let res = client()
        .post(format!("{}/api/products/P101/image", app.base_url))
        .multipart(image_form("P101.jpg")?)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert!(body["status"].as_str().unwrap_or_default().ends_with("success"));
    assert!(body["filename"].as_str().unwrap_or_default().ends_with("P101.jpg"));

    let products = app.products.clone();
    let image_url = eventually(|| {
        let products = products.clone();
        async move {
            products
                .get_product_by_code("P101")
                .await
                .ok()
                .flatten()
                .and_then(|p| p.image_url)
                .filter(|url| !url.is_empty())
        }
    })
    .await;
    assert!(image_url.is_some(), "imageUrl was never set");

    let after = app.products.get_product_by_code("P101").await?.expect("P101");
    assert_eq!(after.name, before.name);
    assert_eq!(after.description, before.description);
    assert_eq!(after.price, before.price);
    Ok(())
}

#[tokio::test]
async fn upload_image_without_file_is_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let form = multipart::Form::new().text("note", "no file here");
    let res = client()
        .post(format!("{}/api/products/P101/image", app.base_url))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn upload_image_with_empty_file_is_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let part = multipart::Part::bytes(Vec::new())
        .file_name("empty.jpg")
        .mime_str("image/jpeg")?;
    let res = client()
        .post(format!("{}/api/products/P101/image", app.base_url))
        .multipart(multipart::Form::new().part("file", part))
        .send()
        .await?;

    assert_problem(&res, StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "file is empty");
    Ok(())
}

#[tokio::test]
async fn upload_image_without_multipart_body_is_bad_request() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let res = client()
        .post(format!("{}/api/products/P101/image", app.base_url))
        .body("not multipart")
        .send()
        .await?;

    assert_problem(&res, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn upload_image_for_unknown_product_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let res = client()
        .post(format!("{}/api/products/P100001/image", app.base_url))
        .multipart(image_form("P100001.jpg")?)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "P100001 is not found");
    Ok(())
}

#[tokio::test]
async fn health_and_readiness_report_ok() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let health = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.json::<Value>().await?["status"], "ok");

    let ready = client().get(format!("{}/health/ready", app.base_url)).send().await?;
    assert_eq!(ready.status(), StatusCode::OK);
    assert_eq!(ready.json::<Value>().await?["status"], "ready");
    Ok(())
}
