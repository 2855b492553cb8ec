use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateProductRequest, ImageUploadResponse, Product},
};

pub async fn create_product(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let new_product = payload.validate()?;
    let product = state.products.create_product(new_product).await?;
    let location = format!("/api/products/{}", product.code);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .products
        .get_product_by_code(&code)
        .await?
        .ok_or_else(|| AppError::ProductNotFound(code.clone()))?;

    Ok(Json(product))
}

pub async fn upload_product_image(
    State(state): State<AppState>,
    Path(code): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageUploadResponse>> {
    let mut multipart = multipart?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("file").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("file is empty".to_string()));
        }

        let response = state
            .products
            .update_product_image(&code, &filename, content_type.as_deref(), bytes)
            .await?;

        return Ok(Json(response));
    }

    Err(AppError::Validation("file is required".to_string()))
}
