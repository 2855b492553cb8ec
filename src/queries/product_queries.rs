use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{NewProduct, ProductRow},
};

pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<ProductRow>> {
    let product = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn insert(pool: &PgPool, product: &NewProduct) -> Result<ProductRow> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products (code, name, description, price, available)
         VALUES ($1, $2, $3, $4, TRUE)
         RETURNING *",
    )
    .bind(&product.code)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::DuplicateCode(product.code.clone())
        }
        other => AppError::Database(other),
    })?;

    Ok(row)
}

/// Single-statement update of the image column; no other field is touched.
pub async fn update_image(pool: &PgPool, code: &str, image_url: &str) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE products SET image_url = $2, updated_at = NOW() WHERE code = $1",
    )
    .bind(code)
    .bind(image_url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_all(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products").execute(pool).await?;

    Ok(result.rows_affected())
}
