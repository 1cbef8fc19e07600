//! Category CRUD handlers
//!
//! Category routes are addressed by one path parameter that is a UUID for
//! the CRUD operations and a slug for the product listing.

use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::domain::aggregates::product::{Category, Product};

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub image: Option<String>,
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>, (StatusCode, String)> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(categories))
}

pub async fn get_category(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Category>, (StatusCode, String)> {
    let id = parse_id(&id)?;
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1").bind(id)
        .fetch_optional(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map(Json).ok_or((StatusCode::NOT_FOUND, "Category not found".to_string()))
}

pub async fn products_by_category(State(s): State<AppState>, Path(slug): Path<String>) -> Result<Json<Vec<Product>>, (StatusCode, String)> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE category = $1 ORDER BY created_at DESC")
        .bind(&slug)
        .fetch_all(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(products))
}

pub async fn create_category(State(s): State<AppState>, Json(r): Json<CategoryRequest>) -> Result<(StatusCode, Json<Category>), (StatusCode, String)> {
    r.validate().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let slug = Category::slugify(&r.name);
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, image, created_at) VALUES ($1, $2, $3, $4, NOW()) RETURNING *")
        .bind(Uuid::now_v7()).bind(&r.name).bind(&slug).bind(&r.image)
        .fetch_one(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<CategoryRequest>) -> Result<Json<Category>, (StatusCode, String)> {
    let id = parse_id(&id)?;
    r.validate().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let slug = Category::slugify(&r.name);
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $2, slug = $3, image = $4 WHERE id = $1 RETURNING *")
        .bind(id).bind(&r.name).bind(&slug).bind(&r.image)
        .fetch_optional(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::NOT_FOUND, "Category not found".to_string()))?;
    Ok(Json(category))
}

pub async fn delete_category(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id)
        .execute(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if result.rows_affected() == 0 {
        return Err((StatusCode::NOT_FOUND, "Category not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(raw).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid category ID".to_string()))
}
