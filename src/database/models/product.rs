use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub ingredients_ids: Vec<i32>,
    pub name: String,
    pub category: String,
    pub category_id: Option<i32>,
    pub status: String,
    pub price: Decimal,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingredient entry joined onto a product, in `ingredients_ids` order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductIngredient {
    pub id: i32,
    pub name: String,
    pub value: Option<i32>,
    pub price: Option<Decimal>,
}

/// Product row plus its joined ingredients, returned by `GET /products/{id}`
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub ingredients: Json<Vec<ProductIngredient>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub ingredients_ids: Vec<i32>,
    pub name: String,
    pub category: String,
    pub category_id: Option<i32>,
    pub price: Decimal,
    pub picture: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub ingredients_ids: Option<Vec<i32>>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<i32>,
    pub status: Option<String>,
    pub price: Option<Decimal>,
    pub picture: Option<String>,
}
