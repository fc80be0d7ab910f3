use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub order_id: Option<String>,
    pub product_id: i32,
    pub price: Decimal,
    pub table_number: i32,
    pub observation: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderProduct {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAdditionalIngredient {
    pub name: String,
    pub multiplied: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRemovedIngredient {
    pub name: String,
}

/// Order row with its product and ingredient customisations aggregated as JSON arrays
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub product: Json<Vec<OrderProduct>>,
    pub additional_ingredients: Json<Vec<OrderAdditionalIngredient>>,
    pub removed_ingredients: Json<Vec<OrderRemovedIngredient>>,
}

/// Add-on requested for a single order line
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdditionalIngredient {
    pub ingredient_id: i32,
    pub multiplied: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub order_id: String,
    pub product_id: i32,
    pub price: Decimal,
    pub table_number: i32,
    pub observation: Option<String>,
    #[serde(default)]
    pub additional_ingredients: Vec<AdditionalIngredient>,
    #[serde(default)]
    pub removed_ingredients: Vec<i32>,
}
