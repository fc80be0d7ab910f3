use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub value: Option<i32>,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub value: Option<i32>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub value: Option<i32>,
    pub price: Option<Decimal>,
}
