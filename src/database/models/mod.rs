pub mod category;
pub mod ingredient;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use category::{Category, CategoryPatch};
pub use ingredient::{Ingredient, IngredientPatch, NewIngredient};
pub use order::{
    AdditionalIngredient, NewOrder, Order, OrderAdditionalIngredient, OrderDetail, OrderProduct,
    OrderRemovedIngredient,
};
pub use product::{NewProduct, Product, ProductDetail, ProductIngredient, ProductPatch};
pub use session::Session;
pub use user::{NewUser, User};

/// Values accepted by each entity's `status` column CHECK constraint
pub mod status {
    pub const CATEGORY: &[&str] = &["available", "disabled"];
    pub const PRODUCT: &[&str] = &["available", "missing", "disabled"];
    pub const ORDER: &[&str] = &["pending", "accepted", "declined", "finished"];
}

pub const PRODUCT_CATEGORIES: &[&str] = &["coffees", "sweets", "snacks", "teas"];
pub const USER_FEATURES: &[&str] = &["admin"];
