use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price: i64,
    pub quantity: i32,
    pub on_sale: Option<bool>,
    pub discount: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
    pub on_sale: Option<bool>,
    pub discount: Option<i32>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRating {
    pub average: Option<f64>,
    pub total: i64,
    /// Review counts indexed by score 0..=5.
    pub counts: [i64; 6],
}
