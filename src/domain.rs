use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: u32,
    #[serde(rename = "userId")]
    pub user_id: u32,
    // passed through as-is, never parsed
    pub date: String,
    pub products: Vec<CartProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    #[serde(rename = "productId")]
    pub product_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub price: f64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: Rating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}
