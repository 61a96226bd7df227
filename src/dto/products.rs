use serde::{Deserialize, Serialize};

use crate::models::Product;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductList {
    #[serde(rename = "List", default)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartProductsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}
