use std::time::Duration;

use crate::domain::{Cart, Product};

pub trait Response{}

/// Result of one aggregation run.
///
/// For the concurrent strategies `products` is in arrival order, which is not
/// necessarily the order of `cart.products`.
#[derive(Debug, Clone)]
pub struct CartAndProductsResponse {
    pub cart: Cart,
    pub products: Vec<Product>,
    pub elapsed: Duration,
}
impl Response for CartAndProductsResponse{}
