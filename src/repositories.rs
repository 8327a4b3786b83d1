#[cfg(test)]
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{event, Level};

use crate::{
    config::CatalogConfig,
    domain::{Cart, Product},
    errors::FetchError,
};

/// The only I/O boundary of the aggregation strategies.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn fetch_cart(&self, cart_id: u32) -> Result<Cart, FetchError>;
    async fn fetch_product(&self, product_id: u32) -> Result<Product, FetchError>;
}

/// Catalog backed by the fakestoreapi HTTP API.
#[derive(Debug, Clone)]
pub struct FakeStoreApiRepository {
    base_url: String,
    http: Client,
}

impl FakeStoreApiRepository {
    pub fn new(config: &CatalogConfig) -> Self {
        FakeStoreApiRepository {
            base_url: config.base_url.clone(),
            http: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        event!(Level::DEBUG, url = %url, "sending catalog request");

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            event!(Level::WARN, url = %url, status = status.as_u16(), "catalog request failed");
            return Err(FetchError::Status {
                url: url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url,
            source: source,
        })
    }
}

#[async_trait]
impl CatalogRepository for FakeStoreApiRepository {
    async fn fetch_cart(&self, cart_id: u32) -> Result<Cart, FetchError> {
        self.get_json(&format!("carts/{}", cart_id)).await
    }

    async fn fetch_product(&self, product_id: u32) -> Result<Product, FetchError> {
        self.get_json(&format!("products/{}", product_id)).await
    }
}

/// Fixture-backed catalog with optional per-record latency and forced
/// failures. Unknown ids answer like the real API would, with a 404.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    carts: HashMap<u32, Cart>,
    products: HashMap<u32, Product>,
    cart_delay: Option<Duration>,
    product_delays: HashMap<u32, Duration>,
    product_failures: HashMap<u32, u16>,
    cart_fetches: AtomicUsize,
    product_fetches: AtomicUsize,
}

#[cfg(test)]
impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        InMemoryCatalogRepository::default()
    }

    pub fn with_cart(mut self, cart: Cart) -> Self {
        self.carts.insert(cart.id, cart);
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.id, product);
        self
    }

    pub fn with_cart_delay(mut self, delay: Duration) -> Self {
        self.cart_delay = Some(delay);
        self
    }

    pub fn with_product_delay(mut self, product_id: u32, delay: Duration) -> Self {
        self.product_delays.insert(product_id, delay);
        self
    }

    /// Makes every fetch of `product_id` fail with the given HTTP status.
    pub fn with_product_failure(mut self, product_id: u32, status: u16) -> Self {
        self.product_failures.insert(product_id, status);
        self
    }

    pub fn cart_fetches(&self) -> usize {
        self.cart_fetches.load(Ordering::SeqCst)
    }

    pub fn product_fetches(&self) -> usize {
        self.product_fetches.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn fetch_cart(&self, cart_id: u32) -> Result<Cart, FetchError> {
        self.cart_fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.cart_delay {
            tokio::time::sleep(delay).await;
        }

        match self.carts.get(&cart_id) {
            Some(x) => Ok(x.clone()),
            None => Err(FetchError::Status {
                url: format!("carts/{}", cart_id),
                status: 404,
            }),
        }
    }

    async fn fetch_product(&self, product_id: u32) -> Result<Product, FetchError> {
        self.product_fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.product_delays.get(&product_id) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(status) = self.product_failures.get(&product_id) {
            return Err(FetchError::Status {
                url: format!("products/{}", product_id),
                status: *status,
            });
        }

        match self.products.get(&product_id) {
            Some(x) => Ok(x.clone()),
            None => Err(FetchError::Status {
                url: format!("products/{}", product_id),
                status: 404,
            }),
        }
    }
}
