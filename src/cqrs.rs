use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::Instant};
use tracing::{event, Level};

use crate::{
    domain::Product,
    dtos::{CartAndProductsResponse, Response},
    errors::FetchError,
    repositories::CatalogRepository,
    wait_group::WaitGroup,
};

// traits
pub trait Query{}

#[allow(async_fn_in_trait)]
pub trait QueryHandler<Q: Query, R: Response>{
    async fn handle(&self, input: &Q) -> Result<R, FetchError>;
}

#[derive(Debug, Clone, Copy)]
pub struct LoadCartAndProductsQuery {
    pub cart_id: u32
}
impl Query for LoadCartAndProductsQuery{}

fn log_runtime(strategy: &str, elapsed: Duration, cart_id: u32, products: usize) {
    event!(
        Level::INFO,
        strategy = strategy,
        duration = ?elapsed,
        cart_id = cart_id,
        products = products,
        "{} runtime", strategy
    );
}

fn log_failure(strategy: &str, cart_id: u32, error: &FetchError) {
    event!(Level::WARN, strategy = strategy, cart_id = cart_id, "aggregation aborted: {}", error);
}

/// Fetches products one after another. Output order is the cart's reference
/// order.
pub struct SequentialQueryHandler<R: CatalogRepository>{
    repository: Arc<R>
}

impl<R: CatalogRepository> SequentialQueryHandler<R>{
    pub const NAME: &'static str = "LoadCartAndProductsSequential";

    pub fn new(repository: Arc<R>) -> Self{
        SequentialQueryHandler {
            repository: repository
        }
    }

    async fn load(&self, cart_id: u32) -> Result<CartAndProductsResponse, FetchError> {
        let start = Instant::now();

        let cart = self.repository.fetch_cart(cart_id).await?;

        let mut products = Vec::with_capacity(cart.products.len());
        for cart_product in cart.products.iter() {
            products.push(self.repository.fetch_product(cart_product.product_id).await?);
        }

        let elapsed = start.elapsed();
        log_runtime(Self::NAME, elapsed, cart.id, products.len());

        Ok(CartAndProductsResponse {
            cart: cart,
            products: products,
            elapsed: elapsed,
        })
    }
}

impl<R: CatalogRepository> QueryHandler<LoadCartAndProductsQuery, CartAndProductsResponse> for SequentialQueryHandler<R>{
    async fn handle(&self, input: &LoadCartAndProductsQuery) -> Result<CartAndProductsResponse, FetchError> {
        self.load(input.cart_id).await.inspect_err(|e| log_failure(Self::NAME, input.cart_id, e))
    }
}

/// Spawns one fetch per product and receives exactly as many results as
/// tasks were spawned.
///
/// Products come back in arrival order. A fetch that never finishes keeps the
/// collector waiting forever. The first failed fetch aborts the aggregation;
/// its siblings keep running and their results are discarded.
pub struct ExhaustChannelQueryHandler<R: CatalogRepository> {
    repository: Arc<R>
}

impl<R: CatalogRepository + 'static> ExhaustChannelQueryHandler<R> {
    pub const NAME: &'static str = "LoadCartAndProductsExhaustChannel";

    pub fn new(repository: Arc<R>) -> Self {
        ExhaustChannelQueryHandler {
            repository: repository
        }
    }

    async fn load(&self, cart_id: u32) -> Result<CartAndProductsResponse, FetchError> {
        let start = Instant::now();

        let cart = self.repository.fetch_cart(cart_id).await?;
        let producer_count = cart.products.len();

        // bounded channels reject a capacity of zero
        let (tx, mut rx) = mpsc::channel::<Result<Product, FetchError>>(producer_count.max(1));
        for cart_product in cart.products.iter() {
            let repository = self.repository.clone();
            let tx = tx.clone();
            let product_id = cart_product.product_id;

            tokio::spawn(async move {
                let result = repository.fetch_product(product_id).await;
                // the collector is gone once it has seen an error
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let mut products = Vec::with_capacity(producer_count);
        for _ in 0..producer_count {
            match rx.recv().await {
                Some(result) => products.push(result?),
                None => {
                    return Err(FetchError::Task(format!(
                        "{} of {} product fetches never reported",
                        producer_count - products.len(),
                        producer_count
                    )))
                }
            }
        }

        let elapsed = start.elapsed();
        log_runtime(Self::NAME, elapsed, cart.id, products.len());

        Ok(CartAndProductsResponse {
            cart: cart,
            products: products,
            elapsed: elapsed,
        })
    }
}

impl<R: CatalogRepository + 'static> QueryHandler<LoadCartAndProductsQuery, CartAndProductsResponse> for ExhaustChannelQueryHandler<R> {
    async fn handle(&self, input: &LoadCartAndProductsQuery) -> Result<CartAndProductsResponse, FetchError> {
        self.load(input.cart_id).await.inspect_err(|e| log_failure(Self::NAME, input.cart_id, e))
    }
}

/// Spawns one fetch per product, waits on a [`WaitGroup`] until every task
/// has finished, then drains whatever the tasks left in the channel.
///
/// Every task signals the group through a drop guard, so a failed or
/// panicking fetch never leaves the wait hanging. Products come back in
/// arrival order. Any error among the drained results aborts the
/// aggregation, and so does a missing result.
pub struct WaitGroupQueryHandler<R: CatalogRepository> {
    repository: Arc<R>
}

impl<R: CatalogRepository + 'static> WaitGroupQueryHandler<R> {
    pub const NAME: &'static str = "LoadCartAndProductsWaitGroup";

    pub fn new(repository: Arc<R>) -> Self {
        WaitGroupQueryHandler {
            repository: repository
        }
    }

    async fn load(&self, cart_id: u32) -> Result<CartAndProductsResponse, FetchError> {
        let start = Instant::now();

        let cart = self.repository.fetch_cart(cart_id).await?;
        let producer_count = cart.products.len();

        let wait_group = WaitGroup::new();
        // one slot per producer so no send waits on the drain
        let (tx, mut rx) = mpsc::channel::<Result<Product, FetchError>>(producer_count.max(1));
        for cart_product in cart.products.iter() {
            let guard = wait_group.guard();
            let repository = self.repository.clone();
            let tx = tx.clone();
            let product_id = cart_product.product_id;

            tokio::spawn(async move {
                let _guard = guard;
                let result = repository.fetch_product(product_id).await;
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        wait_group.wait().await;
        rx.close();

        let mut products = Vec::with_capacity(producer_count);
        while let Some(result) = rx.recv().await {
            products.push(result?);
        }

        if products.len() != producer_count {
            return Err(FetchError::Task(format!(
                "{} of {} product fetches never reported",
                producer_count - products.len(),
                producer_count
            )));
        }

        let elapsed = start.elapsed();
        log_runtime(Self::NAME, elapsed, cart.id, products.len());

        Ok(CartAndProductsResponse {
            cart: cart,
            products: products,
            elapsed: elapsed,
        })
    }
}

impl<R: CatalogRepository + 'static> QueryHandler<LoadCartAndProductsQuery, CartAndProductsResponse> for WaitGroupQueryHandler<R> {
    async fn handle(&self, input: &LoadCartAndProductsQuery) -> Result<CartAndProductsResponse, FetchError> {
        self.load(input.cart_id).await.inspect_err(|e| log_failure(Self::NAME, input.cart_id, e))
    }
}
