use std::{error::Error, sync::Arc};

use config::CatalogConfig;
use cqrs::{LoadCartAndProductsQuery, QueryHandler};
use dotenv::dotenv;
use dtos::CartAndProductsResponse;
use repositories::FakeStoreApiRepository;
use state::AppState;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod config;
mod cqrs;
mod domain;
mod dtos;
mod errors;
mod repositories;
mod state;
mod wait_group;
#[cfg(test)]
mod test_support;

const CART_ID: u32 = 1;

fn init_tracing(config: &CatalogConfig) -> std::io::Result<()> {
    let writer = match &config.log_path {
        Some(path) => BoxMakeWriter::new(Arc::new(std::fs::File::create(path)?)),
        None => BoxMakeWriter::new(std::io::stdout),
    };

    tracing_subscriber::
    fmt()
    .with_max_level(config.log_level)
    .with_target(false)
    .with_ansi(false)
    .json()
    .with_file(true)
    .with_line_number(true)
    .with_current_span(true)
    .with_writer(writer)
    .init();

    Ok(())
}

fn report(response: &CartAndProductsResponse) {
    println!("{} {} in {:?}", response.cart.date, response.products.len(), response.elapsed);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let config = CatalogConfig::from_env();
    init_tracing(&config)?;

    let repository = Arc::new(FakeStoreApiRepository::new(&config));
    let state = AppState::new(repository);
    let query = LoadCartAndProductsQuery { cart_id: CART_ID };

    // any failed fetch ends the run with a non-zero exit
    report(&state.sequential_query_handler.handle(&query).await?);
    report(&state.exhaust_channel_query_handler.handle(&query).await?);
    report(&state.wait_group_query_handler.handle(&query).await?);

    Ok(())
}
