use std::sync::Arc;

use crate::{cqrs::{ExhaustChannelQueryHandler, SequentialQueryHandler, WaitGroupQueryHandler}, repositories::CatalogRepository};

pub struct AppState<R: CatalogRepository + 'static> {
    pub sequential_query_handler: Arc<SequentialQueryHandler<R>>,
    pub exhaust_channel_query_handler: Arc<ExhaustChannelQueryHandler<R>>,
    pub wait_group_query_handler: Arc<WaitGroupQueryHandler<R>>,
}

impl<R: CatalogRepository + 'static> AppState<R> {
    pub fn new(repository: Arc<R>) -> Self {
        AppState {
            sequential_query_handler: Arc::new(SequentialQueryHandler::new(repository.clone())),
            exhaust_channel_query_handler: Arc::new(ExhaustChannelQueryHandler::new(repository.clone())),
            wait_group_query_handler: Arc::new(WaitGroupQueryHandler::new(repository)),
        }
    }
}
