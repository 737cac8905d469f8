use std::sync::Arc;

use crate::providers::RunFetcher;
use crate::registry::RepositoryStore;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn RepositoryStore>,
    pub fetcher: Arc<dyn RunFetcher>,
}

impl AppState {
    pub fn new(registry: Arc<dyn RepositoryStore>, fetcher: Arc<dyn RunFetcher>) -> Self {
        Self { registry, fetcher }
    }
}
