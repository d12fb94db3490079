//! Shared application state for all routes.

use crate::service::{AuthorService, BookService};
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub authors: AuthorService,
    pub books: BookService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            authors: AuthorService::new(store.clone()),
            books: BookService::new(store.clone()),
            store,
        }
    }
}
