//! Books API: author and book catalogue over PostgreSQL, served with axum.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod query;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{Settings, StoreKind};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use model::{Author, Book};
pub use routes::app;
pub use service::{AuthorService, BookService};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};
