//! Storefront: product and order CRUD over a generic, transactional repository.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod table;

pub use config::{DatabaseSettings, Settings, StorageBackend};
pub use db::{ensure_database_exists, Database};
pub use error::{AppError, ConfigError, ConstraintKind};
pub use migration::{apply_migrations, revert_latest};
pub use pagination::PageRequest;
pub use repository::{MemoryStore, Record, Repository, RepositoryProvider};
pub use response::Page;
pub use routes::app;
pub use service::{OrderService, ProductService};
pub use state::AppState;
