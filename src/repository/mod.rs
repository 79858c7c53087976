//! Repository: CRUD, pagination and counting over one table, one unit of work per handle.

mod memory;
mod postgres;
mod values;

pub use memory::{MemoryRepository, MemoryStore};
pub use postgres::PgRepository;
pub use values::{coerce, compare};

use crate::error::AppError;
use crate::query::{OrderBy, Predicate, Select};
use crate::table::Table;
use async_trait::async_trait;

/// One row: column name to value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Persistence over a single table.
///
/// A handle opens its transaction on first use and every call runs inside it. Writes become
/// visible to other handles only after [`Repository::commit`]; dropping a handle without
/// committing discards them. Methods take `&mut self`, so a handle never has two operations
/// in flight.
#[async_trait]
pub trait Repository: Send {
    /// Table this handle is bound to.
    fn table(&self) -> &'static Table;

    /// Insert a row (no primary key in `data`). Returns the stored row with server-assigned values.
    async fn insert(&mut self, data: &Record) -> Result<Record, AppError>;

    /// Overwrite the columns present in `data`. `None` when no row has this id.
    async fn update(&mut self, id: i64, data: &Record) -> Result<Option<Record>, AppError>;

    /// Remove the row; absent ids are not an error.
    async fn delete(&mut self, id: i64) -> Result<(), AppError>;

    async fn get_one(&mut self, id: i64) -> Result<Option<Record>, AppError>;

    /// Rows matching `select` AND `filters`, ordered, then `offset`/`size` applied.
    async fn paginate(
        &mut self,
        select: &Select,
        filters: &[Predicate],
        ordering: &[OrderBy],
        offset: u64,
        size: u64,
    ) -> Result<Vec<Record>, AppError>;

    /// Number of rows `paginate` would see before offset/limit.
    async fn get_count(&mut self, select: &Select, filters: &[Predicate]) -> Result<u64, AppError>;

    /// Finalize the unit of work. Failures are returned as [`AppError::TransactionFailure`].
    async fn commit(&mut self) -> Result<(), AppError>;
}

/// Hands out request-scoped repositories and answers readiness checks.
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    fn repository(&self, table: &'static Table) -> Box<dyn Repository>;

    async fn ping(&self) -> Result<(), AppError>;
}
