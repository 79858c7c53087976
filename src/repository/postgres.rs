//! PostgreSQL repository: one transaction per handle, statements from the SQL builder.

use super::{Record, Repository};
use crate::error::AppError;
use crate::query::{OrderBy, Predicate, Select};
use crate::sql::{self, PgBindValue, QueryBuf};
use crate::table::{ColumnType, Table};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction};

pub struct PgRepository {
    pool: PgPool,
    table: &'static Table,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgRepository {
    pub fn new(pool: PgPool, table: &'static Table) -> Self {
        PgRepository { pool, table, tx: None }
    }

    /// Connection of the open unit of work, beginning it on first use.
    async fn conn(&mut self) -> Result<&mut PgConnection, AppError> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => {
                tracing::debug!(table = self.table.name, "begin");
                self.pool.begin().await?
            }
        };
        let tx = self.tx.insert(tx);
        Ok(&mut **tx)
    }

    async fn fetch_optional(&mut self, q: &QueryBuf) -> Result<Option<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let table = self.table;
        let conn = self.conn().await?;
        let row = bind_all(q).fetch_optional(conn).await?;
        row.map(|r| row_to_record(table, &r)).transpose()
    }

    async fn fetch_all(&mut self, q: &QueryBuf) -> Result<Vec<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let table = self.table;
        let conn = self.conn().await?;
        let rows = bind_all(q).fetch_all(conn).await?;
        rows.iter().map(|r| row_to_record(table, r)).collect()
    }

    async fn execute(&mut self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let conn = self.conn().await?;
        let done = bind_all(q).execute(conn).await?;
        Ok(done.rows_affected())
    }
}

#[async_trait]
impl Repository for PgRepository {
    fn table(&self) -> &'static Table {
        self.table
    }

    async fn insert(&mut self, data: &Record) -> Result<Record, AppError> {
        let q = sql::insert(self.table, data);
        self.fetch_optional(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&mut self, id: i64, data: &Record) -> Result<Option<Record>, AppError> {
        let q = sql::update(self.table, id, data);
        self.fetch_optional(&q).await
    }

    async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let q = sql::delete(self.table, id);
        let removed = self.execute(&q).await?;
        tracing::debug!(table = self.table.name, id, removed, "delete");
        Ok(())
    }

    async fn get_one(&mut self, id: i64) -> Result<Option<Record>, AppError> {
        let q = sql::select_by_id(self.table, id);
        self.fetch_optional(&q).await
    }

    async fn paginate(
        &mut self,
        select: &Select,
        filters: &[Predicate],
        ordering: &[OrderBy],
        offset: u64,
        size: u64,
    ) -> Result<Vec<Record>, AppError> {
        select.check(self.table, filters, ordering)?;
        let q = sql::select_page(select, filters, ordering, offset, size);
        self.fetch_all(&q).await
    }

    async fn get_count(&mut self, select: &Select, filters: &[Predicate]) -> Result<u64, AppError> {
        select.check(self.table, filters, &[])?;
        let q = sql::select_count(select, filters);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let conn = self.conn().await?;
        let row = bind_all(&q).fetch_one(conn).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        // A failed COMMIT leaves the transaction open; dropping it rolls back.
        tx.commit().await.map_err(|e| {
            tracing::error!(table = self.table.name, error = %e, "commit failed, transaction rolled back");
            AppError::TransactionFailure(e)
        })?;
        tracing::debug!(table = self.table.name, "commit");
        Ok(())
    }
}

fn bind_all(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from_json(p));
    }
    query
}

/// Decode a row selected with the table's full column list.
fn row_to_record(table: &Table, row: &PgRow) -> Result<Record, AppError> {
    let mut map = Record::new();
    for c in table.columns {
        let name = c.name;
        let v = match c.column_type {
            ColumnType::BigInt => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
            ColumnType::Integer => row.try_get::<Option<i32>, _>(name)?.map(Value::from),
            ColumnType::Numeric { .. } | ColumnType::Varchar(_) | ColumnType::Text => {
                row.try_get::<Option<String>, _>(name)?.map(Value::String)
            }
            ColumnType::Timestamp => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)?
                .map(|d| Value::String(d.to_rfc3339())),
        };
        map.insert(name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(map)
}
