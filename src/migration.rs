//! Versioned schema migrations generated from the table mappings.
//! Each migration creates (up) or drops (down) one table; applied versions live in `_schema_migrations`.

use crate::error::AppError;
use crate::sql::quoted;
use crate::table::{ColumnDefault, Table, ORDER, PRODUCT};
use sqlx::PgPool;

const HISTORY_TABLE: &str = "_schema_migrations";

#[derive(Debug)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub table: &'static Table,
}

/// Ordered by version; later tables may reference earlier ones.
pub static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create product",
        table: &PRODUCT,
    },
    Migration {
        version: 2,
        name: "create order",
        table: &ORDER,
    },
];

impl Migration {
    pub fn up(&self) -> Vec<String> {
        let mut statements = vec![create_table_sql(self.table)];
        statements.extend(create_index_sql(self.table));
        statements
    }

    pub fn down(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quoted(self.table.name))
    }
}

pub fn create_table_sql(table: &Table) -> String {
    let defs: Vec<String> = table
        .columns
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quoted(c.name), c.column_type.ddl());
            match c.default {
                Some(ColumnDefault::Identity) => def.push_str(" GENERATED BY DEFAULT AS IDENTITY"),
                Some(ColumnDefault::Literal(lit)) => {
                    def.push_str(" DEFAULT ");
                    def.push_str(lit);
                }
                Some(ColumnDefault::Now) => def.push_str(" DEFAULT NOW()"),
                None => {}
            }
            if c.primary_key {
                def.push_str(" PRIMARY KEY");
            } else if !c.nullable {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {} ({})", quoted(table.name), defs.join(", "))
}

pub fn create_index_sql(table: &Table) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| c.indexed && !c.primary_key)
        .map(|c| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quoted(&format!("ix_{}_{}", table.name, c.name)),
                quoted(table.name),
                quoted(c.name)
            )
        })
        .collect()
}

async fn ensure_history_table(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {} (version BIGINT PRIMARY KEY, name TEXT NOT NULL, applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW())",
        quoted(HISTORY_TABLE)
    ))
    .execute(pool)
    .await?;
    Ok(())
}

async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>, AppError> {
    let versions = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT version FROM {} ORDER BY version",
        quoted(HISTORY_TABLE)
    ))
    .fetch_all(pool)
    .await?;
    Ok(versions)
}

/// Apply every pending migration in version order, one transaction each. Returns the versions applied.
pub async fn apply_migrations(pool: &PgPool) -> Result<Vec<i64>, AppError> {
    ensure_history_table(pool).await?;
    let done = applied_versions(pool).await?;
    let mut applied = Vec::new();
    for m in MIGRATIONS.iter().filter(|m| !done.contains(&m.version)) {
        let mut tx = pool.begin().await?;
        for statement in m.up() {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        sqlx::query(&format!(
            "INSERT INTO {} (version, name) VALUES ($1, $2)",
            quoted(HISTORY_TABLE)
        ))
        .bind(m.version)
        .bind(m.name)
        .execute(&mut *tx)
        .await?;
        tx.commit().await.map_err(AppError::TransactionFailure)?;
        tracing::info!(version = m.version, name = m.name, "migration applied");
        applied.push(m.version);
    }
    if applied.is_empty() {
        tracing::info!("schema up to date");
    }
    Ok(applied)
}

/// Revert the most recently applied migration. `None` when nothing is applied.
pub async fn revert_latest(pool: &PgPool) -> Result<Option<i64>, AppError> {
    ensure_history_table(pool).await?;
    let Some(latest) = applied_versions(pool).await?.last().copied() else {
        tracing::info!("no migrations to revert");
        return Ok(None);
    };
    let m = MIGRATIONS
        .iter()
        .find(|m| m.version == latest)
        .ok_or_else(|| AppError::BadRequest(format!("unknown migration version {}", latest)))?;
    let mut tx = pool.begin().await?;
    sqlx::query(&m.down()).execute(&mut *tx).await?;
    sqlx::query(&format!("DELETE FROM {} WHERE version = $1", quoted(HISTORY_TABLE)))
        .bind(m.version)
        .execute(&mut *tx)
        .await?;
    tx.commit().await.map_err(AppError::TransactionFailure)?;
    tracing::info!(version = m.version, name = m.name, "migration reverted");
    Ok(Some(m.version))
}
