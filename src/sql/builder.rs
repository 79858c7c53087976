//! Builds parameterized INSERT, SELECT, UPDATE, DELETE and COUNT statements from a table mapping.

use crate::query::{Direction, OrderBy, Predicate, Select};
use crate::repository::Record;
use crate::table::{Column, ColumnType, Table};
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from table mappings).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Binds `v` and returns its placeholder cast to the column's type.
    fn placeholder(&mut self, column: &Column, v: Value) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, column.column_type.cast())
    }
}

/// SELECT list in table order. Numeric comes back as text so it survives JSON without float rounding.
fn select_column_list(table: &Table) -> String {
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(c.name);
            match c.column_type {
                ColumnType::Numeric { .. } => format!("{}::text AS {}", q, q),
                _ => q,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `%`, `_` and the escape character itself are literal inside a contains needle.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn where_clause<'a>(q: &mut QueryBuf, predicates: impl Iterator<Item = &'a Predicate>) -> String {
    let mut parts = Vec::new();
    for p in predicates {
        let part = match p {
            Predicate::Compare { column, op, value } => {
                let ph = q.placeholder(column, value.clone());
                format!("{} {} {}", quoted(column.name), op.sql(), ph)
            }
            Predicate::IsNull(column) => format!("{} IS NULL", quoted(column.name)),
            Predicate::IsNotNull(column) => format!("{} IS NOT NULL", quoted(column.name)),
            Predicate::Contains { column, needle } => {
                let n = q.push_param(Value::String(like_pattern(needle)));
                format!("{}::text ILIKE ${}::text", quoted(column.name), n)
            }
        };
        parts.push(part);
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

fn order_clause(ordering: &[OrderBy]) -> String {
    if ordering.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = ordering
        .iter()
        .map(|o| {
            let dir = match o.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("{} {}", quoted(o.column.name), dir)
        })
        .collect();
    format!(" ORDER BY {}", parts.join(", "))
}

/// SELECT by primary key.
pub fn select_by_id(table: &Table, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(&table.primary_key, Value::from(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(table),
        quoted(table.name),
        quoted(table.primary_key.name),
        ph
    );
    q
}

/// SELECT page: base predicates AND filters, ordering, then OFFSET/LIMIT.
pub fn select_page(
    select: &Select,
    filters: &[Predicate],
    ordering: &[OrderBy],
    offset: u64,
    limit: u64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = select.table;
    let where_sql = where_clause(&mut q, select.all_predicates(filters));
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(table),
        quoted(table.name),
        where_sql,
        order_clause(ordering),
        limit,
        offset
    );
    q
}

/// COUNT(*) under exactly the predicates `select_page` would render.
pub fn select_count(select: &Select, filters: &[Predicate]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, select.all_predicates(filters));
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(select.table.name), where_sql);
    q
}

/// INSERT the columns present in `data`; absent columns take their DB default (or NULL).
/// The primary key is never inserted and keys that are not columns are ignored.
pub fn insert(table: &Table, data: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.columns.iter().filter(|c| !c.primary_key) {
        let Some(val) = data.get(c.name) else { continue };
        placeholders.push(q.placeholder(c, val.clone()));
        cols.push(quoted(c.name));
    }
    let returning = select_column_list(table);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(table.name), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(table.name),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only columns present in `data`, plus refresh-on-update columns.
pub fn update(table: &Table, id: i64, data: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in table.columns.iter().filter(|c| !c.primary_key) {
        if let Some(v) = data.get(c.name) {
            let ph = q.placeholder(c, v.clone());
            sets.push(format!("{} = {}", quoted(c.name), ph));
        } else if c.refresh_on_update {
            sets.push(format!("{} = NOW()", quoted(c.name)));
        }
    }
    let returning = select_column_list(table);
    if sets.is_empty() {
        let ph = q.placeholder(&table.primary_key, Value::from(id));
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = {}",
            returning,
            quoted(table.name),
            quoted(table.primary_key.name),
            ph
        );
        return q;
    }
    let id_ph = q.placeholder(&table.primary_key, Value::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        sets.join(", "),
        quoted(table.primary_key.name),
        id_ph,
        returning
    );
    q
}

/// DELETE by id.
pub fn delete(table: &Table, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.placeholder(&table.primary_key, Value::from(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(table.name),
        quoted(table.primary_key.name),
        ph
    );
    q
}
