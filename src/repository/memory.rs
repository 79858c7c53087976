//! In-memory store with the same unit-of-work visibility as the PostgreSQL repository.
//! A handle reads the committed rows overlaid with its own pending changes; commit applies
//! only those changes, row by row, under the store lock. Ids come from a shared per-table
//! counter at insert time and are never reused, even when the inserting handle rolls back.

use super::values::{coerce, compare};
use super::{Record, Repository, RepositoryProvider};
use crate::error::{AppError, ConstraintKind};
use crate::query::{Direction, OrderBy, Predicate, Select};
use crate::table::{Column, ColumnDefault, Table};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryTable {
    rows: BTreeMap<i64, Record>,
    last_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<&'static str, MemoryTable>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, MemoryTable>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Next id of `table`'s sequence.
    fn next_id(&self, table: &Table) -> i64 {
        let mut tables = self.lock();
        let t = tables.entry(table.name).or_default();
        t.last_id += 1;
        t.last_id
    }

    /// Committed row, if any.
    fn committed(&self, table: &Table, id: i64) -> Option<Record> {
        self.lock().get(table.name).and_then(|t| t.rows.get(&id).cloned())
    }

    /// Committed rows overlaid with `pending`, in id order.
    fn visible_rows(&self, table: &Table, pending: &BTreeMap<i64, Change>) -> Vec<Record> {
        let tables = self.lock();
        let empty = BTreeMap::new();
        let committed = tables.get(table.name).map(|t| &t.rows).unwrap_or(&empty);
        let ids: BTreeSet<i64> = committed.keys().chain(pending.keys()).copied().collect();
        ids.into_iter()
            .filter_map(|id| overlay(committed.get(&id), pending.get(&id)))
            .collect()
    }

    fn apply(&self, table: &Table, pending: BTreeMap<i64, Change>) {
        let mut tables = self.lock();
        let rows = &mut tables.entry(table.name).or_default().rows;
        for (id, change) in pending {
            match change {
                Change::Put(row) => {
                    rows.insert(id, row);
                }
                // Rows deleted by a unit of work committed meanwhile stay deleted.
                Change::Patch(columns) => {
                    if let Some(row) = rows.get_mut(&id) {
                        row.extend(columns);
                    }
                }
                Change::Delete => {
                    rows.remove(&id);
                }
            }
        }
    }

    /// Committed row count of `table`.
    pub fn len(&self, table: &Table) -> usize {
        self.lock().get(table.name).map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, table: &Table) -> bool {
        self.len(table) == 0
    }
}

#[async_trait]
impl RepositoryProvider for MemoryStore {
    fn repository(&self, table: &'static Table) -> Box<dyn Repository> {
        Box::new(MemoryRepository::new(self.clone(), table))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Pending change to one row.
#[derive(Clone, Debug)]
enum Change {
    /// Row inserted by this unit of work.
    Put(Record),
    /// Columns overwritten on a committed row.
    Patch(Record),
    Delete,
}

fn overlay(committed: Option<&Record>, change: Option<&Change>) -> Option<Record> {
    match change {
        None => committed.cloned(),
        Some(Change::Put(row)) => Some(row.clone()),
        Some(Change::Patch(columns)) => committed.map(|row| {
            let mut row = row.clone();
            row.extend(columns.clone());
            row
        }),
        Some(Change::Delete) => None,
    }
}

pub struct MemoryRepository {
    store: MemoryStore,
    table: &'static Table,
    pending: BTreeMap<i64, Change>,
}

impl MemoryRepository {
    pub fn new(store: MemoryStore, table: &'static Table) -> Self {
        MemoryRepository {
            store,
            table,
            pending: BTreeMap::new(),
        }
    }

    fn visible(&self, id: i64) -> Option<Record> {
        let committed = match self.pending.get(&id) {
            Some(Change::Put(_)) | Some(Change::Delete) => None,
            _ => self.store.committed(self.table, id),
        };
        overlay(committed.as_ref(), self.pending.get(&id))
    }

    fn matching(&self, select: &Select, filters: &[Predicate]) -> Result<Vec<Record>, AppError> {
        let predicates: Vec<&Predicate> = select.all_predicates(filters).collect();
        let mut out = Vec::new();
        for row in self.store.visible_rows(self.table, &self.pending) {
            if matches_all(&row, &predicates)? {
                out.push(row);
            }
        }
        Ok(out)
    }
}

fn now() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

fn default_value(column: &Column) -> Result<Value, AppError> {
    match column.default {
        Some(ColumnDefault::Literal(lit)) => coerce(column, &Value::String(lit.to_string())),
        Some(ColumnDefault::Now) => Ok(now()),
        Some(ColumnDefault::Identity) | None => Ok(Value::Null),
    }
}

fn not_null(column: &Column, v: &Value) -> Result<(), AppError> {
    if v.is_null() && !column.nullable {
        return Err(AppError::constraint(
            ConstraintKind::NotNull,
            format!("null value in column \"{}\" of relation \"{}\"", column.name, column.table),
        ));
    }
    Ok(())
}

fn field<'a>(row: &'a Record, column: &Column) -> &'a Value {
    row.get(column.name).unwrap_or(&Value::Null)
}

fn matches(row: &Record, predicate: &Predicate) -> Result<bool, AppError> {
    Ok(match predicate {
        Predicate::Compare { column, op, value } => {
            let rhs = coerce(column, value)?;
            compare(column, field(row, column), &rhs)
                .map(|ord| op.holds(ord))
                .unwrap_or(false)
        }
        Predicate::IsNull(column) => field(row, column).is_null(),
        Predicate::IsNotNull(column) => !field(row, column).is_null(),
        Predicate::Contains { column, needle } => match field(row, column) {
            Value::Null => false,
            Value::String(s) => s.to_lowercase().contains(&needle.to_lowercase()),
            other => other.to_string().to_lowercase().contains(&needle.to_lowercase()),
        },
    })
}

fn matches_all(row: &Record, predicates: &[&Predicate]) -> Result<bool, AppError> {
    for p in predicates {
        if !matches(row, p)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// NULLs sort last ascending and first descending.
fn order_rows(rows: &mut [Record], ordering: &[OrderBy]) {
    rows.sort_by(|a, b| {
        for o in ordering {
            let (x, y) = (field(a, &o.column), field(b, &o.column));
            let ord = match (x.is_null(), y.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => compare(&o.column, x, y).unwrap_or(Ordering::Equal),
            };
            let ord = match o.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl Repository for MemoryRepository {
    fn table(&self) -> &'static Table {
        self.table
    }

    async fn insert(&mut self, data: &Record) -> Result<Record, AppError> {
        let table = self.table;
        let mut row = Record::new();
        for c in table.columns.iter().filter(|c| !c.primary_key) {
            let v = match data.get(c.name) {
                Some(v) => coerce(c, v)?,
                None => default_value(c)?,
            };
            not_null(c, &v)?;
            row.insert(c.name.to_string(), v);
        }
        let id = self.store.next_id(table);
        row.insert(table.primary_key.name.to_string(), Value::from(id));
        self.pending.insert(id, Change::Put(row.clone()));
        tracing::debug!(table = table.name, id, "insert");
        Ok(reorder(table, row))
    }

    async fn update(&mut self, id: i64, data: &Record) -> Result<Option<Record>, AppError> {
        let table = self.table;
        let mut changes = Record::new();
        for c in table.columns.iter().filter(|c| !c.primary_key) {
            if let Some(v) = data.get(c.name) {
                let v = coerce(c, v)?;
                not_null(c, &v)?;
                changes.insert(c.name.to_string(), v);
            } else if c.refresh_on_update {
                changes.insert(c.name.to_string(), now());
            }
        }
        if self.visible(id).is_none() {
            return Ok(None);
        }
        match self.pending.get_mut(&id) {
            Some(Change::Put(row)) | Some(Change::Patch(row)) => row.extend(changes),
            _ => {
                self.pending.insert(id, Change::Patch(changes));
            }
        }
        tracing::debug!(table = table.name, id, "update");
        Ok(self.visible(id).map(|r| reorder(table, r)))
    }

    async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let removed = self.visible(id).is_some();
        if removed {
            match self.pending.get(&id) {
                // Never committed: forgetting it is enough.
                Some(Change::Put(_)) => {
                    self.pending.remove(&id);
                }
                _ => {
                    self.pending.insert(id, Change::Delete);
                }
            }
        }
        tracing::debug!(table = self.table.name, id, removed, "delete");
        Ok(())
    }

    async fn get_one(&mut self, id: i64) -> Result<Option<Record>, AppError> {
        Ok(self.visible(id).map(|r| reorder(self.table, r)))
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
        let mut rows = self.matching(select, filters)?;
        order_rows(&mut rows, ordering);
        let table = self.table;
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(size as usize)
            .map(|r| reorder(table, r))
            .collect())
    }

    async fn get_count(&mut self, select: &Select, filters: &[Predicate]) -> Result<u64, AppError> {
        select.check(self.table, filters, &[])?;
        Ok(self.matching(select, filters)?.len() as u64)
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.pending);
        let changes = pending.len();
        self.store.apply(self.table, pending);
        tracing::debug!(table = self.table.name, changes, "commit");
        Ok(())
    }
}

/// Key order of the table's column list, as a SELECT would return it.
fn reorder(table: &Table, mut row: Record) -> Record {
    let mut out = Record::new();
    for c in table.columns {
        out.insert(c.name.to_string(), row.remove(c.name).unwrap_or(Value::Null));
    }
    out
}
