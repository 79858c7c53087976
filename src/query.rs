//! Query vocabulary shared by every repository: a base select, filter predicates and orderings,
//! all built from column handles so callers never write SQL.

use crate::error::AppError;
use crate::table::{Column, Table};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Whether `lhs op rhs` holds given `lhs.cmp(rhs)`.
    pub fn holds(&self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

/// Boolean condition on one column. A list of predicates is always ANDed.
#[derive(Clone, Debug)]
pub enum Predicate {
    Compare { column: Column, op: CompareOp, value: Value },
    IsNull(Column),
    IsNotNull(Column),
    /// Case-insensitive substring match.
    Contains { column: Column, needle: String },
}

impl Predicate {
    pub fn column(&self) -> &Column {
        match self {
            Predicate::Compare { column, .. }
            | Predicate::IsNull(column)
            | Predicate::IsNotNull(column)
            | Predicate::Contains { column, .. } => column,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug)]
pub struct OrderBy {
    pub column: Column,
    pub direction: Direction,
}

impl Column {
    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Predicate {
        Predicate::Compare {
            column: self,
            op,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Predicate {
        self.compare(CompareOp::Ge, value)
    }

    pub fn is_null(self) -> Predicate {
        Predicate::IsNull(self)
    }

    pub fn is_not_null(self) -> Predicate {
        Predicate::IsNotNull(self)
    }

    pub fn contains(self, needle: impl Into<String>) -> Predicate {
        Predicate::Contains {
            column: self,
            needle: needle.into(),
        }
    }

    pub fn asc(self) -> OrderBy {
        OrderBy {
            column: self,
            direction: Direction::Asc,
        }
    }

    pub fn desc(self) -> OrderBy {
        OrderBy {
            column: self,
            direction: Direction::Desc,
        }
    }
}

/// Base query: every row of one table, optionally narrowed by its own predicates.
#[derive(Clone, Debug)]
pub struct Select {
    pub table: &'static Table,
    pub predicates: Vec<Predicate>,
}

impl Select {
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Base predicates followed by caller filters.
    pub fn all_predicates<'a>(&'a self, filters: &'a [Predicate]) -> impl Iterator<Item = &'a Predicate> {
        self.predicates.iter().chain(filters.iter())
    }

    /// Rejects predicates and orderings on columns of another table.
    pub fn check(&self, table: &Table, filters: &[Predicate], ordering: &[OrderBy]) -> Result<(), AppError> {
        if self.table.name != table.name {
            return Err(AppError::BadRequest(format!(
                "query on '{}' passed to repository of '{}'",
                self.table.name, table.name
            )));
        }
        let foreign = self
            .all_predicates(filters)
            .map(Predicate::column)
            .chain(ordering.iter().map(|o| &o.column))
            .find(|c| !table.owns(c));
        match foreign {
            Some(c) => Err(AppError::BadRequest(format!(
                "column {}.{} is not part of '{}'",
                c.table, c.name, table.name
            ))),
            None => Ok(()),
        }
    }
}

impl Table {
    pub fn select(&'static self) -> Select {
        Select {
            table: self,
            predicates: Vec::new(),
        }
    }
}

/// Parse `ordering=-price,name` against the columns a listing allows.
pub fn parse_ordering(spec: &str, allowed: &[Column]) -> Result<Vec<OrderBy>, AppError> {
    let mut out = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, direction) = match part.strip_prefix('-') {
            Some(rest) => (rest, Direction::Desc),
            None => (part, Direction::Asc),
        };
        let column = allowed
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AppError::Validation(format!("cannot order by '{}'", name)))?;
        out.push(OrderBy {
            column: *column,
            direction,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{order, product, PRODUCT};

    #[test]
    fn compare_ops_follow_ordering() {
        assert!(CompareOp::Lt.holds(Ordering::Less));
        assert!(!CompareOp::Lt.holds(Ordering::Equal));
        assert!(CompareOp::Le.holds(Ordering::Equal));
        assert!(CompareOp::Ne.holds(Ordering::Greater));
        assert!(CompareOp::Ge.holds(Ordering::Greater));
    }

    #[test]
    fn ordering_spec_parses_direction() {
        let parsed = parse_ordering("-price, name", &[product::PRICE, product::NAME]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].column.name, "price");
        assert_eq!(parsed[0].direction, Direction::Desc);
        assert_eq!(parsed[1].direction, Direction::Asc);
    }

    #[test]
    fn ordering_spec_rejects_unlisted_columns() {
        let err = parse_ordering("description", &[product::PRICE]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn check_rejects_foreign_columns() {
        let select = PRODUCT.select();
        assert!(select.check(&PRODUCT, &[product::STOCK.gt(1)], &[]).is_ok());
        assert!(select
            .check(&PRODUCT, &[order::CUSTOMER_NAME.eq("x")], &[])
            .is_err());
        assert!(select.check(&PRODUCT, &[], &[order::ID.asc()]).is_err());
    }
}
