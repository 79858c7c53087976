//! Static table mappings: column names, SQL types, nullability, defaults and indexes.
//! Column handles are also the references used to build filters and orderings.

pub mod order;
pub mod product;

pub use order::ORDER;
pub use product::PRODUCT;

/// SQL type of a column. Drives DDL, parameter casts, row decoding and in-memory coercion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Integer,
    Numeric { precision: u32, scale: u32 },
    Varchar(u32),
    Text,
    Timestamp,
}

impl ColumnType {
    /// Type as written in CREATE TABLE.
    pub fn ddl(&self) -> String {
        match self {
            ColumnType::BigInt => "BIGINT".into(),
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::Numeric { precision, scale } => format!("NUMERIC({}, {})", precision, scale),
            ColumnType::Varchar(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "TEXT".into(),
            ColumnType::Timestamp => "TIMESTAMPTZ".into(),
        }
    }

    /// Cast applied to bound parameters (all values are sent as text).
    pub fn cast(&self) -> &'static str {
        match self {
            ColumnType::BigInt => "bigint",
            ColumnType::Integer => "integer",
            ColumnType::Numeric { .. } => "numeric",
            ColumnType::Varchar(_) => "varchar",
            ColumnType::Text => "text",
            ColumnType::Timestamp => "timestamptz",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnDefault {
    /// SQL literal, e.g. `0`.
    Literal(&'static str),
    /// `CURRENT_TIMESTAMP`.
    Now,
    /// Identity column; the store assigns the value.
    Identity,
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub table: &'static str,
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    pub primary_key: bool,
    pub indexed: bool,
    /// Set to the current time by every UPDATE.
    pub refresh_on_update: bool,
}

impl Column {
    pub const fn new(table: &'static str, name: &'static str, column_type: ColumnType) -> Self {
        Column {
            table,
            name,
            column_type,
            nullable: true,
            default: None,
            primary_key: false,
            indexed: false,
            refresh_on_update: false,
        }
    }

    pub const fn primary_key(self) -> Self {
        Column {
            nullable: false,
            default: Some(ColumnDefault::Identity),
            primary_key: true,
            ..self
        }
    }

    pub const fn not_null(self) -> Self {
        Column { nullable: false, ..self }
    }

    pub const fn indexed(self) -> Self {
        Column { indexed: true, ..self }
    }

    pub const fn default(self, default: ColumnDefault) -> Self {
        Column {
            default: Some(default),
            ..self
        }
    }

    pub const fn refresh_on_update(self) -> Self {
        Column {
            refresh_on_update: true,
            ..self
        }
    }
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: Column,
    pub columns: &'static [Column],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True when `column` was declared on this table.
    pub fn owns(&self, column: &Column) -> bool {
        column.table == self.name && self.column(column.name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_mapping_matches_schema() {
        let price = PRODUCT.column("price").expect("price column");
        assert_eq!(price.column_type.ddl(), "NUMERIC(12, 2)");
        assert!(!price.nullable);
        assert!(price.indexed);

        let stock = PRODUCT.column("stock").expect("stock column");
        assert_eq!(stock.default, Some(ColumnDefault::Literal("0")));
        assert_eq!(PRODUCT.primary_key.name, "id");
        assert_eq!(PRODUCT.primary_key.default, Some(ColumnDefault::Identity));
    }

    #[test]
    fn columns_belong_to_their_table() {
        assert!(PRODUCT.owns(&product::PRICE));
        assert!(!ORDER.owns(&product::PRICE));
        assert!(ORDER.owns(&order::CUSTOMER_NAME));
    }
}
