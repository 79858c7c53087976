//! `order` table. The name is a reserved word; the SQL builder always quotes identifiers.

use super::{Column, ColumnDefault, ColumnType, Table};

const T: &str = "order";

pub const ID: Column = Column::new(T, "id", ColumnType::BigInt).primary_key();
pub const CUSTOMER_NAME: Column = Column::new(T, "customer_name", ColumnType::Varchar(255))
    .not_null()
    .indexed();
pub const ADDRESS: Column = Column::new(T, "address", ColumnType::Text).not_null();
pub const CONTENTS: Column = Column::new(T, "contents", ColumnType::Varchar(1024));
pub const CREATED_AT: Column = Column::new(T, "created_at", ColumnType::Timestamp)
    .not_null()
    .default(ColumnDefault::Now);
pub const UPDATED_AT: Column = Column::new(T, "updated_at", ColumnType::Timestamp)
    .not_null()
    .default(ColumnDefault::Now)
    .refresh_on_update();

pub static ORDER: Table = Table {
    name: T,
    primary_key: ID,
    columns: &[ID, CUSTOMER_NAME, ADDRESS, CONTENTS, CREATED_AT, UPDATED_AT],
};
