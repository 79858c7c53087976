//! `product` table.

use super::{Column, ColumnDefault, ColumnType, Table};

const T: &str = "product";

pub const ID: Column = Column::new(T, "id", ColumnType::BigInt).primary_key();
pub const NAME: Column = Column::new(T, "name", ColumnType::Varchar(255)).not_null().indexed();
pub const DESCRIPTION: Column = Column::new(T, "description", ColumnType::Text);
pub const IMAGE: Column = Column::new(T, "image", ColumnType::Varchar(1024));
pub const PRICE: Column = Column::new(T, "price", ColumnType::Numeric { precision: 12, scale: 2 })
    .not_null()
    .indexed();
pub const STOCK: Column = Column::new(T, "stock", ColumnType::Integer)
    .not_null()
    .indexed()
    .default(ColumnDefault::Literal("0"));
pub const CREATED_AT: Column = Column::new(T, "created_at", ColumnType::Timestamp)
    .not_null()
    .default(ColumnDefault::Now);
pub const UPDATED_AT: Column = Column::new(T, "updated_at", ColumnType::Timestamp)
    .not_null()
    .default(ColumnDefault::Now)
    .refresh_on_update();

pub static PRODUCT: Table = Table {
    name: T,
    primary_key: ID,
    columns: &[ID, NAME, DESCRIPTION, IMAGE, PRICE, STOCK, CREATED_AT, UPDATED_AT],
};
