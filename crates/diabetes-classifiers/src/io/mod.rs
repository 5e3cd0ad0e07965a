pub mod table;

pub use table::{load_table, Column, ColumnData, Table};
