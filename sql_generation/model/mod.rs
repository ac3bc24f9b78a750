use crate::model::table::Table;

pub mod column;
pub mod query;
pub mod table;

/// Applies a statement's effect to the local mirror of the table.
pub trait Shadow {
    type Result;

    fn shadow(&self, table: &Table) -> Self::Result;
}
