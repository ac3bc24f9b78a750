use std::fmt::Display;
use std::sync::Arc;

use crate::model::column::Column;
use crate::model::table::{sql_literal, SimValue};

/// `INSERT [IGNORE] INTO t (cols...) VALUES (...), ...`
#[derive(Clone, Debug, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<Arc<Column>>,
    /// One tuple per row, each in column order.
    pub values: Vec<Vec<SimValue>>,
    /// Duplicate keys are skipped by the server instead of failing the statement.
    pub ignore: bool,
}

impl Insert {
    pub fn rows(&self) -> &[Vec<SimValue>] {
        &self.values
    }
}

impl Display for Insert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ignore = if self.ignore { " IGNORE" } else { "" };
        write!(f, "INSERT{ignore} INTO {} (", self.table)?;
        for (i, col) in self.columns.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "`{}`", col.name)?;
        }
        write!(f, ") VALUES ")?;
        for (i, row) in self.values.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "(")?;
            for (j, (col, value)) in self.columns.iter().zip(row).enumerate() {
                if j != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", sql_literal(col.kind, value))?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
