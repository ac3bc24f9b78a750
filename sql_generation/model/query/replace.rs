use std::fmt::Display;

use crate::model::table::{Assignment, SimValue};

/// `REPLACE INTO t SET ...`, with the SET list rendered in a shuffled order.
#[derive(Clone, Debug, PartialEq)]
pub struct Replace {
    pub table: String,
    /// One value per column, in column order.
    pub set_values: Vec<Assignment>,
    /// Render order of `set_values`; a permutation of their indexes.
    pub order: Vec<usize>,
}

impl Replace {
    /// The replaced row in column order.
    pub fn row(&self) -> Vec<SimValue> {
        self.set_values.iter().map(|a| a.value.clone()).collect()
    }
}

impl Display for Replace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "REPLACE INTO {} SET ", self.table)?;
        for (i, &idx) in self.order.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.set_values[idx])?;
        }
        Ok(())
    }
}
