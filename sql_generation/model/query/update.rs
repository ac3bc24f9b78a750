use std::fmt::Display;

use crate::model::table::Assignment;

use super::predicate::Predicate;

#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub table: String,
    pub set_values: Vec<Assignment>, // SET name=value, in column order
    pub predicate: Predicate,
}

impl Display for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UPDATE {} SET ", self.table)?;
        for (i, assign) in self.set_values.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{assign}")?;
        }
        if !self.predicate.is_true() {
            write!(f, " WHERE {}", self.predicate)?;
        }
        Ok(())
    }
}
