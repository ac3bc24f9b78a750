use std::fmt::Display;

use super::predicate::Predicate;

#[derive(Clone, Debug, PartialEq)]
pub struct Delete {
    pub table: String,
    pub predicate: Predicate,
}

impl Display for Delete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if !self.predicate.is_true() {
            write!(f, " WHERE {}", self.predicate)?;
        }
        Ok(())
    }
}
