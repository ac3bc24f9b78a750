use std::fmt::Display;
use std::sync::Arc;

pub use delete::Delete;
pub use insert::Insert;
pub use predicate::Predicate;
pub use replace::Replace;
pub use transaction::{Begin, Commit};
pub use update::Update;

use crate::error::Result;
use crate::model::table::Table;
use crate::model::Shadow;

pub mod delete;
pub mod insert;
pub mod predicate;
pub mod replace;
pub mod transaction;
pub mod update;

/// The DML statements a workload issues; each variant carries only what its shadow effect needs.
#[derive(Debug, Clone, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(StatementKind), derive(Hash, strum::Display))]
pub enum Statement {
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Replace(Replace),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        StatementKind::from(self)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insert(insert) => write!(f, "{insert}"),
            Self::Update(update) => write!(f, "{update}"),
            Self::Delete(delete) => write!(f, "{delete}"),
            Self::Replace(replace) => write!(f, "{replace}"),
        }
    }
}

impl Shadow for Insert {
    type Result = Result<usize>;

    fn shadow(&self, table: &Table) -> Self::Result {
        table.append(self.rows())
    }
}

impl Shadow for Update {
    type Result = Result<usize>;

    fn shadow(&self, table: &Table) -> Self::Result {
        Ok(table.apply_update(&self.set_values, &self.predicate))
    }
}

impl Shadow for Delete {
    type Result = Result<usize>;

    fn shadow(&self, table: &Table) -> Self::Result {
        Ok(table.apply_delete(&self.predicate))
    }
}

impl Shadow for Replace {
    type Result = Result<usize>;

    // Mirrored as a plain append; rows the server replaced are not looked up.
    fn shadow(&self, table: &Table) -> Self::Result {
        table.append(&[self.row()])
    }
}

impl Shadow for Statement {
    type Result = Result<usize>;

    fn shadow(&self, table: &Table) -> Self::Result {
        match self {
            Statement::Insert(insert) => insert.shadow(table),
            Statement::Update(update) => update.shadow(table),
            Statement::Delete(delete) => delete.shadow(table),
            Statement::Replace(replace) => replace.shadow(table),
        }
    }
}

/// One generated unit of work: a statement, its SQL text and the table it targets.
#[derive(Debug, Clone)]
pub struct DmlTask {
    pub table: Arc<Table>,
    pub statement: Statement,
    pub sql: String,
}

impl DmlTask {
    pub fn new(table: Arc<Table>, statement: Statement) -> Self {
        let sql = statement.to_string();
        Self {
            table,
            statement,
            sql,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.statement.kind()
    }

    /// Mirror the statement's effect into the shadow table. Only call after a successful commit.
    pub fn apply_to_shadow(&self) -> Result<usize> {
        self.statement.shadow(&self.table)
    }
}
