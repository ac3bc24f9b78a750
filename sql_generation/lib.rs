pub mod error;
pub mod generation;
pub mod model;

pub use error::{Error, Result};
pub use generation::query::DmlKind;
pub use generation::ArbitraryFrom;
pub use model::column::{Column, ColumnKind};
pub use model::query::{DmlTask, Statement, StatementKind};
pub use model::table::{SchemaColumn, SimValue, Table};
