use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown column type `{ty}` of column `{column}`")]
    UnknownColumnType { column: String, ty: String },

    #[error("table `{db}`.`{table}` has no columns")]
    EmptySchema { db: String, table: String },

    #[error("row has {actual} values, table has {expected} columns")]
    RowWidthMismatch { expected: usize, actual: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
