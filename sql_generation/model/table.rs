use std::{fmt::Display, sync::Arc};

use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::column::{Column, ColumnKind};
use crate::model::query::predicate::Predicate;

/// A generated (or mirrored) cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    /// Decimals, strings, bit strings and temporal values, in their SQL text form.
    Text(String),
}

impl SimValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SimValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SimValue::Int(v) => Some(*v as f64),
            SimValue::UInt(v) => Some(*v as f64),
            SimValue::Float(v) => Some(*v as f64),
            SimValue::Double(v) => Some(*v),
            SimValue::Text(s) => s.parse().ok(),
            SimValue::Null => None,
        }
    }
}

impl Display for SimValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimValue::Null => write!(f, "NULL"),
            SimValue::Int(v) => write!(f, "{v}"),
            SimValue::UInt(v) => write!(f, "{v}"),
            SimValue::Float(v) => write!(f, "{v}"),
            SimValue::Double(v) => write!(f, "{v}"),
            SimValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A `(column, value)` pair, used both for SET lists and WHERE anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Arc<Column>,
    pub value: SimValue,
}

impl Assignment {
    pub fn new(column: Arc<Column>, value: SimValue) -> Self {
        Self { column, value }
    }

    pub fn literal(&self) -> String {
        sql_literal(self.column.kind, &self.value)
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` = {}", self.column.name, self.literal())
    }
}

/// A value as a SQL literal: `b'0101'` for bit columns, a quoted string otherwise.
pub fn sql_literal(kind: ColumnKind, value: &SimValue) -> String {
    match (value, kind) {
        (SimValue::Null, _) => "NULL".to_string(),
        (value, ColumnKind::Bit) => format!("b'{value}'"),
        (value, _) => format!("'{}'", escape(&value.to_string())),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "''")
}

/// A column as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    pub column_type: String,
    pub primary_key: bool,
    pub default: Option<String>,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            primary_key: false,
            default: None,
        }
    }
}

/// Committed rows, stored column-major: row `i` is the `i`-th value of every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowRows {
    number_of_rows: usize,
    columns: Vec<Vec<SimValue>>,
}

impl ShadowRows {
    fn with_columns(width: usize) -> Self {
        Self {
            number_of_rows: 0,
            columns: vec![Vec::new(); width],
        }
    }

    pub fn number_of_rows(&self) -> usize {
        self.number_of_rows
    }

    pub fn column(&self, ordinal: usize) -> &[SimValue] {
        &self.columns[ordinal]
    }

    pub fn value(&self, ordinal: usize, row: usize) -> &SimValue {
        &self.columns[ordinal][row]
    }

    pub fn row(&self, row: usize) -> Vec<SimValue> {
        self.columns.iter().map(|c| c[row].clone()).collect()
    }

    fn check_aligned(&self) {
        debug_assert!(
            self.columns.iter().all(|c| c.len() == self.number_of_rows),
            "shadow columns out of alignment with row count {}",
            self.number_of_rows
        );
    }
}

/// The target table: its column descriptors plus the shadow mirror of its committed rows.
///
/// All shadow access goes through one lock, which keeps row indexes aligned across columns.
#[derive(Debug)]
pub struct Table {
    pub db: String,
    pub name: String,
    pub columns: Vec<Arc<Column>>,
    shadow: Mutex<ShadowRows>,
}

impl Table {
    pub fn new(db: impl Into<String>, name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let db = db.into();
        let name = name.into();
        if columns.is_empty() {
            return Err(Error::EmptySchema { db, table: name });
        }
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(ordinal, column)| Arc::new(Column { ordinal, ..column }))
            .collect::<Vec<_>>();
        let shadow = Mutex::new(ShadowRows::with_columns(columns.len()));
        Ok(Self {
            db,
            name,
            columns,
            shadow,
        })
    }

    /// Build the table from introspected `(name, type)` pairs, in declaration order.
    pub fn from_schema(
        db: impl Into<String>,
        name: impl Into<String>,
        schema: &[SchemaColumn],
    ) -> Result<Self> {
        let columns = schema
            .iter()
            .enumerate()
            .map(|(ordinal, c)| {
                Column::parse(ordinal, &c.name, &c.column_type).map(|column| {
                    column
                        .with_primary_key(c.primary_key)
                        .with_default(c.default.clone())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        for column in &columns {
            tracing::debug!(column = %column, "loaded column");
        }
        Self::new(db, name, columns)
    }

    /// `` `db`.`table` ``
    pub fn qualified_name(&self) -> String {
        format!("`{}`.`{}`", self.db, self.name)
    }

    pub fn number_of_rows(&self) -> usize {
        self.shadow.lock().number_of_rows
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_rows() == 0
    }

    pub fn snapshot(&self) -> ShadowRows {
        self.shadow.lock().clone()
    }

    /// Value of `column` at a uniformly chosen existing row, or `None` if there are no rows.
    pub fn pick_existing_value<R: Rng + ?Sized>(
        &self,
        column: usize,
        rng: &mut R,
    ) -> Option<SimValue> {
        let shadow = self.shadow.lock();
        let values = shadow.columns.get(column)?;
        if values.is_empty() {
            return None;
        }
        Some(values[rng.random_range(0..values.len())].clone())
    }

    /// Append whole rows, each given in column order. Returns the number of rows appended.
    pub fn append(&self, rows: &[Vec<SimValue>]) -> Result<usize> {
        let width = self.columns.len();
        if let Some(row) = rows.iter().find(|r| r.len() != width) {
            return Err(Error::RowWidthMismatch {
                expected: width,
                actual: row.len(),
            });
        }
        let mut shadow = self.shadow.lock();
        for row in rows {
            for (column, value) in shadow.columns.iter_mut().zip(row) {
                column.push(value.clone());
            }
        }
        shadow.number_of_rows += rows.len();
        shadow.check_aligned();
        Ok(rows.len())
    }

    /// Overwrite `assigns` in every row matching `predicate`. Returns the number of rows matched.
    pub fn apply_update(&self, assigns: &[Assignment], predicate: &Predicate) -> usize {
        let mut shadow = self.shadow.lock();
        let mut matched = 0;
        for row in 0..shadow.number_of_rows {
            if !predicate.test(&shadow, row) {
                continue;
            }
            for assign in assigns {
                shadow.columns[assign.column.ordinal][row] = assign.value.clone();
            }
            matched += 1;
        }
        matched
    }

    /// Remove every row matching `predicate`. Returns the number of rows removed.
    pub fn apply_delete(&self, predicate: &Predicate) -> usize {
        let mut shadow = self.shadow.lock();
        let mut removed = 0;
        // Back to front, so removing a slot never shifts a row that is still to be examined.
        for row in (0..shadow.number_of_rows).rev() {
            if !predicate.test(&shadow, row) {
                continue;
            }
            for column in shadow.columns.iter_mut() {
                column.remove(row);
            }
            shadow.number_of_rows -= 1;
            removed += 1;
        }
        shadow.check_aligned();
        removed
    }
}
