use std::fmt::Display;

use crate::model::column::ColumnKind;
use crate::model::table::{Assignment, ShadowRows, SimValue};

pub const FLOAT_EPSILON: f64 = 1e-7;
pub const DOUBLE_EPSILON: f64 = 1e-16;

/// A conjunction of equality anchors. No anchors means the predicate matches every row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Predicate(pub Vec<Assignment>);

impl Predicate {
    pub fn true_() -> Self {
        Self(vec![])
    }

    pub fn anchor(anchor: Assignment) -> Self {
        Self(vec![anchor])
    }

    pub fn is_true(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether shadow row `row` satisfies every anchor.
    pub fn test(&self, rows: &ShadowRows, row: usize) -> bool {
        self.0.iter().all(|anchor| {
            values_match(
                anchor.column.kind,
                &anchor.value,
                rows.value(anchor.column.ordinal, row),
            )
        })
    }
}

/// Equality as the generated WHERE clause sees it: floats compare within an epsilon,
/// since their text form does not round-trip bit for bit.
pub fn values_match(kind: ColumnKind, target: &SimValue, stored: &SimValue) -> bool {
    if target.is_null() {
        return stored.is_null();
    }
    let epsilon = match kind {
        ColumnKind::Float => FLOAT_EPSILON,
        ColumnKind::Double => DOUBLE_EPSILON,
        _ => return target == stored,
    };
    match (target.as_f64(), stored.as_f64()) {
        (Some(a), Some(b)) => (a - b).abs() < epsilon,
        _ => target == stored,
    }
}

/// Renders one anchor as a SQL condition.
struct Condition<'a>(&'a Assignment);

impl Display for Condition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let anchor = self.0;
        let name = &anchor.column.name;
        if anchor.value.is_null() {
            return write!(f, "`{name}` IS NULL");
        }
        match anchor.column.kind {
            ColumnKind::Float => write!(f, "abs(`{name}` - {}) < 0.0000001", anchor.literal()),
            ColumnKind::Double => write!(
                f,
                "abs(`{name}` - {}) < 0.0000000000000001",
                anchor.literal()
            ),
            _ => write!(f, "`{name}` = {}", anchor.literal()),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_true() {
            return write!(f, "TRUE");
        }
        for (i, anchor) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", Condition(anchor))?;
        }
        Ok(())
    }
}
