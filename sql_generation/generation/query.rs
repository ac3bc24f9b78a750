use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use strum::{Display, EnumIter};

use crate::generation::{pick, ArbitraryFrom};
use crate::model::query::{Delete, DmlTask, Insert, Predicate, Replace, Statement, Update};
use crate::model::table::{Assignment, SimValue, Table};

/// Upper bound on the tuples of one `INSERT IGNORE`.
pub const MAX_INSERT_IGNORE_ROWS: usize = 20;

/// The five task kinds a workload round issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DmlKind {
    Insert,
    InsertIgnore,
    Update,
    Delete,
    Replace,
}

impl DmlKind {
    /// Build one task of this kind. `None` means the kind has nothing to do on the
    /// current shadow contents and the task is skipped.
    pub fn build<R: Rng + ?Sized>(self, table: &Arc<Table>, rng: &mut R) -> Option<DmlTask> {
        match self {
            DmlKind::Insert => Some(build_insert(table, rng)),
            DmlKind::InsertIgnore => Some(build_insert_ignore(table, rng)),
            DmlKind::Update => build_update(table, rng),
            DmlKind::Delete => Some(build_delete(table, rng)),
            DmlKind::Replace => Some(build_replace(table, rng)),
        }
    }
}

fn random_row<R: Rng + ?Sized>(table: &Table, rng: &mut R) -> Vec<SimValue> {
    Vec::<SimValue>::arbitrary_from(rng, table)
}

fn random_assignments<R: Rng + ?Sized>(table: &Table, rng: &mut R) -> Vec<Assignment> {
    table
        .columns
        .iter()
        .map(|column| {
            let value = SimValue::arbitrary_from(rng, column.as_ref());
            Assignment::new(column.clone(), value)
        })
        .collect()
}

/// An equality anchor on a random column, read from an existing shadow row. Only
/// columns whose values compare equal to their literal on the server are candidates.
fn random_anchor<R: Rng + ?Sized>(table: &Table, rng: &mut R) -> Option<Predicate> {
    let candidates = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.kind.can_anchor())
        .map(|(ordinal, _)| ordinal)
        .collect::<Vec<_>>();
    if candidates.is_empty() {
        return None;
    }
    let column = *pick(&candidates, rng);
    let value = table.pick_existing_value(column, rng)?;
    Some(Predicate::anchor(Assignment::new(
        table.columns[column].clone(),
        value,
    )))
}

pub fn build_insert<R: Rng + ?Sized>(table: &Arc<Table>, rng: &mut R) -> DmlTask {
    let insert = Insert {
        table: table.qualified_name(),
        columns: table.columns.clone(),
        values: vec![random_row(table, rng)],
        ignore: false,
    };
    DmlTask::new(table.clone(), Statement::Insert(insert))
}

pub fn build_insert_ignore<R: Rng + ?Sized>(table: &Arc<Table>, rng: &mut R) -> DmlTask {
    let count = rng.random_range(1..=MAX_INSERT_IGNORE_ROWS);
    let insert = Insert {
        table: table.qualified_name(),
        columns: table.columns.clone(),
        values: (0..count).map(|_| random_row(table, rng)).collect(),
        ignore: true,
    };
    DmlTask::new(table.clone(), Statement::Insert(insert))
}

/// `None` when the shadow has no row to anchor on.
pub fn build_update<R: Rng + ?Sized>(table: &Arc<Table>, rng: &mut R) -> Option<DmlTask> {
    let predicate = random_anchor(table, rng)?;
    let update = Update {
        table: table.qualified_name(),
        set_values: random_assignments(table, rng),
        predicate,
    };
    Some(DmlTask::new(table.clone(), Statement::Update(update)))
}

/// Unconditional when the shadow has no row to anchor on.
pub fn build_delete<R: Rng + ?Sized>(table: &Arc<Table>, rng: &mut R) -> DmlTask {
    let delete = Delete {
        table: table.qualified_name(),
        predicate: random_anchor(table, rng).unwrap_or_default(),
    };
    DmlTask::new(table.clone(), Statement::Delete(delete))
}

pub fn build_replace<R: Rng + ?Sized>(table: &Arc<Table>, rng: &mut R) -> DmlTask {
    let set_values = random_assignments(table, rng);
    let mut order = (0..set_values.len()).collect::<Vec<_>>();
    order.shuffle(rng);
    let replace = Replace {
        table: table.qualified_name(),
        set_values,
        order,
    };
    DmlTask::new(table.clone(), Statement::Replace(replace))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::model::query::StatementKind;
    use crate::model::table::SchemaColumn;

    fn table() -> Arc<Table> {
        Arc::new(
            Table::from_schema(
                "test",
                "t",
                &[
                    SchemaColumn::new("id", "int"),
                    SchemaColumn::new("name", "varchar(10)"),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_insert_scenario() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let t = table();
        let task = build_insert(&t, &mut rng);
        assert!(task.sql.starts_with("INSERT INTO `test`.`t` (`id`, `name`) VALUES ("));

        let Statement::Insert(insert) = &task.statement else {
            panic!("expected an insert, got {:?}", task.kind());
        };
        assert_eq!(insert.values.len(), 1);
        let generated = insert.values[0].clone();

        assert_eq!(task.apply_to_shadow().unwrap(), 1);
        let snap = t.snapshot();
        assert_eq!(snap.number_of_rows(), 1);
        assert_eq!(snap.row(0), generated);
    }

    #[test]
    fn test_insert_ignore_row_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let t = table();
        let mut expected = 0;
        for _ in 0..50 {
            let task = build_insert_ignore(&t, &mut rng);
            assert!(task.sql.starts_with("INSERT IGNORE INTO `test`.`t` "));
            let Statement::Insert(insert) = &task.statement else {
                panic!("expected an insert");
            };
            assert!((1..=MAX_INSERT_IGNORE_ROWS).contains(&insert.values.len()));
            assert_eq!(task.sql.matches("), (").count() + 1, insert.values.len());
            expected += insert.values.len();
            task.apply_to_shadow().unwrap();
        }
        assert_eq!(t.number_of_rows(), expected);
    }

    #[test]
    fn test_update_skipped_on_empty_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let t = table();
        for _ in 0..20 {
            assert!(build_update(&t, &mut rng).is_none());
            assert!(DmlKind::Update.build(&t, &mut rng).is_none());
        }
    }

    #[test]
    fn test_update_anchors_on_existing_row() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let t = table();
        build_insert(&t, &mut rng).apply_to_shadow().unwrap();
        let task = build_update(&t, &mut rng).unwrap();
        assert!(task.sql.starts_with("UPDATE `test`.`t` SET `id` = '"));
        assert!(task.sql.contains(" WHERE "));
        assert_eq!(task.kind(), StatementKind::Update);
        assert_eq!(task.apply_to_shadow().unwrap(), 1);
        assert_eq!(t.number_of_rows(), 1);
    }

    #[test]
    fn test_delete_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let t = table();
        let task = build_delete(&t, &mut rng);
        assert_eq!(task.sql, "DELETE FROM `test`.`t`");

        build_insert(&t, &mut rng).apply_to_shadow().unwrap();
        let task = build_delete(&t, &mut rng);
        assert!(task.sql.starts_with("DELETE FROM `test`.`t` WHERE `"));
        assert_eq!(task.apply_to_shadow().unwrap(), 1);
        assert!(t.is_empty());
    }

    #[test]
    fn test_anchors_skip_json_and_binary() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let t = Arc::new(
            Table::from_schema(
                "test",
                "t",
                &[
                    SchemaColumn::new("doc", "json"),
                    SchemaColumn::new("id", "int"),
                    SchemaColumn::new("digest", "binary(4)"),
                ],
            )
            .unwrap(),
        );
        for _ in 0..4 {
            build_insert(&t, &mut rng).apply_to_shadow().unwrap();
        }
        for _ in 0..50 {
            let Statement::Update(update) = build_update(&t, &mut rng).unwrap().statement else {
                panic!("expected an update");
            };
            let Statement::Delete(delete) = build_delete(&t, &mut rng).statement else {
                panic!("expected a delete");
            };
            for predicate in [update.predicate, delete.predicate] {
                assert_eq!(predicate.0.len(), 1);
                assert_eq!(predicate.0[0].column.name, "id");
            }
        }
    }

    #[test]
    fn test_no_anchorable_column() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let t = Arc::new(
            Table::from_schema(
                "test",
                "t",
                &[
                    SchemaColumn::new("doc", "json"),
                    SchemaColumn::new("digest", "binary(4)"),
                ],
            )
            .unwrap(),
        );
        build_insert(&t, &mut rng).apply_to_shadow().unwrap();
        assert!(build_update(&t, &mut rng).is_none());
        assert_eq!(build_delete(&t, &mut rng).sql, "DELETE FROM `test`.`t`");
    }

    #[test]
    fn test_replace_permutes_set_list() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let t = table();
        let mut seen_orders = std::collections::HashSet::new();
        for _ in 0..32 {
            let task = build_replace(&t, &mut rng);
            assert!(task.sql.starts_with("REPLACE INTO `test`.`t` SET `"));
            let Statement::Replace(replace) = &task.statement else {
                panic!("expected a replace");
            };
            let mut sorted = replace.order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1]);
            seen_orders.insert(replace.order.clone());
        }
        assert_eq!(seen_orders.len(), 2);
        assert_eq!(t.number_of_rows(), 0);
    }

    #[test]
    fn test_every_kind_builds_on_populated_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let t = table();
        build_insert(&t, &mut rng).apply_to_shadow().unwrap();
        for kind in DmlKind::iter() {
            let task = kind.build(&t, &mut rng).unwrap();
            assert!(task.sql.contains("`test`.`t`"), "{kind}: {}", task.sql);
        }
        assert_eq!(DmlKind::InsertIgnore.to_string(), "insert_ignore");
    }
}
