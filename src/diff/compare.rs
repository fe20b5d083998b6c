use std::collections::HashSet;

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, info};

use super::model::{DiffResult, Mismatch, TableDifference};
use super::normalize::normalize;
use super::provider::MetadataProvider;
use crate::error::CompareError;

/// Compare `source_schema` (expected) against `target_schema` (found).
///
/// Issues `2 + 2 * tables(source) + 2` provider calls; each source/target pair
/// runs concurrently. The first provider failure aborts the comparison and no
/// partial result is produced.
pub async fn compare<S, T>(
    source: &mut S,
    source_schema: &str,
    target: &mut T,
    target_schema: &str,
) -> Result<DiffResult, CompareError>
where
    S: MetadataProvider,
    T: MetadataProvider,
{
    info!(source_schema, target_schema, "comparing schemas");
    diff_schemas(source, source_schema, target, target_schema)
        .await
        .map_err(CompareError::new)
}

async fn diff_schemas<S, T>(
    source: &mut S,
    source_schema: &str,
    target: &mut T,
    target_schema: &str,
) -> Result<DiffResult>
where
    S: MetadataProvider,
    T: MetadataProvider,
{
    let (source_tables, target_tables) = tokio::try_join!(
        source.list_tables(source_schema),
        target.list_tables(target_schema),
    )?;
    debug!(
        source = source_tables.len(),
        target = target_tables.len(),
        "fetched table lists"
    );

    let mut result = DiffResult {
        missing_tables: missing_from(&source_tables, &target_tables),
        extra_tables: missing_from(&target_tables, &source_tables),
        ..DiffResult::default()
    };

    for table in &source_tables {
        let (source_columns, target_columns) = tokio::try_join!(
            source.list_columns(source_schema, table),
            target.list_columns(target_schema, table),
        )?;
        let expected: IndexMap<String, String> = source_columns
            .into_iter()
            .map(|c| (c.name, c.data_type))
            .collect();
        let found: IndexMap<String, String> = target_columns
            .into_iter()
            .map(|c| (c.name, c.data_type))
            .collect();

        let diff = diff_columns(&expected, &found);
        if !diff.is_empty() {
            debug!(table = table.as_str(), "table differs");
            result.table_differences.insert(table.clone(), diff);
        }
    }

    let (source_routines, target_routines) = tokio::try_join!(
        source.list_routines(source_schema),
        target.list_routines(target_schema),
    )?;
    let expected: IndexMap<String, String> = source_routines
        .into_iter()
        .map(|r| (r.name, r.definition.unwrap_or_default()))
        .collect();
    let found: IndexMap<String, String> = target_routines
        .into_iter()
        .map(|r| (r.name, r.definition.unwrap_or_default()))
        .collect();
    debug!(
        source = expected.len(),
        target = found.len(),
        "fetched routine lists"
    );

    result.missing_functions = keys_missing_from(&expected, &found);
    result.extra_functions = keys_missing_from(&found, &expected);
    for (name, definition) in &expected {
        if let Some(other) = found.get(name) {
            if normalize(definition) != normalize(other) {
                result.function_differences.insert(
                    name.clone(),
                    Mismatch {
                        expected: definition.clone(),
                        found: other.clone(),
                    },
                );
            }
        }
    }

    let counts = result.counts();
    info!(
        missing_tables = counts.missing_tables,
        extra_tables = counts.extra_tables,
        changed_tables = counts.changed_tables,
        missing_functions = counts.missing_functions,
        extra_functions = counts.extra_functions,
        changed_functions = counts.changed_functions,
        "comparison finished"
    );
    Ok(result)
}

/// Names in `left` that `right` lacks, in `left` order, duplicates kept.
fn missing_from(left: &[String], right: &[String]) -> Vec<String> {
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    left.iter()
        .filter(|name| !right.contains(name.as_str()))
        .cloned()
        .collect()
}

fn keys_missing_from(left: &IndexMap<String, String>, right: &IndexMap<String, String>) -> Vec<String> {
    left.keys()
        .filter(|name| !right.contains_key(*name))
        .cloned()
        .collect()
}

fn diff_columns(
    expected: &IndexMap<String, String>,
    found: &IndexMap<String, String>,
) -> TableDifference {
    let mut datatype_differences = IndexMap::new();
    for (column, data_type) in expected {
        if let Some(other) = found.get(column) {
            if data_type != other {
                datatype_differences.insert(
                    column.clone(),
                    Mismatch {
                        expected: data_type.clone(),
                        found: other.clone(),
                    },
                );
            }
        }
    }

    TableDifference {
        missing_columns: keys_missing_from(expected, found),
        extra_columns: keys_missing_from(found, expected),
        datatype_differences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::{ColumnDescriptor, RoutineDescriptor};
    use crate::diff::snapshot::SchemaSnapshot;
    use crate::error::{AppError, ErrorKind, COMPARE_FAILED_MESSAGE};

    fn run(left: &mut SchemaSnapshot, right: &mut SchemaSnapshot) -> DiffResult {
        let (left_schema, right_schema) = (left.schema.clone(), right.schema.clone());
        tokio_test::block_on(compare(left, &left_schema, right, &right_schema)).expect("compare")
    }

    fn mismatch(expected: &str, found: &str) -> Mismatch {
        Mismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Counts calls and optionally fails the n-th one.
    struct Recording {
        inner: SchemaSnapshot,
        calls: usize,
        fail_at: Option<usize>,
    }

    impl Recording {
        fn new(inner: SchemaSnapshot) -> Self {
            Self {
                inner,
                calls: 0,
                fail_at: None,
            }
        }

        fn tick(&mut self) -> Result<()> {
            self.calls += 1;
            if self.fail_at == Some(self.calls) {
                return Err(AppError::new(
                    ErrorKind::Connection,
                    "login failed for user 'sa' on 10.0.0.5",
                )
                .into());
            }
            Ok(())
        }
    }

    impl MetadataProvider for Recording {
        async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
            self.tick()?;
            self.inner.list_tables(schema).await
        }

        async fn list_columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
            self.tick()?;
            self.inner.list_columns(schema, table).await
        }

        async fn list_routines(&mut self, schema: &str) -> Result<Vec<RoutineDescriptor>> {
            self.tick()?;
            self.inner.list_routines(schema).await
        }
    }

    #[test]
    fn users_orders_against_users_logs() {
        let mut left = SchemaSnapshot::new("public")
            .with_table("users", &[("id", "int"), ("name", "text")])
            .with_table("orders", &[("id", "int")]);
        let mut right = SchemaSnapshot::new("public")
            .with_table("users", &[("id", "int"), ("name", "varchar")])
            .with_table("logs", &[("id", "int")]);

        let result = run(&mut left, &mut right);
        assert_eq!(result.missing_tables, vec!["orders".to_string()]);
        assert_eq!(result.extra_tables, vec!["logs".to_string()]);

        let users = &result.table_differences["users"];
        assert!(users.missing_columns.is_empty());
        assert!(users.extra_columns.is_empty());
        assert_eq!(users.datatype_differences.len(), 1);
        assert_eq!(users.datatype_differences["name"], mismatch("text", "varchar"));
        // `orders` is absent on the right, so each of its columns is missing.
        assert_eq!(
            result.table_differences["orders"].missing_columns,
            vec!["id".to_string()]
        );
        assert!(!result.table_differences.contains_key("logs"));
    }

    #[test]
    fn identical_schemas_have_no_drift() {
        let snapshot = SchemaSnapshot::new("dbo")
            .with_table("a", &[("id", "int"), ("v", "nvarchar")])
            .with_table("b", &[])
            .with_routine("p", Some("CREATE PROC p AS SELECT 1"))
            .with_routine("clr", None);
        let mut left = snapshot.clone();
        let mut right = snapshot;

        let result = run(&mut left, &mut right);
        assert_eq!(result, DiffResult::default());
        assert!(!result.has_drift());
    }

    #[test]
    fn table_lists_are_set_differences_in_source_order() {
        let mut left = SchemaSnapshot::new("dbo")
            .with_table("z", &[])
            .with_table("shared", &[])
            .with_table("a", &[]);
        let mut right = SchemaSnapshot::new("other")
            .with_table("y", &[])
            .with_table("shared", &[])
            .with_table("b", &[]);

        let result = run(&mut left, &mut right);
        assert_eq!(result.missing_tables, vec!["z".to_string(), "a".to_string()]);
        assert_eq!(result.extra_tables, vec!["y".to_string(), "b".to_string()]);
        assert!(result
            .missing_tables
            .iter()
            .all(|t| !result.extra_tables.contains(t)));
    }

    #[test]
    fn datatype_mismatch_is_reported_once() {
        let mut left = SchemaSnapshot::new("dbo").with_table("t", &[("n", "integer"), ("s", "text")]);
        let mut right = SchemaSnapshot::new("dbo").with_table("t", &[("n", "bigint"), ("s", "text")]);

        let result = run(&mut left, &mut right);
        let diff = &result.table_differences["t"];
        assert_eq!(diff.datatype_differences.len(), 1);
        assert_eq!(diff.datatype_differences["n"], mismatch("integer", "bigint"));
    }

    #[test]
    fn column_differences_keep_provider_order() {
        let mut left = SchemaSnapshot::new("dbo")
            .with_table("t", &[("c", "int"), ("id", "int"), ("a", "int")]);
        let mut right = SchemaSnapshot::new("dbo")
            .with_table("t", &[("id", "int"), ("y", "int"), ("x", "int")]);

        let result = run(&mut left, &mut right);
        let diff = &result.table_differences["t"];
        assert_eq!(diff.missing_columns, vec!["c".to_string(), "a".to_string()]);
        assert_eq!(diff.extra_columns, vec!["y".to_string(), "x".to_string()]);
        assert!(diff.datatype_differences.is_empty());
    }

    #[test]
    fn tables_only_in_target_are_not_inspected() {
        let mut left = SchemaSnapshot::new("dbo").with_table("a", &[("id", "int")]);
        let mut right = SchemaSnapshot::new("dbo")
            .with_table("a", &[("id", "int")])
            .with_table("b", &[("id", "int")]);

        let result = run(&mut left, &mut right);
        assert_eq!(result.extra_tables, vec!["b".to_string()]);
        assert!(result.table_differences.is_empty());
    }

    #[test]
    fn routine_whitespace_changes_are_ignored() {
        let mut left = SchemaSnapshot::new("dbo")
            .with_routine("p", Some("CREATE PROC p AS\r\n  SELECT 1 /* note */"));
        let mut right = SchemaSnapshot::new("dbo").with_routine("p", Some("CREATE PROC p AS SELECT 1"));

        let result = run(&mut left, &mut right);
        assert!(result.function_differences.is_empty());
    }

    #[test]
    fn routine_body_change_reports_raw_text() {
        let raw_left = "CREATE PROC p AS\r\n  SELECT 1";
        let raw_right = "CREATE PROC p AS\n  SELECT 2";
        let mut left = SchemaSnapshot::new("dbo").with_routine("p", Some(raw_left));
        let mut right = SchemaSnapshot::new("dbo").with_routine("p", Some(raw_right));

        let result = run(&mut left, &mut right);
        assert_eq!(result.function_differences["p"], mismatch(raw_left, raw_right));
    }

    #[test]
    fn missing_definition_compares_as_empty() {
        let mut left = SchemaSnapshot::new("dbo")
            .with_routine("clr", None)
            .with_routine("blank", Some("   "));
        let mut right = SchemaSnapshot::new("dbo")
            .with_routine("clr", Some(""))
            .with_routine("blank", None)
            .with_routine("extra", None);

        let result = run(&mut left, &mut right);
        assert!(result.function_differences.is_empty());
        assert!(result.missing_functions.is_empty());
        assert_eq!(result.extra_functions, vec!["extra".to_string()]);
    }

    #[test]
    fn null_definition_against_body_reports_empty_expected() {
        let mut left = SchemaSnapshot::new("dbo").with_routine("f", None);
        let mut right = SchemaSnapshot::new("dbo").with_routine("f", Some("SELECT 1"));

        let result = run(&mut left, &mut right);
        assert_eq!(result.function_differences["f"], mismatch("", "SELECT 1"));
    }

    #[test]
    fn duplicate_routine_names_keep_last_definition() {
        let mut left = SchemaSnapshot::new("dbo")
            .with_routine("f", Some("SELECT 1"))
            .with_routine("g", Some("SELECT 9"))
            .with_routine("f", Some("SELECT 2"));
        let mut right = SchemaSnapshot::new("dbo").with_routine("f", Some("SELECT 2"));

        let result = run(&mut left, &mut right);
        assert!(result.function_differences.is_empty());
        assert_eq!(result.missing_functions, vec!["g".to_string()]);
    }

    #[test]
    fn empty_schema_only_contributes_absences() {
        let mut left = SchemaSnapshot::new("dbo");
        let mut right = SchemaSnapshot::new("dbo")
            .with_table("t", &[("id", "int")])
            .with_routine("f", Some("SELECT 1"));

        let result = run(&mut left, &mut right);
        assert_eq!(result.extra_tables, vec!["t".to_string()]);
        assert_eq!(result.extra_functions, vec!["f".to_string()]);
        assert!(result.missing_tables.is_empty());
        assert!(result.table_differences.is_empty());
    }

    #[test]
    fn issues_fixed_number_of_queries() {
        let mut left = Recording::new(
            SchemaSnapshot::new("dbo")
                .with_table("a", &[])
                .with_table("b", &[])
                .with_table("c", &[]),
        );
        let mut right = Recording::new(SchemaSnapshot::new("dbo").with_table("a", &[]));

        tokio_test::block_on(compare(&mut left, "dbo", &mut right, "dbo")).expect("compare");
        assert_eq!(left.calls + right.calls, 2 + 2 * 3 + 2);
        assert_eq!(left.calls, right.calls);
    }

    #[test]
    fn provider_failure_aborts_without_leaking_cause() {
        let mut left = Recording::new(
            SchemaSnapshot::new("dbo")
                .with_table("a", &[])
                .with_table("b", &[]),
        );
        let mut right = Recording::new(SchemaSnapshot::new("dbo"));
        right.fail_at = Some(3);

        let err = tokio_test::block_on(compare(&mut left, "dbo", &mut right, "dbo"))
            .expect_err("provider failure");
        assert_eq!(err.to_string(), COMPARE_FAILED_MESSAGE);
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(format!("{:#}", err.cause()).contains("login failed"));
        // Routine lists were never requested.
        assert_eq!(right.calls, 3);
    }

    #[test]
    fn schema_mismatch_in_snapshot_fails_comparison() {
        let mut left = SchemaSnapshot::new("dbo");
        let mut right = SchemaSnapshot::new("sales");
        let err = tokio_test::block_on(compare(&mut left, "dbo", &mut right, "dbo"))
            .expect_err("schema mismatch");
        assert_eq!(err.kind(), ErrorKind::Snapshot);
    }
}
