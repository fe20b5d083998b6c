use similar::TextDiff;

use crate::config::OutputFormat;
use crate::db::types::{Column, ResultSet, Value};
use crate::diff::{DiffCounts, DiffResult, Mismatch};
use crate::output::table::{TableOptions, render_result_set_table};

const ONLY_IN_SOURCE: &str = "Only in source";
const ONLY_IN_TARGET: &str = "Only in target";
const CHANGED: &str = "Changed";

/// Counts per object kind: changed, source-only, target-only.
pub fn render_counts_table(counts: &DiffCounts, format: OutputFormat) -> String {
    let row = |kind: &str, changed: usize, missing: usize, extra: usize| {
        vec![
            Value::Text(kind.to_string()),
            Value::Int(changed as i64),
            Value::Int(missing as i64),
            Value::Int(extra as i64),
        ]
    };
    let rs = ResultSet {
        columns: vec![
            Column::named("Type"),
            Column::named(CHANGED),
            Column::named(ONLY_IN_SOURCE),
            Column::named(ONLY_IN_TARGET),
        ],
        rows: vec![
            row(
                "Tables",
                counts.changed_tables,
                counts.missing_tables,
                counts.extra_tables,
            ),
            row(
                "Columns",
                counts.changed_columns,
                counts.missing_columns,
                counts.extra_columns,
            ),
            row(
                "Functions",
                counts.changed_functions,
                counts.missing_functions,
                counts.extra_functions,
            ),
        ],
    };
    render_result_set_table(&rs, format, &TableOptions::default())
}

/// One row per drifted object. Returns `None` when there is nothing to show.
pub fn render_drift_table(result: &DiffResult, format: OutputFormat) -> Option<String> {
    let rows = drift_rows(result);
    if rows.is_empty() {
        return None;
    }
    let rs = ResultSet {
        columns: vec![
            Column::named("Object"),
            Column::named("Kind"),
            Column::named("Status"),
            Column::named("Source"),
            Column::named("Target"),
        ],
        rows,
    };
    Some(render_result_set_table(
        &rs,
        format,
        &TableOptions::default(),
    ))
}

fn drift_rows(result: &DiffResult) -> Vec<Vec<Value>> {
    let mut rows = Vec::new();
    let mut push = |object: String, kind: &str, status: &str, types: Option<&Mismatch>| {
        let (source, target) = match types {
            Some(mismatch) => (
                Value::Text(mismatch.expected.clone()),
                Value::Text(mismatch.found.clone()),
            ),
            None => (Value::Null, Value::Null),
        };
        rows.push(vec![
            Value::Text(object),
            Value::Text(kind.to_string()),
            Value::Text(status.to_string()),
            source,
            target,
        ]);
    };

    for name in &result.missing_tables {
        push(name.clone(), "Table", ONLY_IN_SOURCE, None);
    }
    for name in &result.extra_tables {
        push(name.clone(), "Table", ONLY_IN_TARGET, None);
    }
    for (table, diff) in &result.table_differences {
        for column in &diff.missing_columns {
            push(format!("{table}.{column}"), "Column", ONLY_IN_SOURCE, None);
        }
        for column in &diff.extra_columns {
            push(format!("{table}.{column}"), "Column", ONLY_IN_TARGET, None);
        }
        for (column, mismatch) in &diff.datatype_differences {
            push(
                format!("{table}.{column}"),
                "Column",
                "Type changed",
                Some(mismatch),
            );
        }
    }
    for name in &result.missing_functions {
        push(name.clone(), "Function", ONLY_IN_SOURCE, None);
    }
    for name in &result.extra_functions {
        push(name.clone(), "Function", ONLY_IN_TARGET, None);
    }
    // Routine bodies are too long for a cell; --show-diff prints them.
    for name in result.function_differences.keys() {
        push(name.clone(), "Function", CHANGED, None);
    }

    rows
}

/// Unified diffs of every differing routine body, source first.
pub fn render_routine_diffs(result: &DiffResult, source_label: &str, target_label: &str) -> String {
    result
        .function_differences
        .iter()
        .map(|(name, mismatch)| {
            let expected = mismatch.expected.replace("\r\n", "\n");
            let found = mismatch.found.replace("\r\n", "\n");
            TextDiff::from_lines(&expected, &found)
                .unified_diff()
                .context_radius(5)
                .header(
                    &format!("{source_label}:{name}"),
                    &format!("{target_label}:{name}"),
                )
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
