use comfy_table::{ContentArrangement, Table, presets};

use crate::config::OutputFormat;
use crate::db::types::{ResultSet, Value};

const NULL_DISPLAY: &str = "—";
const ELLIPSIS: &str = "…";
const DEFAULT_MAX_CELL_WIDTH: usize = 140;
const DEFAULT_MAX_OUTPUT_CHARS: usize = 25_000;

#[derive(Debug, Clone)]
pub struct TableOptions {
    pub max_cell_width: usize,
    pub max_output_chars: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_cell_width: DEFAULT_MAX_CELL_WIDTH,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

fn new_table(format: OutputFormat) -> Table {
    let mut table = Table::new();
    match format {
        OutputFormat::Markdown => {
            table.load_preset(presets::ASCII_MARKDOWN);
        }
        _ => {
            table.load_preset(presets::UTF8_FULL);
        }
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_result_set_table(
    result_set: &ResultSet,
    format: OutputFormat,
    options: &TableOptions,
) -> String {
    let mut table = new_table(format);

    let headers = result_set
        .columns
        .iter()
        .map(|col| col.name.clone())
        .collect::<Vec<_>>();
    table.set_header(headers);

    for row in &result_set.rows {
        let cells = row
            .iter()
            .map(|value| format_cell(value, options.max_cell_width))
            .collect::<Vec<_>>();
        table.add_row(cells);
    }

    truncate_output(table.to_string(), options.max_output_chars)
}

pub fn render_key_value_table(
    title: &str,
    rows: &[(String, String)],
    format: OutputFormat,
    options: &TableOptions,
) -> String {
    let mut table = new_table(format);
    table.set_header(vec![title.to_string(), "Value".to_string()]);

    for (key, value) in rows {
        let key = truncate_string(key, options.max_cell_width);
        let value = truncate_string(value, options.max_cell_width);
        table.add_row(vec![key, value]);
    }

    truncate_output(table.to_string(), options.max_output_chars)
}

fn format_cell(value: &Value, max_cell_width: usize) -> String {
    let raw = match value {
        Value::Null => NULL_DISPLAY.to_string(),
        _ => value.as_display(),
    };
    truncate_string(&raw, max_cell_width)
}

fn truncate_string(input: &str, max_len: usize) -> String {
    let len = input.chars().count();
    if len <= max_len {
        return input.to_string();
    }
    if max_len <= 1 {
        return ELLIPSIS.to_string();
    }
    let truncated: String = input.chars().take(max_len - 1).collect();
    format!("{}{}", truncated, ELLIPSIS)
}

fn truncate_output(output: String, max_len: usize) -> String {
    if output.len() <= max_len {
        return output;
    }
    let mut truncated = output.chars().take(max_len).collect::<String>();
    truncated.push_str("\n[output truncated]");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::{Column, ResultSet};

    fn single_column(value: Value) -> ResultSet {
        ResultSet {
            columns: vec![Column::named("value")],
            rows: vec![vec![value]],
        }
    }

    #[test]
    fn truncates_cells() {
        let value = Value::Text("abcdefghijklmnopqrstuvwxyz".to_string());
        assert_eq!(format_cell(&value, 8), "abcdefg…");
    }

    #[test]
    fn renders_null_display() {
        let out = render_result_set_table(
            &single_column(Value::Null),
            OutputFormat::Pretty,
            &TableOptions::default(),
        );
        assert!(out.contains("—"));
    }

    #[test]
    fn markdown_uses_pipes() {
        let out = render_key_value_table(
            "Config",
            &[("schema".to_string(), "dbo".to_string())],
            OutputFormat::Markdown,
            &TableOptions::default(),
        );
        assert!(out.contains("| schema"));
    }

    #[test]
    fn truncates_output_when_too_long() {
        let options = TableOptions {
            max_output_chars: 50,
            ..TableOptions::default()
        };
        let out = render_result_set_table(
            &single_column(Value::Text("x".repeat(200))),
            OutputFormat::Pretty,
            &options,
        );
        assert!(out.contains("[output truncated]"));
    }
}
