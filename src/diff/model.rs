use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A stored routine. `definition` is `None` when the catalog keeps no source
/// (CLR or encrypted modules).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineDescriptor {
    pub name: String,
    #[serde(default)]
    pub definition: Option<String>,
}

impl RoutineDescriptor {
    pub fn new(name: impl Into<String>, definition: Option<&str>) -> Self {
        Self {
            name: name.into(),
            definition: definition.map(str::to_string),
        }
    }
}

/// `expected` is the schema 1 value, `found` the schema 2 value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mismatch {
    pub expected: String,
    pub found: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDifference {
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
    pub datatype_differences: IndexMap<String, Mismatch>,
}

impl TableDifference {
    pub fn is_empty(&self) -> bool {
        self.missing_columns.is_empty()
            && self.extra_columns.is_empty()
            && self.datatype_differences.is_empty()
    }
}

/// Structural differences between schema 1 (expected) and schema 2 (found).
///
/// Name lists keep the order the metadata provider returned them in. The maps
/// keep insertion order, which follows schema 1's table and routine lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub missing_tables: Vec<String>,
    pub extra_tables: Vec<String>,
    pub table_differences: IndexMap<String, TableDifference>,
    pub missing_functions: Vec<String>,
    pub extra_functions: Vec<String>,
    pub function_differences: IndexMap<String, Mismatch>,
}

impl DiffResult {
    pub fn has_drift(&self) -> bool {
        !self.missing_tables.is_empty()
            || !self.extra_tables.is_empty()
            || !self.table_differences.is_empty()
            || !self.missing_functions.is_empty()
            || !self.extra_functions.is_empty()
            || !self.function_differences.is_empty()
    }

    pub fn counts(&self) -> DiffCounts {
        let mut counts = DiffCounts {
            missing_tables: self.missing_tables.len(),
            extra_tables: self.extra_tables.len(),
            changed_tables: self.table_differences.len(),
            missing_functions: self.missing_functions.len(),
            extra_functions: self.extra_functions.len(),
            changed_functions: self.function_differences.len(),
            ..DiffCounts::default()
        };
        for diff in self.table_differences.values() {
            counts.missing_columns += diff.missing_columns.len();
            counts.extra_columns += diff.extra_columns.len();
            counts.changed_columns += diff.datatype_differences.len();
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffCounts {
    pub missing_tables: usize,
    pub extra_tables: usize,
    pub changed_tables: usize,
    pub missing_columns: usize,
    pub extra_columns: usize,
    pub changed_columns: usize,
    pub missing_functions: usize,
    pub extra_functions: usize,
    pub changed_functions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_fields() {
        let mut result = DiffResult::default();
        result.missing_tables.push("orders".to_string());
        let mut table = TableDifference::default();
        table.datatype_differences.insert(
            "name".to_string(),
            Mismatch {
                expected: "text".to_string(),
                found: "varchar".to_string(),
            },
        );
        result.table_differences.insert("users".to_string(), table);

        let value = serde_json::to_value(&result).expect("json");
        assert_eq!(value["missingTables"][0], "orders");
        assert_eq!(
            value["tableDifferences"]["users"]["datatypeDifferences"]["name"]["found"],
            "varchar"
        );
        assert!(value["tableDifferences"]["users"]["missingColumns"]
            .as_array()
            .expect("array")
            .is_empty());
        assert!(value["functionDifferences"].as_object().expect("object").is_empty());
    }

    #[test]
    fn counts_sum_column_level_changes() {
        let mut result = DiffResult::default();
        result.table_differences.insert(
            "a".to_string(),
            TableDifference {
                missing_columns: vec!["x".to_string(), "y".to_string()],
                extra_columns: vec!["z".to_string()],
                datatype_differences: IndexMap::new(),
            },
        );
        result.extra_functions.push("f".to_string());

        let counts = result.counts();
        assert_eq!(counts.changed_tables, 1);
        assert_eq!(counts.missing_columns, 2);
        assert_eq!(counts.extra_columns, 1);
        assert_eq!(counts.extra_functions, 1);
        assert!(result.has_drift());
        assert!(!DiffResult::default().has_drift());
    }
}
