use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{ColumnDescriptor, RoutineDescriptor};
use super::provider::MetadataProvider;
use crate::error::{AppError, ErrorKind};

/// Point-in-time capture of one schema's tables, columns, and routines.
///
/// Serves as a [`MetadataProvider`] for its own schema, so a saved capture can
/// stand in for a live connection on either side of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
    #[serde(default)]
    pub routines: Vec<RoutineDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Pick a format from a file extension: `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(SnapshotFormat::Yaml),
            Some("json") => Ok(SnapshotFormat::Json),
            _ => Err(AppError::new(
                ErrorKind::Snapshot,
                format!(
                    "Unsupported snapshot file extension: {} (expected .json, .yaml or .yml)",
                    path.display()
                ),
            )
            .into()),
        }
    }
}

impl SchemaSnapshot {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Self::default()
        }
    }

    pub fn with_table(mut self, name: &str, columns: &[(&str, &str)]) -> Self {
        self.tables.push(TableSnapshot {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(column, data_type)| ColumnDescriptor::new(*column, *data_type))
                .collect(),
        });
        self
    }

    pub fn with_routine(mut self, name: &str, definition: Option<&str>) -> Self {
        self.routines.push(RoutineDescriptor::new(name, definition));
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let format = SnapshotFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|err| {
            AppError::new(
                ErrorKind::Snapshot,
                format!("Failed to read snapshot file {}: {}", path.display(), err),
            )
        })?;

        let parsed = match format {
            SnapshotFormat::Yaml => {
                serde_yaml::from_str::<SchemaSnapshot>(&content).map_err(|err| err.to_string())
            }
            SnapshotFormat::Json => {
                serde_json::from_str::<SchemaSnapshot>(&content).map_err(|err| err.to_string())
            }
        };

        parsed.map_err(|err| {
            AppError::new(
                ErrorKind::Snapshot,
                format!("Failed to parse snapshot {}: {}", path.display(), err),
            )
            .into()
        })
    }

    pub fn render(&self, format: SnapshotFormat) -> Result<String> {
        match format {
            SnapshotFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            SnapshotFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }

    fn check_schema(&self, schema: &str) -> Result<()> {
        if self.schema == schema {
            return Ok(());
        }
        Err(AppError::new(
            ErrorKind::Snapshot,
            format!(
                "Snapshot holds schema '{}', not '{}'",
                self.schema, schema
            ),
        )
        .into())
    }
}

impl MetadataProvider for SchemaSnapshot {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        self.check_schema(schema)?;
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn list_columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.check_schema(schema)?;
        Ok(self
            .tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn list_routines(&mut self, schema: &str) -> Result<Vec<RoutineDescriptor>> {
        self.check_schema(schema)?;
        Ok(self.routines.clone())
    }
}

/// Read every table, column, and routine of `schema` from `provider`.
pub async fn capture<P: MetadataProvider>(provider: &mut P, schema: &str) -> Result<SchemaSnapshot> {
    let table_names = provider.list_tables(schema).await?;
    debug!(schema, tables = table_names.len(), "capturing schema");

    let mut tables = Vec::with_capacity(table_names.len());
    for name in table_names {
        let columns = provider.list_columns(schema, &name).await?;
        tables.push(TableSnapshot { name, columns });
    }
    let routines = provider.list_routines(schema).await?;

    Ok(SchemaSnapshot {
        schema: schema.to_string(),
        captured_at: Some(Utc::now().to_rfc3339()),
        tables,
        routines,
    })
}
