use anyhow::Result;
use tiberius::Query;
use tracing::trace;

use crate::config::ConnectionSettings;
use crate::db::client::{self, SqlClient};
use crate::db::executor;
use crate::db::queries;
use crate::db::types::ResultSet;
use crate::diff::{ColumnDescriptor, MetadataProvider, RoutineDescriptor};
use crate::error::{AppError, ErrorKind};

/// Metadata provider backed by a live SQL Server connection.
///
/// Owns its client; dropping the provider closes the connection.
pub struct SqlServerProvider {
    client: SqlClient,
}

impl SqlServerProvider {
    pub fn new(client: SqlClient) -> Self {
        Self { client }
    }

    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        Ok(Self::new(client::connect(settings).await?))
    }
}

impl MetadataProvider for SqlServerProvider {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        trace!(schema, "listing tables");
        let mut query = Query::new(queries::TABLES);
        query.bind(schema);
        let rs = executor::run_single(query, &mut self.client).await?;
        let names = text_column(rs, "TABLE_NAME")?;
        Ok(names.into_iter().map(Option::unwrap_or_default).collect())
    }

    async fn list_columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        trace!(schema, table, "listing columns");
        let mut query = Query::new(queries::COLUMNS);
        query.bind(schema);
        query.bind(table);
        let rs = executor::run_single(query, &mut self.client).await?;
        let names = text_column(rs.clone(), "COLUMN_NAME")?;
        let types = text_column(rs, "DATA_TYPE")?;
        Ok(names
            .into_iter()
            .zip(types)
            .map(|(name, data_type)| ColumnDescriptor {
                name: name.unwrap_or_default(),
                data_type: data_type.unwrap_or_default(),
            })
            .collect())
    }

    async fn list_routines(&mut self, schema: &str) -> Result<Vec<RoutineDescriptor>> {
        trace!(schema, "listing routines");
        let mut query = Query::new(queries::ROUTINES);
        query.bind(schema);
        let rs = executor::run_single(query, &mut self.client).await?;
        let names = text_column(rs.clone(), "ROUTINE_NAME")?;
        let definitions = text_column(rs, "ROUTINE_DEFINITION")?;
        Ok(names
            .into_iter()
            .zip(definitions)
            .map(|(name, definition)| RoutineDescriptor {
                name: name.unwrap_or_default(),
                definition,
            })
            .collect())
    }
}

/// Pull one text column out of a catalog result set, NULLs as `None`.
fn text_column(rs: ResultSet, name: &str) -> Result<Vec<Option<String>>> {
    if rs.rows.is_empty() {
        return Ok(Vec::new());
    }
    let idx = rs.column_index(name).ok_or_else(|| {
        AppError::new(
            ErrorKind::Query,
            format!("Catalog query returned no {} column", name),
        )
    })?;
    Ok(rs
        .rows
        .into_iter()
        .map(|row| row.into_iter().nth(idx).and_then(|value| value.into_text()))
        .collect())
}
