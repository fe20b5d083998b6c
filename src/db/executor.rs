use anyhow::Result;

use crate::db::client::SqlClient;
use crate::db::types::{Column, ResultSet, Value};
use crate::error::{AppError, ErrorKind};

pub async fn run_query(query: tiberius::Query<'_>, client: &mut SqlClient) -> Result<Vec<ResultSet>> {
    let stream = query
        .query(client)
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    collect_result_sets(stream).await
}

/// Run a query expected to produce a single result set.
pub async fn run_single(query: tiberius::Query<'_>, client: &mut SqlClient) -> Result<ResultSet> {
    Ok(run_query(query, client)
        .await?
        .into_iter()
        .next()
        .unwrap_or_default())
}

pub async fn collect_result_sets(stream: tiberius::QueryStream<'_>) -> Result<Vec<ResultSet>> {
    let result_sets = stream
        .into_results()
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    let mut output = Vec::new();

    for rows in result_sets {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| Column {
                        name: col.name().to_string(),
                        data_type: None,
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let converted_rows = rows
            .into_iter()
            .map(|row| row.cells().map(|(_, data)| map_column_data(data)).collect())
            .collect();

        output.push(ResultSet {
            columns,
            rows: converted_rows,
        });
    }

    Ok(output)
}

// Catalog queries only return names, type names, and module text; anything
// else is carried as its display form.
fn map_column_data(data: &tiberius::ColumnData<'_>) -> Value {
    use tiberius::ColumnData::*;
    match data {
        U8(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I16(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I32(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        I64(value) => value.map(Value::Int).unwrap_or(Value::Null),
        F32(value) => value.map(|v| Value::Float(v as f64)).unwrap_or(Value::Null),
        F64(value) => value.map(Value::Float).unwrap_or(Value::Null),
        Bit(value) => value.map(Value::Bool).unwrap_or(Value::Null),
        String(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Guid(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Numeric(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        Xml(value) => value
            .as_ref()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        other => Value::Text(format!("{:?}", other)),
    }
}
