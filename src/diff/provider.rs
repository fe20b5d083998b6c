use std::future::Future;

use anyhow::Result;

use super::model::{ColumnDescriptor, RoutineDescriptor};

/// Read-only access to one database's catalog.
///
/// Every call is scoped to a single schema and must fail loudly: an error is
/// returned instead of a partial or empty list when the catalog cannot be
/// read. A table the schema does not contain yields an empty column list.
pub trait MetadataProvider {
    fn list_tables(&mut self, schema: &str) -> impl Future<Output = Result<Vec<String>>>;

    fn list_columns(
        &mut self,
        schema: &str,
        table: &str,
    ) -> impl Future<Output = Result<Vec<ColumnDescriptor>>>;

    fn list_routines(
        &mut self,
        schema: &str,
    ) -> impl Future<Output = Result<Vec<RoutineDescriptor>>>;
}
