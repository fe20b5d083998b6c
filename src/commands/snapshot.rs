use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tracing::info;

use crate::cli::{CliArgs, SnapshotArgs};
use crate::commands::common;
use crate::db::SqlServerProvider;
use crate::db::connection::apply_connection_string;
use crate::diff::{SnapshotFormat, capture};
use crate::error::{AppError, ErrorKind};

pub fn run(args: &CliArgs, cmd: &SnapshotArgs) -> Result<()> {
    let mut overrides = common::overrides_from_args(args);
    overrides.schema = cmd.schema.clone();
    let resolved = common::load_with_overrides(&overrides)?;

    let connection = match &cmd.connection {
        Some(raw) => apply_connection_string(&resolved.connection, raw).map_err(|err| {
            AppError::new(ErrorKind::Config, format!("Invalid connection string: {err}"))
        })?,
        None => resolved.connection,
    };
    let schema = cmd.schema.clone().unwrap_or_else(|| connection.schema.clone());

    // Reject an unusable --out before opening a connection.
    let out = match cmd.out.as_deref() {
        Some(path) if path != Path::new("-") => Some((path, SnapshotFormat::from_path(path)?)),
        _ => None,
    };

    let rt = Runtime::new()?;
    let snapshot = rt.block_on(async {
        let mut provider = SqlServerProvider::connect(&connection).await?;
        capture(&mut provider, &schema).await
    })?;
    info!(
        schema = %snapshot.schema,
        tables = snapshot.tables.len(),
        routines = snapshot.routines.len(),
        "captured snapshot"
    );

    match out {
        Some((path, format)) => {
            let body = snapshot.render(format)?;
            fs::write(path, body)
                .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
            if !args.quiet {
                eprintln!("Wrote snapshot of '{}' to {}", schema, path.display());
            }
        }
        None => {
            let body = snapshot.render(SnapshotFormat::Json)?;
            writeln!(io::stdout(), "{}", body)?;
        }
    }
    Ok(())
}
