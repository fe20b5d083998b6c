use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::runtime::Runtime;
use tracing::{error, info};

use crate::cli::{CliArgs, CompareArgs, SideArgs};
use crate::commands::common;
use crate::config::{CliOverrides, ConnectionSettings, OutputFormat, ResolvedConfig};
use crate::db::SqlServerProvider;
use crate::db::connection::apply_connection_string;
use crate::diff::{
    ColumnDescriptor, DiffResult, MetadataProvider, RoutineDescriptor, SchemaSnapshot, compare,
};
use crate::error::{AppError, CompareError, ErrorKind};
use crate::output::{json, report};

/// Exit status reported when the schemas differ.
const DRIFT_EXIT_CODE: i32 = 3;

/// One resolved side of a comparison, before any connection is opened.
#[derive(Debug, Clone)]
enum SideSource {
    Live(ConnectionSettings),
    Snapshot(SchemaSnapshot),
}

#[derive(Debug, Clone)]
struct Side {
    label: String,
    schema: String,
    source: SideSource,
}

/// Either a live catalog or a loaded snapshot.
enum SideProvider {
    Live(Box<SqlServerProvider>),
    Snapshot(SchemaSnapshot),
}

impl SideProvider {
    async fn open(source: SideSource) -> Result<Self> {
        match source {
            SideSource::Live(settings) => Ok(SideProvider::Live(Box::new(
                SqlServerProvider::connect(&settings).await?,
            ))),
            SideSource::Snapshot(snapshot) => Ok(SideProvider::Snapshot(snapshot)),
        }
    }
}

impl MetadataProvider for SideProvider {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        match self {
            SideProvider::Live(provider) => provider.list_tables(schema).await,
            SideProvider::Snapshot(snapshot) => snapshot.list_tables(schema).await,
        }
    }

    async fn list_columns(&mut self, schema: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        match self {
            SideProvider::Live(provider) => provider.list_columns(schema, table).await,
            SideProvider::Snapshot(snapshot) => snapshot.list_columns(schema, table).await,
        }
    }

    async fn list_routines(&mut self, schema: &str) -> Result<Vec<RoutineDescriptor>> {
        match self {
            SideProvider::Live(provider) => provider.list_routines(schema).await,
            SideProvider::Snapshot(snapshot) => snapshot.list_routines(schema).await,
        }
    }
}

/// Execute the `compare` command: resolve both sides, diff them, and report drift.
pub fn run(args: &CliArgs, cmd: &CompareArgs) -> Result<()> {
    let base_overrides = common::overrides_from_args(args);
    let base = common::load_with_overrides(&base_overrides)?;

    let source = resolve_side(&base_overrides, &cmd.source, "source")?;
    let target = resolve_side(&base_overrides, &cmd.target, "target")?;

    let max_duration_ms = cmd
        .max_duration_ms
        .or(base.settings.compare.max_duration_ms)
        .filter(|ms| *ms > 0);
    let show_diff = cmd.show_diff || base.settings.compare.show_diff;

    let rt = Runtime::new()?;
    let outcome = rt.block_on(run_comparison(&source, &target, max_duration_ms));
    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            error!("{:#}", err.cause());
            return Err(err.into());
        }
    };

    let drifted = result.has_drift();
    info!(drifted, source = %source.label, target = %target.label, "drift check done");
    emit(args, cmd, &base, &source, &target, &result, show_diff)?;

    if drifted {
        std::process::exit(DRIFT_EXIT_CODE);
    }
    Ok(())
}

async fn run_comparison(
    source: &Side,
    target: &Side,
    max_duration_ms: Option<u64>,
) -> Result<DiffResult, CompareError> {
    let work = async {
        let (mut left, mut right) = tokio::try_join!(
            SideProvider::open(source.source.clone()),
            SideProvider::open(target.source.clone()),
        )
        .map_err(CompareError::new)?;
        compare(&mut left, &source.schema, &mut right, &target.schema).await
    };

    with_deadline(max_duration_ms, work).await
}

/// Bound a comparison by `max_duration_ms`. Expiry drops the outstanding
/// fetches and yields a `Timeout` failure instead of a result.
async fn with_deadline<F>(max_duration_ms: Option<u64>, work: F) -> Result<DiffResult, CompareError>
where
    F: Future<Output = Result<DiffResult, CompareError>>,
{
    let Some(ms) = max_duration_ms else {
        return work.await;
    };
    tokio::time::timeout(Duration::from_millis(ms), work)
        .await
        .unwrap_or_else(|_| {
            Err(CompareError::new(
                AppError::new(
                    ErrorKind::Timeout,
                    format!("Comparison timed out after {ms} ms"),
                )
                .into(),
            ))
        })
}

fn resolve_side(base: &CliOverrides, side: &SideArgs, name: &str) -> Result<Side> {
    if let Some(path) = &side.snapshot {
        let snapshot = SchemaSnapshot::load(path)?;
        let schema = side
            .schema
            .clone()
            .unwrap_or_else(|| snapshot.schema.clone());
        return Ok(Side {
            label: path.display().to_string(),
            schema,
            source: SideSource::Snapshot(snapshot),
        });
    }

    let resolved = resolve_profile(base, side.profile.as_deref())?;
    let connection = match &side.connection {
        Some(raw) => apply_connection_string(&resolved.connection, raw).map_err(|err| {
            AppError::new(
                ErrorKind::Config,
                format!("Invalid {name} connection string: {err}"),
            )
        })?,
        None => resolved.connection,
    };
    let schema = side
        .schema
        .clone()
        .unwrap_or_else(|| connection.schema.clone());

    Ok(Side {
        label: format!("{}/{}", resolved.profile_name, connection.database),
        schema,
        source: SideSource::Live(connection),
    })
}

fn resolve_profile(base: &CliOverrides, profile: Option<&str>) -> Result<ResolvedConfig> {
    let mut overrides = base.clone();
    if let Some(profile) = profile {
        overrides.profile = Some(profile.to_string());
    }
    common::load_with_overrides(&overrides)
}

fn emit(
    args: &CliArgs,
    cmd: &CompareArgs,
    resolved: &ResolvedConfig,
    source: &Side,
    target: &Side,
    result: &DiffResult,
    show_diff: bool,
) -> Result<()> {
    if args.quiet {
        return Ok(());
    }

    let format = common::output_format(args, resolved);
    let pretty = common::json_pretty(resolved);

    if format == OutputFormat::Json {
        let body = if cmd.summary {
            json::emit_json(&result.counts(), pretty)?
        } else {
            json::emit_json(result, pretty)?
        };
        println!("{body}");
        return Ok(());
    }

    println!(
        "{}.{} -> {}.{}",
        source.label, source.schema, target.label, target.schema
    );
    println!("{}", report::render_counts_table(&result.counts(), format));
    if cmd.summary {
        return Ok(());
    }

    if let Some(drift) = report::render_drift_table(result, format) {
        println!();
        println!("{drift}");
    }
    if show_diff && !result.function_differences.is_empty() {
        println!();
        println!(
            "{}",
            report::render_routine_diffs(result, &source.label, &target.label)
        );
    }
    Ok(())
}
