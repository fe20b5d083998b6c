use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::db::connection::build_config;
use crate::error::{AppError, ErrorKind};

pub type SqlClient = tiberius::Client<Compat<TcpStream>>;

/// Open a client for one side of a comparison.
///
/// # Errors
///
/// Returns a `Config` error for unusable settings and a `Connection` error if
/// DNS resolution, TCP connect, or login fails, or if `timeout_ms` elapses
/// during either step.
pub async fn connect(settings: &ConnectionSettings) -> Result<SqlClient> {
    let config =
        build_config(settings).map_err(|err| AppError::new(ErrorKind::Config, err.to_string()))?;
    let limit = (settings.timeout_ms > 0).then(|| Duration::from_millis(settings.timeout_ms));
    debug!(
        server = settings.server.as_str(),
        port = settings.port,
        database = settings.database.as_str(),
        "connecting"
    );

    let tcp = with_limit(limit, "Connection", TcpStream::connect(config.get_addr()))
        .await?
        .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?;
    tcp.set_nodelay(true)?;

    let client = with_limit(limit, "Login", SqlClient::connect(config, tcp.compat_write()))
        .await?
        .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?;
    Ok(client)
}

// The outer Result reports an elapsed limit; the inner one is the step's own.
async fn with_limit<F: std::future::Future>(
    limit: Option<Duration>,
    step: &str,
    fut: F,
) -> Result<F::Output> {
    match limit {
        Some(duration) => timeout(duration, fut).await.map_err(|_| {
            AppError::new(
                ErrorKind::Connection,
                format!("{} timed out after {} ms", step, duration.as_millis()),
            )
            .into()
        }),
        None => Ok(fut.await),
    }
}
