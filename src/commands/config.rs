use std::io::{self, Write};

use anyhow::Result;

use crate::cli::CliArgs;
use crate::commands::common;
use crate::config::OutputFormat;
use crate::output::{TableOptions, json, table};

pub fn run(args: &CliArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    if args.quiet {
        return Ok(());
    }

    if format == OutputFormat::Json {
        let payload = json::config_to_json(&resolved);
        let body = json::emit_json_value(&payload, common::json_pretty(&resolved))?;
        println!("{}", body);
        return Ok(());
    }

    let connection = &resolved.connection;
    let mut rows = vec![
        (
            "configPath".to_string(),
            resolved
                .config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
        ),
        ("profileName".to_string(), resolved.profile_name.clone()),
        ("server".to_string(), connection.server.clone()),
        ("port".to_string(), connection.port.to_string()),
        ("database".to_string(), connection.database.clone()),
        ("schema".to_string(), connection.schema.clone()),
    ];
    if let Some(user) = &connection.user {
        rows.push(("user".to_string(), user.clone()));
    }
    rows.extend([
        (
            "password".to_string(),
            json::mask_password(connection.password.as_deref()),
        ),
        ("encrypt".to_string(), connection.encrypt.to_string()),
        ("trustCert".to_string(), connection.trust_cert.to_string()),
        ("timeoutMs".to_string(), connection.timeout_ms.to_string()),
        (
            "maxDurationMs".to_string(),
            resolved
                .settings
                .compare
                .max_duration_ms
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| "(none)".to_string()),
        ),
    ]);

    let rendered = table::render_key_value_table("Config", &rows, format, &TableOptions::default());
    writeln!(io::stdout(), "{}", rendered)?;
    Ok(())
}
