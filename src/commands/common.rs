use anyhow::Result;

use crate::cli::CliArgs;
use crate::config::OutputFormat;
use crate::config::{self, CliOverrides, ResolvedConfig};
use crate::error::{AppError, ErrorKind};
use crate::output;

pub fn overrides_from_args(args: &CliArgs) -> CliOverrides {
    CliOverrides {
        config_path: args.config_path.clone(),
        env_file: args.env_file.clone(),
        profile: args.profile.clone(),
        server: args.server.clone(),
        port: args.port,
        database: args.database.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        timeout_ms: args.timeout_ms,
        encrypt: args.encrypt,
        trust_cert: args.trust_cert,
        schema: None,
    }
}

pub fn load_config(args: &CliArgs) -> Result<ResolvedConfig> {
    load_with_overrides(&overrides_from_args(args))
}

pub fn load_with_overrides(overrides: &CliOverrides) -> Result<ResolvedConfig> {
    config::load_from_system(overrides)
        .map_err(|err| AppError::new(ErrorKind::Config, format!("{err:#}")).into())
}

pub fn output_format(args: &CliArgs, resolved: &ResolvedConfig) -> OutputFormat {
    output::select_format(&args.output, &resolved.settings)
}

pub fn json_pretty(resolved: &ResolvedConfig) -> bool {
    resolved.settings.output.json_pretty
}
