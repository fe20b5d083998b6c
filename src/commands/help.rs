use std::io::{self, Write};

use anyhow::Result;

use crate::cli::build_cli;
use crate::error::{AppError, ErrorKind};

pub fn run(show_all: bool, command: Option<&str>) -> Result<()> {
    let mut cli = build_cli(show_all);

    match command {
        Some(name) => {
            let sub = cli.find_subcommand_mut(name).ok_or_else(|| {
                AppError::new(ErrorKind::Config, format!("Unknown command: {name}"))
            })?;
            sub.print_long_help()?;
        }
        None => cli.print_long_help()?,
    }

    io::stdout().flush()?;
    Ok(())
}
