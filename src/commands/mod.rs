mod common;
mod compare;
mod completions;
mod config;
mod help;
mod normalize;
mod snapshot;

use anyhow::Result;

use crate::cli::{CliArgs, CommandKind};

pub fn dispatch(args: &CliArgs) -> Result<()> {
    match &args.command {
        CommandKind::Help { all, command } => help::run(*all, command.as_deref()),
        CommandKind::Compare(cmd) => compare::run(args, cmd),
        CommandKind::Snapshot(cmd) => snapshot::run(args, cmd),
        CommandKind::Normalize(cmd) => normalize::run(args, cmd),
        CommandKind::Config(_) => config::run(args),
        CommandKind::Completions(cmd) => completions::run(args, cmd),
    }
}
