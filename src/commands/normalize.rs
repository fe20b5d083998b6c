use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};

use crate::cli::{CliArgs, NormalizeArgs};
use crate::diff::normalize;
use crate::output::json;

pub fn run(args: &CliArgs, cmd: &NormalizeArgs) -> Result<()> {
    let text = match &cmd.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read routine text from stdin")?;
            buf
        }
    };

    if args.quiet {
        return Ok(());
    }

    let normalized = normalize(&text);
    if args.output.json {
        let payload = serde_json::json!({ "normalized": normalized });
        println!("{}", json::emit_json_value(&payload, true)?);
    } else {
        println!("{normalized}");
    }
    Ok(())
}
