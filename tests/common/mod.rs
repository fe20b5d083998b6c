#![allow(dead_code)]

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;

pub fn integration_enabled() -> bool {
    env::var("SCHEMADIFF_INTEGRATION_TESTS")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// A `schemadiff` invocation isolated from any `.env` or `.schemadiff/`
/// found around the crate.
pub fn schemadiff_in(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("schemadiff");
    cmd.current_dir(dir)
        .env_remove("DATABASE_URL")
        .env_remove("SCHEMADIFF_CONFIG")
        .env_remove("SCHEMADIFF_PROFILE")
        .env_remove("SQL_SCHEMA")
        .env("NO_COLOR", "1");
    cmd
}

pub fn run_json<I, S>(args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = cargo_bin_cmd!("schemadiff");
    cmd.args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json")
}

pub fn write_file(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write file");
    path
}

pub const USERS_SOURCE: &str = r#"{
  "schema": "dbo",
  "tables": [
    { "name": "users", "columns": [
      { "name": "id", "dataType": "int" },
      { "name": "name", "dataType": "text" }
    ] },
    { "name": "orders", "columns": [ { "name": "id", "dataType": "int" } ] }
  ],
  "routines": [
    { "name": "get_user", "definition": "SELECT 1; -- comment" }
  ]
}"#;

pub const USERS_TARGET: &str = r#"{
  "schema": "dbo",
  "tables": [
    { "name": "users", "columns": [
      { "name": "id", "dataType": "int" },
      { "name": "name", "dataType": "varchar" },
      { "name": "email", "dataType": "varchar" }
    ] }
  ],
  "routines": [
    { "name": "get_user", "definition": "SELECT   1;" },
    { "name": "new_fn", "definition": "SELECT 2" }
  ]
}"#;
