mod common;

use predicates::prelude::*;

#[test]
fn config_command_emits_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = common::schemadiff_in(dir.path());
    cmd.args(["config", "--json"])
        .env("SQL_SERVER", "env-host")
        .env("SQL_DATABASE", "env-db")
        .env("SQL_USER", "env-user")
        .env("SQL_PASSWORD", "env-pass")
        .env("SQL_SCHEMA", "sales");

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");

    assert_eq!(value["connection"]["server"], "env-host");
    assert_eq!(value["connection"]["database"], "env-db");
    assert_eq!(value["connection"]["user"], "env-user");
    assert_eq!(value["connection"]["password"], "********");
    assert_eq!(value["connection"]["schema"], "sales");
}

#[test]
fn config_reads_profile_from_local_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir_all(dir.path().join(".schemadiff")).expect("mkdir");
    common::write_file(
        &dir.path().join(".schemadiff"),
        "config.yaml",
        "defaultProfile: staging\nprofiles:\n  staging:\n    server: stage-host\n    schema: app\n",
    );

    let mut cmd = common::schemadiff_in(dir.path());
    cmd.args(["config", "--json"])
        .env_remove("SQL_SERVER")
        .assert()
        .success()
        .stdout(predicate::str::contains("stage-host"))
        .stdout(predicate::str::contains("\"profileName\": \"staging\""));
}

#[test]
fn unknown_profile_reports_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = common::schemadiff_in(dir.path());
    cmd.args(["config", "--json", "--profile", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"kind\": \"Config\""));
}
