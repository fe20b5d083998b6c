mod common;

use predicates::prelude::*;

#[test]
fn unsupported_out_extension_fails_before_connecting() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = common::schemadiff_in(dir.path());
    cmd.args(["snapshot", "--json", "--out", "schema.txt"])
        .args(["--server", "192.0.2.1", "--timeout", "100"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported snapshot file extension"))
        .stderr(predicate::str::contains("\"kind\": \"Snapshot\""));
    assert!(!dir.path().join("schema.txt").exists());
}
