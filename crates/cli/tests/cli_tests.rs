use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn schemalog() -> Command {
    let mut cmd = Command::cargo_bin("schemalog").unwrap();
    cmd.env_remove("SCHEMALOG_DB");
    cmd
}

fn db_arg(dir: &TempDir) -> String {
    dir.path().join("schema.db").display().to_string()
}

#[test]
fn test_cli_help() {
    schemalog()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reversible schema migrations"));
}

#[test]
fn test_cli_rollback_help() {
    schemalog()
        .args(["rollback", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("steps"));
}

#[test]
fn test_schema_at_head_has_no_counter() {
    schemalog()
        .args(["schema", "--table", "sentry_organizationmember"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"token\""))
        .stdout(predicate::str::contains("\"counter\"").not());
}

#[test]
fn test_schema_at_base_has_counter() {
    schemalog()
        .args(["schema", "--at", "270", "--table", "sentry_organizationmember"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"counter\""))
        .stdout(predicate::str::contains("bounded_positive_integer"));
}

#[test]
fn test_schema_unknown_table_or_id_fails() {
    schemalog().args(["schema", "--table", "nope"]).assert().failure();
    schemalog().args(["schema", "--at", "5"]).assert().failure();
}

#[test]
fn test_init_migrate_check_rollback() {
    let dir = TempDir::new().unwrap();
    let db = db_arg(&dir);

    schemalog()
        .args(["--db", &db, "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("270"));
    schemalog().args(["--db", &db, "init"]).assert().failure();
    schemalog().args(["--db", &db, "check"]).assert().success();

    schemalog()
        .args(["--db", &db, "migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"to\": 271"));
    schemalog()
        .args(["--db", &db, "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0271_del_field_organizationmember_counter"))
        .stdout(predicate::str::contains("\"applied_at\": null").not());
    schemalog().args(["--db", &db, "check"]).assert().success();

    schemalog()
        .args(["--db", &db, "rollback"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"to\": 270"));
    schemalog()
        .args(["--db", &db, "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"applied_at\": null"));
}

#[test]
fn test_check_on_empty_database_reports_drift() {
    let dir = TempDir::new().unwrap();
    let db = db_arg(&dir);
    schemalog()
        .args(["--db", &db, "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing_table"));
}

#[test]
fn test_migrate_unknown_target_fails() {
    let dir = TempDir::new().unwrap();
    let db = db_arg(&dir);
    schemalog().args(["--db", &db, "init"]).assert().success();
    schemalog()
        .args(["--db", &db, "migrate", "--to", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown migration target"));
}

#[test]
fn test_migrate_on_drifted_database_suggests_check() {
    let dir = TempDir::new().unwrap();
    let db = db_arg(&dir);
    schemalog().args(["--db", &db, "init"]).assert().success();

    let conn = rusqlite::Connection::open(&db).unwrap();
    conn.execute_batch("ALTER TABLE sentry_organizationmember DROP COLUMN counter").unwrap();
    drop(conn);

    schemalog()
        .args(["--db", &db, "migrate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("schemalog check"))
        .stderr(predicate::str::contains("column not found"));
}
