//! Binary tests for the bus-connector command line.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn properties_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write properties");
    file
}

fn bus_connector() -> Command {
    let mut cmd = Command::cargo_bin("bus-connector").expect("binary is built");
    cmd.env_remove("BUS_CONNECTOR_CONFIG").env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_check_configured_connector() {
    let file = properties_file(
        "events.server-url=tcp://broker:7222\n\
         events.queue=orders\n\
         events.topic=ignored\n",
    );

    bus_connector()
        .arg("--properties")
        .arg(file.path())
        .args(["--prefix", "events.", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configured"))
        .stdout(predicate::str::contains("queue://orders"))
        .stdout(predicate::str::contains("ignored").not());
}

#[test]
fn test_check_connector_configured_from_environment() {
    bus_connector()
        .env("BUS_CONNECTOR__SERVER_URL", "tcp://broker:7222")
        .env("BUS_CONNECTOR__QUEUE", "orders")
        .env("BUS_CONNECTOR__CONNECTION_ATTEMPT_COUNT", "6")
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Connector (no prefix): configured"))
        .stdout(predicate::str::contains("queue://orders"))
        .stdout(predicate::str::contains("count=6"));
}

#[test]
fn test_check_prefixed_connector_configured_from_environment() {
    bus_connector()
        .env("BUS_CONNECTOR__EVENTS__SERVER_URL", "tcp://broker:7222")
        .env("BUS_CONNECTOR__EVENTS__TOPIC", "logins")
        .args(["--prefix", "events.", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Connector events.: configured"))
        .stdout(predicate::str::contains("topic://logins"));
}

#[test]
fn test_check_unconfigured_connector() {
    let file = properties_file("events.queue=orders\n");

    bus_connector()
        .arg("--properties")
        .arg(file.path())
        .args(["--prefix", "events.", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));
}

#[test]
fn test_check_invalid_configuration_exit_code() {
    let file = properties_file(
        "events.server-url=tcp://broker:7222\n\
         events.connection-attempt-count=often\n",
    );

    bus_connector()
        .arg("--properties")
        .arg(file.path())
        .args(["--prefix", "events.", "check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("connection-attempt-count"));
}

#[test]
fn test_encode_from_stdin() {
    bus_connector()
        .arg("encode")
        .write_stdin(r#"{"type":"LOGOUT","session":null,"roles":[]}"#)
        .assert()
        .success()
        .stdout(predicate::str::diff("{\"type\":\"LOGOUT\"}\n"));
}

#[test]
fn test_encode_invalid_json_exit_code() {
    bus_connector()
        .arg("encode")
        .write_stdin("not json")
        .assert()
        .code(5);
}

#[test]
fn test_missing_properties_file_exit_code() {
    bus_connector()
        .args(["--properties", "/nonexistent/connector.properties", "check"])
        .assert()
        .code(4);
}
