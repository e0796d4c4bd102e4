use assert_cmd::Command;
use predicates::prelude::*;

fn shipsmart() -> Command {
    let mut cmd = Command::cargo_bin("shipsmart").unwrap();
    cmd.args(["--config", "/nonexistent/shipsmart.yaml", "--offline"])
        .env("NO_COLOR", "1")
        .env_remove("CEREBRAS_API_KEY");
    cmd
}

#[test]
fn test_classify_prefers_appointment() {
    shipsmart()
        .args(["classify", "hi, can I book an appointment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("appointment"));
}

#[test]
fn test_validate_rejects_gibberish() {
    shipsmart()
        .args(["validate", "asdfgh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid"));
}

#[test]
fn test_validate_accepts_question() {
    shipsmart()
        .args(["validate", "What does my plan cover?"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("valid"));
}

#[test]
fn test_doctors_lists_catalog() {
    shipsmart()
        .arg("doctors")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Dr. Sarah Johnson"))
        .stdout(predicate::str::contains("Dr. David Kim"));
}

#[test]
fn test_ask_json_transcript() {
    let output = shipsmart()
        .args(["ask", "hello", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let transcript: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(transcript["remote_failed"], false);
    assert_eq!(transcript["state"], "idle");
    let messages = transcript["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
}

#[test]
fn test_missing_subcommand_fails() {
    Command::cargo_bin("shipsmart")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
