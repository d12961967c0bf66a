// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests that run the compiled `switchboard` binary.

use std::io::Write;
use std::process::Command;

fn switchboard() -> Command {
    Command::new(env!("CARGO_BIN_EXE_switchboard"))
}

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn check_json_reports_channels() {
    let file = config_file(
        r#"
[hub]
name = "e2e"

[server]
port = 4040

[[channels]]
id = "telegram-main"
platform = "telegram"
name = "Main bot"
credentials = { bot_token = "123:SECRET" }
"#,
    );

    let output = switchboard()
        .args(["check", "--json", "--config"])
        .arg(file.path())
        .output()
        .expect("run switchboard");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("123:SECRET"));

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["name"], "e2e");
    assert_eq!(report["server"], "127.0.0.1:4040");
    assert_eq!(report["channels"][0]["id"], "telegram-main");
    assert_eq!(report["channels"][0]["platform"], "telegram");
    assert_eq!(report["channels"][0]["credentials"][0], "bot_token");
}

#[test]
fn invalid_config_exits_nonzero_with_diagnostic() {
    let file = config_file(
        r#"
[[channels]]
id = "bad:id"
platform = "discord"
name = "Bad"
"#,
    );

    let output = switchboard()
        .args(["check", "--config"])
        .arg(file.path())
        .output()
        .expect("run switchboard");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not contain"), "stderr: {stderr}");
}

#[test]
fn typo_in_config_suggests_fix() {
    let file = config_file(
        r#"
[server]
bind_adress = "0.0.0.0"
"#,
    );

    let output = switchboard()
        .args(["check", "--config"])
        .arg(file.path())
        .output()
        .expect("run switchboard");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bind_adress"), "stderr: {stderr}");
    assert!(stderr.contains("bind_address"), "stderr: {stderr}");
}
