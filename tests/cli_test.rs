//! CLI Integration Tests
//! Run with: cargo test --test cli_test

use std::process::{Command, Output};

fn bot(dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aisatsu-bot"))
        .args(args)
        .current_dir(dir)
        .env_remove("BOT_TOKEN")
        .env_remove("CLIENT_ID")
        .env_remove("GUILD_ID")
        .env_remove("RUST_LOG")
        .output()
        .expect("Should run aisatsu-bot")
}

/// init-config prints YAML that parses back with the default greeting command
#[test]
fn test_init_config_prints_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let output = bot(dir.path(), &["init-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let yaml = stdout
        .split("\nSave this to config.yaml")
        .next()
        .unwrap();

    let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("Should be valid YAML");
    assert_eq!(value["commands"]["greeting"]["name"].as_str(), Some("おはよう"));
    assert_eq!(value["commands"]["fallback-reply"].as_str(), Some("An error occurred, sorry."));
    assert_eq!(value["welcome"]["image-enabled"].as_bool(), Some(true));
}

#[test]
fn test_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = bot(dir.path(), &["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("aisatsu-bot v"));
}

/// Without a token, run and deploy-commands fail before touching the network
#[test]
fn test_missing_token_fails() {
    let dir = tempfile::tempdir().unwrap();

    for command in ["run", "deploy-commands"] {
        let output = bot(dir.path(), &[command]);
        assert_eq!(output.status.code(), Some(1), "{} should fail", command);
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.contains("Missing required field"), "{}: {}", command, stdout);
    }
}

/// deploy-commands also needs the application and guild ids
#[test]
fn test_deploy_requires_ids() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "discord:\n  token: abc\n").unwrap();

    let output = bot(dir.path(), &["deploy-commands"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("application-id"), "{}", stdout);
}
