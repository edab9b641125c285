//! Tests for the `textsplit` binary.

use std::io::Write;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_textsplit"))
        .args(args)
        .output()
        .expect("Failed to execute textsplit")
}

fn input_file(markup: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(markup.as_bytes()).expect("write markup");
    file
}

#[test]
fn test_split_words_from_file() {
    let file = input_file("<p>Hi there</p>");
    let path = file.path().to_str().unwrap();
    let output = run(&["--type", "words", "--tag", "span", "--aria", "none", "--revert", path]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"<p><span class="word">Hi</span> <span class="word">there</span></p>"#,
            "chars=0 words=2 lines=0",
            "<p>Hi there</p>",
        ]
    );
}

#[test]
fn test_selector_limits_targets() {
    let file = input_file(r#"<h1>Title here</h1><p class="lead">a b c</p>"#);
    let path = file.path().to_str().unwrap();
    let output = run(&["--selector", "p.lead", "--type", "words", path]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<h1>Title here</h1>"));
    assert!(stdout.contains("chars=0 words=3 lines=0"));
}

#[test]
fn test_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("USAGE:"));
}

#[test]
fn test_usage_errors_exit_2() {
    for args in [
        &["--type", "letters"][..],
        &["--aria", "loud"][..],
        &["--width", "-3"][..],
        &["--mask"][..],
        &["--bogus"][..],
    ] {
        let output = run(args);
        assert_eq!(output.status.code(), Some(2), "args: {args:?}");
    }
}

#[test]
fn test_missing_file_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.html");
    let output = run(&[missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("I/O error"));
}

#[test]
fn test_malformed_markup_is_recovered() {
    let file = input_file("<p>oops</div>");
    let output = run(&["--type", "words", "--tag", "span", "--aria", "none", file.path().to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(r#"<p><span class="word">oops</span></p>"#));
    assert!(stdout.contains("chars=0 words=1 lines=0"));
}
