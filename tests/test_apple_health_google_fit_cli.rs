use std::{fs, process::Command};
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_apple-health-google-fit"))
}

#[test]
fn test_parse_missing_input_exits_with_error() {
    let tempdir = TempDir::new().unwrap();
    let out = tempdir.path().join("weight.csv");

    let output = cli()
        .args(["parse", "-i", "tests/data/does_not_exist.xml", "-o"])
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Error: "), "{stdout}");
    assert!(stdout.contains("does not exist"), "{stdout}");
    assert!(!out.exists());
}

#[test]
fn test_import_without_data_exits_with_error() {
    let tempdir = TempDir::new().unwrap();
    let input = tempdir.path().join("weight.csv");
    fs::write(&input, "Date,Weight\n2023-01-01 08:00:00 +0000,abc\n").unwrap();

    let output = cli()
        .current_dir(tempdir.path())
        .args(["import", "-c", "CLIENT_ID", "-s", "SECRET", "-p", "123", "-i"])
        .arg(&input)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error: no data to import"), "{stdout}");
}

#[test]
fn test_missing_or_unknown_command_prints_help() {
    for args in [&[][..], &["bogus"][..]] {
        let output = cli().args(args).output().unwrap();
        assert_eq!(output.status.code(), Some(0), "{args:?}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Usage:"), "{stdout}");
    }
}
