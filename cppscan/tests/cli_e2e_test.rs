//! End-to-end tests running the cppscan binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cppscan(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cppscan"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("CPPSCAN_CONFIG")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute cppscan: {e}"))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let output = run_cppscan(dir.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["tokenize", "enums", "enum-to-string", "add-flashstr", "find-strings"] {
        assert!(text.contains(command), "help should mention {command}: {text}");
    }
}

#[test]
fn test_enums_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("e.h"), "enum class E : uint8_t { kA, kB = 3 };\n").unwrap();

    let output = run_cppscan(dir.path(), &["enums", "e.h", "--format", "json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value[0]["file"], "e.h");
    assert_eq!(value[0]["enums"][0]["definition"]["underlying_type"], "uint8_t");
    assert_eq!(value[0]["enums"][0]["maximum_value"], 3);
}

#[test]
fn test_config_file_is_found_in_ancestor() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("cppscan.toml"),
        "[general]\nenum_name_pattern = \"^Keep\"\n",
    )
    .unwrap();
    let nested = dir.path().join("src");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("e.h"), "enum KeepMe { kA };\nenum DropMe { kB };\n").unwrap();

    let output = run_cppscan(&nested, &["enums", "e.h"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("enum KeepMe"));
    assert!(!text.contains("DropMe"));
}

#[test]
fn test_add_flashstr_rewrites_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.cc");
    fs::write(&path, "void f() { TAS_DCHECK(ok) << \"oops\"; }\n").unwrap();

    let output = run_cppscan(dir.path(), &["add-flashstr", "."]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "void f() { TAS_DCHECK(ok) << FLASHSTR(\"oops\"); }\n"
    );
}

#[test]
fn test_lex_error_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.cc"), "char c = '';\n").unwrap();

    let output = run_cppscan(dir.path(), &["tokenize", "bad.cc"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("empty character literal"), "stderr: {stderr}");
}

#[test]
fn test_missing_explicit_config_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("e.h"), "enum E { kA };\n").unwrap();

    let output = run_cppscan(dir.path(), &["-c", "missing.toml", "enums", "e.h"]);
    assert!(!output.status.success());
}
