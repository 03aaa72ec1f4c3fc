use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_shapejson");
    let mut cmd = Command::new(exe);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_input(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write input");
    path.to_str().expect("utf8 path").to_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn fmt_minifies() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(temp.path(), "doc.json", "{\n  \"a\" : [ 1, 2 ],\n  \"b\": \"c\\nd\"\n}\n");

    let output = cmd().args(["fmt", &input]).output().expect("fmt");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "{\"a\":[1,2],\"b\":\"c\\nd\"}\n");
}

#[test]
fn fmt_applies_shape_expressions() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(temp.path(), "map.json", r#"{"01": "true", "2": false}"#);

    let output = cmd()
        .args(["fmt", &input, "--shape", "map<i32, bool>"])
        .output()
        .expect("fmt");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "{\"1\":true,\"2\":false}\n");

    let output = cmd().args(["fmt", &input]).output().expect("fmt");
    assert_eq!(stdout(&output), "{\"01\":\"true\",\"2\":false}\n");
}

#[test]
fn fmt_reads_stdin() {
    let mut child = cmd()
        .args(["fmt", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b" [ 1 , \"two\" , null ] ")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "[1,\"two\",null]\n");
}

#[test]
fn check_accepts_valid_documents() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(temp.path(), "dates.json", r#"["2020-01-01T00:00:00.000Z"]"#);

    let output = cmd()
        .args(["check", &input, "--shape", "list<datetime>"])
        .output()
        .expect("check");
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).ends_with(": ok\n"));
}

#[test]
fn check_reports_errors_and_fails() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(temp.path(), "broken.json", r#"{"a":1"#);

    let output = cmd().args(["check", &input]).output().expect("check");
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("expected `,` or `}`"), "{err}");
    assert!(err.contains("failed to parse"), "{err}");

    let dates = write_input(temp.path(), "dates.json", r#"["soon"]"#);
    let output = cmd()
        .args(["check", &dates, "--shape", "list<datetime>"])
        .output()
        .expect("check");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("`soon` is not a date"));
}

#[test]
fn trailing_characters_are_rejected() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(temp.path(), "two.json", "1 2");

    let output = cmd().args(["check", &input]).output().expect("check");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unexpected characters after the JSON value"));
}

#[test]
fn invalid_shape_expressions_are_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(temp.path(), "list.json", "[1.5]");

    let output = cmd()
        .args(["fmt", &input, "--shape", "list<float>"])
        .output()
        .expect("fmt");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown shape `float`"));
}

#[test]
fn missing_input_file() {
    let output = cmd()
        .args(["check", "definitely-not-here.json"])
        .output()
        .expect("check");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to read file `definitely-not-here.json`"));
}

#[test]
fn config_file_sets_defaults() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_input(
        temp.path(),
        "shapejson.toml",
        "max_depth = 2\ndefault_shape = \"list<list<u8>>\"\n",
    );
    let shallow = write_input(temp.path(), "shallow.json", r#"[["1", 2]]"#);
    let deep = write_input(temp.path(), "deep.json", "[[[1]]]");

    let output = cmd()
        .current_dir(temp.path())
        .args(["fmt", &shallow])
        .output()
        .expect("fmt");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "[[1,2]]\n");

    let output = cmd()
        .current_dir(temp.path())
        .args(["check", &deep])
        .output()
        .expect("check");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nesting exceeds the maximum depth of 2"));
}

#[test]
fn explicit_config_must_exist() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(temp.path(), "doc.json", "[]");
    let missing = temp.path().join("nope.toml");

    let output = cmd()
        .args(["--config", missing.to_str().unwrap(), "check", &input])
        .output()
        .expect("check");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn bound_only_drops_unmapped_record_fields() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write_input(
        temp.path(),
        "record.json",
        r#"{"id": "7", "Name": "x", "note": [1], "extra": true}"#,
    );
    let shape = r#"record{@id: u64, @name = "Name": string, note: any}"#;

    let output = cmd()
        .args(["fmt", &input, "--shape", shape])
        .output()
        .expect("fmt");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "{\"id\":7,\"Name\":\"x\",\"note\":[1]}\n");

    let output = cmd()
        .args(["fmt", &input, "--shape", shape, "--bound-only"])
        .output()
        .expect("fmt");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "{\"id\":7,\"Name\":\"x\"}\n");

    write_input(temp.path(), "shapejson.toml", "bound_fields_only = true\n");
    let output = cmd()
        .current_dir(temp.path())
        .args(["fmt", &input, "--shape", shape])
        .output()
        .expect("fmt");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "{\"id\":7,\"Name\":\"x\"}\n");
}
