use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn encode_auto_detects_json() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    write_file(&input, r#"{"name":"Ada","age":37,"langs":["en","fr"]}"#);

    cargo_bin_cmd!("cfgbind")
        .arg(&input)
        .assert()
        .success()
        .stdout("name = Ada\nage = 37\nlangs[0] = en\nlangs[1] = fr\n");
}

#[test]
fn decode_by_default() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.cfg");
    write_file(&input, "Name = Ada\n  name = Grace\nbio = {\n  line one\n}\n");

    let expected = "{\n  \"Name\": \"Grace\",\n  \"bio\": \"  line one\"\n}\n";

    cargo_bin_cmd!("cfgbind")
        .arg(&input)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn decode_indexed_keys_as_arrays() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.cfg");
    write_file(&input, "kids[1] = b\nkids[0] = a\n");

    cargo_bin_cmd!("cfgbind")
        .arg(&input)
        .args(["--indent", "0"])
        .assert()
        .success()
        .stdout("{\"kids\":[\"a\",\"b\"]}\n");
}

#[test]
fn encode_from_stdin_when_forced() {
    cargo_bin_cmd!("cfgbind")
        .arg("--encode")
        .arg("--compact")
        .write_stdin(r#"{"a":{"b":true}}"#)
        .assert()
        .success()
        .stdout("a.b=true\n");
}

#[test]
fn get_prints_last_value() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.cfg");
    write_file(&input, "Man.Best friend = Penny\nman.best FRIEND = Amy\n");

    cargo_bin_cmd!("cfgbind")
        .arg(&input)
        .args(["--get", "man.best friend"])
        .assert()
        .success()
        .stdout("Amy\n");
}

#[test]
fn all_prints_every_value() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.cfg");
    write_file(&input, "a = 1\nb = 0\na = 2\n");

    cargo_bin_cmd!("cfgbind")
        .arg(&input)
        .args(["--all", "A"])
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn get_missing_key_fails() {
    cargo_bin_cmd!("cfgbind")
        .args(["--get", "nope"])
        .write_stdin("a = 1")
        .assert()
        .failure()
        .stderr(contains("no value for `nope`"));
}

#[test]
fn encode_rejects_top_level_array() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    write_file(&input, "[1, 2]");

    cargo_bin_cmd!("cfgbind")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("ERROR"));
}

#[test]
fn writes_to_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    let output = dir.path().join("output.cfg");
    write_file(&input, r#"{"name":"Ada"}"#);

    cargo_bin_cmd!("cfgbind")
        .arg(&input)
        .args(["-o", output.to_str().expect("output path")])
        .assert()
        .success()
        .stdout("");

    let contents = fs::read_to_string(&output).expect("read output");
    assert_eq!(contents, "name = Ada\n");
}
