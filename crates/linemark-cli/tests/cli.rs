use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_linemark"))
}

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write input");
    path
}

#[test]
fn converts_file_to_derived_html_name() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "notes.md", "# Title\n\nJust text.\n");

    let output = Command::new(bin_path())
        .arg(&input)
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let html = fs::read_to_string(dir.path().join("notes.html")).expect("derived output");
    assert_eq!(html, "<h1>Title</h1>\n<p>Just text.</p>\n");
}

#[test]
fn out_dir_receives_every_input() {
    let dir = TempDir::new().expect("tempdir");
    let site = dir.path().join("site");
    fs::create_dir(&site).expect("mkdir");
    let first = write_input(dir.path(), "a.md", "# A\n");
    let second = write_input(dir.path(), "b.md", "[b](/b)\n");

    let output = Command::new(bin_path())
        .arg("--out-dir")
        .arg(&site)
        .args([&first, &second])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    assert_eq!(
        fs::read_to_string(site.join("a.html")).expect("a.html"),
        "<h1>A</h1>\n"
    );
    assert_eq!(
        fs::read_to_string(site.join("b.html")).expect("b.html"),
        "<a href=\"/b\">b</a>\n"
    );
}

#[test]
fn stdin_converts_to_stdout() {
    let mut child = Command::new(bin_path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"See [docs](http://example.com) here\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success(), "expected success exit code");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<p>See <a href=\"http://example.com\">docs</a> here</p>\n"
    );
}

#[test]
fn malformed_line_is_skipped_and_reported() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(
        dir.path(),
        "bad.md",
        "ok\nA (oops [late] bracket)\nstill ok\n",
    );

    let output = Command::new(bin_path())
        .args(["--diagnostics", "pretty", "--stdout"])
        .arg(&input)
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<p>ok</p>\n<p>still ok</p>\n"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(":2:9 error E_LINK_MALFORMED"), "stderr: {}", stderr);
}

#[test]
fn diagnostics_json_lists_file_and_position() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "bad.md", "x [a(b](c)\n");

    let output = Command::new(bin_path())
        .args(["--quiet", "--diagnostics", "json", "--stdout"])
        .arg(&input)
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let value: serde_json::Value = serde_json::from_str(stderr.trim()).expect("json diagnostics");
    assert_eq!(value[0]["code"], "E_LINK_MALFORMED");
    assert_eq!(value[0]["line"], 1);
    assert_eq!(value[0]["column"], 5);
}

#[test]
fn lenient_flag_keeps_malformed_lines() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "bad.md", "x [a(b](c)\n");

    let output = Command::new(bin_path())
        .args(["--lenient", "--stdout"])
        .arg(&input)
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<p>x <a href=\"c\">a(b</a></p>\n"
    );
}

#[test]
fn link_policy_reads_environment() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "bad.md", "x [a(b](c)\n");

    let output = Command::new(bin_path())
        .env("LINEMARK_LINK_POLICY", "lenient")
        .arg("--stdout")
        .arg(&input)
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
}

#[test]
fn missing_input_does_not_stop_the_run() {
    let dir = TempDir::new().expect("tempdir");
    let good = write_input(dir.path(), "good.md", "fine\n");
    let missing = dir.path().join("missing.md");

    let output = Command::new(bin_path())
        .args([&missing, &good])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    assert!(!dir.path().join("missing.html").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("good.html")).expect("good.html"),
        "<p>fine</p>\n"
    );
}

#[test]
fn explicit_output_path_is_used() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "in.md", "## Two\n");
    let target = dir.path().join("custom.html");

    let output = Command::new(bin_path())
        .arg(&input)
        .arg("-o")
        .arg(&target)
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    assert_eq!(fs::read_to_string(&target).expect("custom"), "<h2>Two</h2>\n");
}

#[test]
fn output_equal_to_input_is_refused() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "notes.md", "# Keep me\n");

    let output = Command::new(bin_path())
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    assert_eq!(
        fs::read_to_string(&input).expect("input"),
        "# Keep me\n",
        "input must be left untouched"
    );
}

#[test]
fn derived_name_resolving_to_input_is_refused() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_input(dir.path(), "page.html", "Already here\n");

    let output = Command::new(bin_path())
        .current_dir(dir.path())
        .args(["--out-dir", ".", "page.html"])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    assert_eq!(fs::read_to_string(&input).expect("input"), "Already here\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("refusing to overwrite"), "stderr: {}", stderr);
}
