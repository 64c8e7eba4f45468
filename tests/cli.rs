use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn filegather() -> Command {
    let mut cmd = Command::cargo_bin("filegather").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn three_folder_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("root");
    write(&root.join("a/x.ipt"), "from a");
    write(&root.join("b/x.ipt"), "from b");
    write(&root.join("c/y.txt"), "text");
    temp_dir
}

#[test]
fn gathers_into_root_with_numbered_duplicates() {
    let temp_dir = three_folder_tree();
    let root = temp_dir.path().join("root");

    filegather()
        .arg(&root)
        .args(["-e", "ipt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 file(s) with extension '.ipt'"))
        .stdout(predicate::str::contains("x_1.ipt"));

    assert_eq!(fs::read_to_string(root.join("x.ipt")).unwrap(), "from a");
    assert_eq!(fs::read_to_string(root.join("x_1.ipt")).unwrap(), "from b");
    assert!(!root.join("a/x.ipt").exists());
    assert!(!root.join("b/x.ipt").exists());
    assert!(root.join("c/y.txt").exists());
}

#[test]
fn gathers_into_new_destination() {
    let temp_dir = three_folder_tree();
    let root = temp_dir.path().join("root");
    let dest = temp_dir.path().join("collected/parts");

    filegather()
        .arg(&root)
        .args(["--extension", ".ipt", "--destination"])
        .arg(&dest)
        .assert()
        .success();

    assert!(dest.join("x.ipt").exists());
    assert!(dest.join("x_1.ipt").exists());
    assert!(!root.join("x.ipt").exists());
}

#[test]
fn missing_root_exits_3_and_creates_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("dest");

    filegather()
        .arg(temp_dir.path().join("missing"))
        .args(["-e", "ipt", "-d"])
        .arg(&dest)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("does not exist"));

    assert!(!dest.exists());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn no_matches_is_success() {
    let temp_dir = three_folder_tree();
    let root = temp_dir.path().join("root");

    filegather()
        .arg(&root)
        .args(["-e", "step"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No files with extension '.step' found"));

    assert!(root.join("a/x.ipt").exists());
    assert!(root.join("c/y.txt").exists());
}

#[test]
fn invalid_extension_exits_4() {
    let temp_dir = three_folder_tree();

    filegather()
        .arg(temp_dir.path().join("root"))
        .args(["-e", "."])
        .assert()
        .code(4);
}

#[test]
fn dry_run_moves_nothing() {
    let temp_dir = three_folder_tree();
    let root = temp_dir.path().join("root");
    let dest = temp_dir.path().join("dest");

    filegather()
        .arg(&root)
        .args(["-e", "ipt", "--dry-run", "-d"])
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("would move"))
        .stdout(predicate::str::contains("x_1.ipt"));

    assert!(root.join("a/x.ipt").exists());
    assert!(root.join("b/x.ipt").exists());
    assert!(!dest.exists());
}

#[test]
fn json_output_ends_with_report() {
    let temp_dir = three_folder_tree();
    let root = temp_dir.path().join("root");

    let output = filegather()
        .arg(&root)
        .args(["-e", "ipt", "--output-format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let last_line = stdout.lines().last().unwrap();
    let report: serde_json::Value = serde_json::from_str(last_line).unwrap();

    assert_eq!(report["extension"], ".ipt");
    assert_eq!(report["summary"]["files_found"], 2);
    assert_eq!(report["summary"]["moved"], 2);
    assert_eq!(report["summary"]["failed"], 0);
    assert_eq!(report["outcomes"][0]["status"], "moved");

    for line in stdout.lines() {
        assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
    }
}

#[test]
fn extension_from_config_file() {
    let temp_dir = three_folder_tree();
    let root = temp_dir.path().join("root");
    let config = temp_dir.path().join("gather.toml");
    fs::write(&config, "[search]\nextension = \"txt\"\n").unwrap();

    filegather()
        .arg(&root)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(root.join("y.txt").exists());
    assert!(root.join("a/x.ipt").exists());
}

#[test]
fn exclude_skips_named_folders() {
    let temp_dir = three_folder_tree();
    let root = temp_dir.path().join("root");

    filegather()
        .arg(&root)
        .args(["-e", "ipt", "--exclude", "b"])
        .assert()
        .success();

    assert!(root.join("x.ipt").exists());
    assert!(!root.join("x_1.ipt").exists());
    assert!(root.join("b/x.ipt").exists());
}

#[test]
fn generate_config_writes_sample() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("filegather.toml");

    filegather()
        .arg("--generate-config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = fs::read_to_string(&config).unwrap();
    assert!(content.contains("[search]"));
    assert!(content.contains("[output]"));
}

#[test]
fn quiet_and_verbose_conflict() {
    filegather().args(["-q", "-v"]).assert().code(1);
}
