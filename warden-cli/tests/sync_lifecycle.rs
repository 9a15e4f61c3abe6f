//! End-to-end check/sync lifecycle through the `warden` binary.
//!
//! Domain scripts are shell stubs (run with `--runtime sh`) so the tests
//! need no Python interpreter.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn warden() -> Command {
    Command::cargo_bin("warden").expect("warden binary")
}

fn write_script(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

/// All four built-in domains, each with a succeeding self-contained or
/// fallback script.
fn seed_repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_script(root, "skills/skill-a/SKILL.md", "# skill-a\n");
    write_script(root, "skills/scripts/sync.py", "exit 0\n");
    write_script(root, "commands/do.md", "# do\n");
    write_script(root, "commands/scripts/sync.py", "exit 0\n");
    write_script(root, "hooks/entry.py", "true\n");
    write_script(root, "hooks/sync.py", "exit 0\n");
    // mcp-servers stays absent; it is optional.
    tmp
}

fn run(root: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = warden();
    cmd.arg("--root").arg(root).arg("--runtime").arg("sh");
    cmd.args(args);
    cmd.assert()
}

#[test]
fn check_sync_check_round_trip() {
    let repo = seed_repo();

    run(repo.path(), &["check"])
        .code(1)
        .stdout(predicate::str::contains("CHANGED"));

    run(repo.path(), &["sync"])
        .success()
        .stdout(predicate::str::contains("succeeded"));
    assert!(repo.path().join(".warden/change_cache.json").exists());

    run(repo.path(), &["check"])
        .success()
        .stdout(predicate::str::contains("all domains in sync"));
}

#[test]
fn check_json_lists_changed_domains() {
    let repo = seed_repo();

    let assert = run(repo.path(), &["check", "--json"]).code(1);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let payload: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(payload["all_synced"], false);
    let changed: Vec<&str> = payload["changed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(changed.contains(&"hooks"));
    assert!(!changed.contains(&"mcp-servers"), "absent optional domain");
}

#[test]
fn sync_with_unknown_only_domain_exits_one() {
    let repo = seed_repo();

    run(repo.path(), &["sync", "--only", "bogus"])
        .code(1)
        .stderr(predicate::str::contains("unknown domain 'bogus'"));
    assert!(
        !repo.path().join(".warden/change_cache.json").exists(),
        "validation failure must do no work"
    );
}

#[test]
fn failing_handler_exits_two() {
    let repo = seed_repo();
    write_script(repo.path(), "hooks/sync.py", "echo broken >&2\nexit 1\n");

    run(repo.path(), &["sync", "--only", "hooks"])
        .code(2)
        .stdout(predicate::str::contains("handler(s) failed"));
}

#[test]
fn second_sync_is_a_no_op() {
    let repo = seed_repo();
    run(repo.path(), &["sync"]).success();

    run(repo.path(), &["sync"])
        .success()
        .stdout(predicate::str::contains("nothing to sync"));
}

#[test]
fn status_reports_lock_and_digests() {
    let repo = seed_repo();
    run(repo.path(), &["sync"]).success();

    run(repo.path(), &["status"])
        .success()
        .stdout(
            predicate::str::contains("COMPLETE")
                .and(predicate::str::contains("hooks"))
                .and(predicate::str::contains("Last sync:")),
        );
}
