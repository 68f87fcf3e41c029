#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use assert_cmd::{assert::Assert, cargo::cargo_bin_cmd};
use serde_json::Value;
use tempfile::TempDir;

/// Variables that would otherwise leak from the developer's shell into a run.
const CONFIG_VARS: &[&str] = &[
    "PART",
    "TEST",
    "PROJECT_NAME",
    "REPOSITORY_NAME",
    "SKYNET_PYTHON",
    "SKYNET_BUMPVERSION",
    "SKYNET_TWINE",
    "SKYNET_FORMATTER",
    "PYTHONPATH",
    "NO_COLOR",
];

pub fn skynet(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("skynet");
    cmd.current_dir(dir);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout(assert: &Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=skynet-tests",
            "-c",
            "user.email=skynet-tests@example.invalid",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("spawn git");
    assert!(status.success(), "git {args:?} failed");
}

/// A committed project with a setup.py and a single unit test file.
pub fn committed_project() -> TempDir {
    let temp = tempfile::Builder::new()
        .prefix("skynet-project")
        .tempdir()
        .expect("tempdir");
    let root = temp.path();
    fs::write(root.join("setup.py"), "from setuptools import setup\nsetup()\n").expect("setup.py");
    fs::create_dir_all(root.join("tests").join("unit")).expect("tests dir");
    fs::write(root.join("tests/unit/test_buffer.py"), "").expect("test file");
    git(root, &["init", "-q"]);
    git(root, &["add", "."]);
    git(root, &["commit", "-q", "-m", "initial"]);
    temp
}

/// Shell script standing in for python, twine, bumpversion or the formatter.
///
/// Every call is appended to `calls.log` beside the script and announced on
/// stdout and stderr, the way real tools chatter. The script exits with
/// `exit_code`; `setup.py sdist` additionally drops an archive in `dist/`.
#[cfg(unix)]
pub fn fake_tool(bin_dir: &Path, name: &str, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(bin_dir).expect("bin dir");
    let log = bin_dir.join("calls.log");
    let script = bin_dir.join(name);
    let body = format!(
        "#!/bin/sh\n\
         echo \"{name} $*\" >> \"{log}\"\n\
         echo \"{name}: working\"\n\
         echo \"{name}: note\" >&2\n\
         if [ \"$1\" = \"setup.py\" ] && [ \"$2\" = \"sdist\" ]; then\n\
         \tmkdir -p dist && echo sdist > dist/skynet-application-0.0.1.tar.gz\n\
         fi\n\
         exit {exit_code}\n",
        log = log.display(),
    );
    fs::write(&script, body).expect("write fake tool");
    let mut perms = fs::metadata(&script).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).expect("chmod");
    script
}

pub fn calls(bin_dir: &Path) -> Vec<String> {
    fs::read_to_string(bin_dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(ToString::to_string)
        .collect()
}
