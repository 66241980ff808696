//! Drives the `kvfs` binary against an on-disk store described by a
//! temporary config file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Env {
    dir: TempDir,
    config: PathBuf,
}

impl Env {
    fn new(store_table: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        let table = store_table.replace("{dir}", &dir.path().display().to_string());
        std::fs::write(&config, format!("[store]\n{table}")).unwrap();
        Self { dir, config }
    }

    fn local() -> Self {
        Self::new("type = \"local\"\nbase_path = \"{dir}/store\"\n")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_kvfs"));
        cmd.arg("--config").arg(&self.config).arg("-q").args(args);
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "kvfs {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[test]
fn create_list_read_rename() {
    let env = Env::local();
    env.ok(&["mkdir", "/docs"]);
    env.ok(&["write", "/docs/readme", "hello"]);
    env.ok(&["touch", "/top"]);

    assert_eq!(env.ok(&["ls"]), "docs/\ntop\n");
    assert_eq!(env.ok(&["cat", "/docs/readme"]), "hello");

    assert_eq!(env.ok(&["mv", "/docs/readme", "notes"]), "/docs/notes\n");
    assert_eq!(env.ok(&["ls", "/docs"]), "notes\n");
    assert!(!env.run(&["cat", "/docs/readme"]).status.success());

    assert!(env.path().join("store").is_dir());
}

#[test]
fn write_reads_stdin_and_overwrites() {
    let env = Env::local();
    env.ok(&["write", "/f", "first"]);

    let mut child = env
        .command(&["write", "/f"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"from stdin\n")
        .unwrap();
    assert!(child.wait().unwrap().success());

    assert_eq!(env.ok(&["cat", "/f"]), "from stdin\n");
}

#[test]
fn remove_then_gc_reclaims_descendants() {
    let env = Env::new("type = \"redb\"\npath = \"{dir}/kvfs.redb\"\n");
    env.ok(&["mkdir", "/a"]);
    env.ok(&["mkdir", "/a/b"]);
    env.ok(&["write", "/a/b/f", "x"]);
    env.ok(&["rm", "/a"]);

    assert_eq!(env.ok(&["ls"]), "");
    let dry = env.ok(&["gc", "--dry-run"]);
    assert!(dry.contains("1 reachable, 2 orphaned, 0 deleted"), "{dry}");

    let real = env.ok(&["gc"]);
    assert!(real.contains("2 deleted"), "{real}");
    assert!(env.ok(&["check"]).starts_with("1 folders, 0 files, 1 keys referenced"));
}

#[test]
fn tree_and_check_on_a_populated_store() {
    let env = Env::local();
    env.ok(&["mkdir", "/docs"]);
    env.ok(&["write", "/docs/readme", "hello"]);

    assert_eq!(env.ok(&["tree"]), "/\n  docs/\n    readme  (5 bytes)\n");
    assert_eq!(
        env.ok(&["tree", "--path", "/docs"]),
        "/docs/\n  readme  (5 bytes)\n"
    );
    assert!(env.ok(&["check"]).starts_with("2 folders, 1 files"));
}

#[test]
fn errors_exit_unsuccessfully() {
    let env = Env::local();
    env.ok(&["touch", "/f"]);

    assert!(!env.run(&["touch", "/f"]).status.success(), "duplicate name");
    assert!(!env.run(&["mkdir", "/missing/child"]).status.success());
    assert!(!env.run(&["rm", "/"]).status.success(), "root is immutable");
    assert!(!env.run(&["ls", "relative"]).status.success());
}

#[test]
fn shell_session_over_stdin() {
    let env = Env::local();
    let mut child = env
        .command(&["shell"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"mkdir docs\ncd docs\ntouch a\ncd a\nsave hi\nexit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    assert_eq!(env.ok(&["cat", "/docs/a"]), "hi");
}

#[test]
fn config_init_creates_a_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("kvfs").join("config.toml");

    let status = Command::new(env!("CARGO_BIN_EXE_kvfs"))
        .arg("--config")
        .arg(&config)
        .args(["-q", "config", "init"])
        .status()
        .unwrap();

    assert!(status.success());
    let text = std::fs::read_to_string(&config).unwrap();
    assert!(text.contains("type = \"local\""), "{text}");
}
