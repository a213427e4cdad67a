//! Shared harness for CLI specs

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use tempfile::TempDir;

pub use similar_asserts::assert_eq;

/// Blueprint selection used by most specs
pub const BLUEPRINT: [&str; 6] = ["--name", "vFW", "--version", "1.0.0", "--uuid", "a1b2"];

/// Descriptor every well-formed archive carries
pub const DESCRIPTOR: (&str, &str) = ("TOSCA-Metadata/TOSCA.meta", "TOSCA-Meta-File-Version: 1.0\n");

/// Isolated host: its own daemon, state directory and deploy directory
pub struct Env {
    dir: TempDir,
}

impl Env {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("utils")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn deploy_dir(&self) -> PathBuf {
        self.path().join("deploy")
    }

    /// Workspace of the default blueprint
    pub fn workspace(&self) -> PathBuf {
        self.deploy_dir().join("vFW/1.0.0/a1b2")
    }

    /// Write a file relative to the env root
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a zip archive holding `entries` and return its path
    pub fn zip(&self, rel: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.path().join(rel);
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    /// Upload `entries` as the default blueprint and mark it prepared, so
    /// execs don't need a real virtualenv
    pub fn uploaded(&self, entries: &[(&str, &str)]) {
        let mut all = vec![DESCRIPTOR];
        all.extend_from_slice(entries);
        let archive = self.zip("blueprint.zip", &all);
        self.bx()
            .args(&["upload"])
            .args(&BLUEPRINT)
            .args(&[archive.to_str().unwrap()])
            .passes();
        std::fs::write(self.workspace().join(".installed"), "").unwrap();
    }

    pub fn bx(&self) -> CliBuilder {
        let mut cmd = assert_cmd::Command::cargo_bin("bx").unwrap();
        cmd.env("BX_STATE_DIR", self.path().join("state"))
            .env("BX_SOCKET_DIR", self.path())
            .env("BX_DEPLOY_DIR", self.deploy_dir())
            .env("BX_UTILITY_DIR", self.path().join("utils"))
            .env("BX_DAEMON_BINARY", assert_cmd::cargo::cargo_bin("bxd"))
            .env_remove("BX_METRICS_ENABLED")
            .timeout(Duration::from_secs(30));
        CliBuilder { cmd }
    }
}

impl Drop for Env {
    fn drop(&mut self) {
        let _ = self.bx().cmd.args(["daemon", "stop"]).output();
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Run and require exit status 0
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        if !run.output.status.success() {
            panic!(
                "expected success, got {}\nstdout:\n{}\nstderr:\n{}",
                run.output.status,
                run.stdout(),
                run.stderr()
            );
        }
        run
    }

    /// Run and require a non-zero exit status
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        if run.output.status.success() {
            panic!(
                "expected failure\nstdout:\n{}\nstderr:\n{}",
                run.stdout(),
                run.stderr()
            );
        }
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(needle),
            "stdout should contain {:?}:\n{}",
            needle,
            stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(needle),
            "stdout should not contain {:?}:\n{}",
            needle,
            stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(needle),
            "stderr should contain {:?}:\n{}",
            needle,
            stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }
}
