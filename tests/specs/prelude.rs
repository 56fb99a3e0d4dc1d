//! Shared helpers for specs

use assert_cmd::cargo::cargo_bin;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tempfile::TempDir;

/// A temporary project directory; stops its daemon on drop
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root
    pub fn file(&self, path: &str, content: &str) -> &Self {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn sj(&self) -> Cli {
        let mut cmd = assert_cmd::Command::cargo_bin("sj").unwrap();
        cmd.current_dir(self.path())
            .env("SJ_DAEMON_BINARY", cargo_bin("sjd"))
            .env("SJ_TIMEOUT_MS", "2000")
            .env_remove("SJ_PROJECT_ROOT")
            .env_remove("SJ_STATE_DIR");
        Cli { cmd }
    }

    /// Wait for an action to write `path`, returning its content
    pub fn wait_for_file(&self, path: &str) -> Option<String> {
        let path = self.path().join(path);
        for _ in 0..200 {
            if let Ok(content) = std::fs::read_to_string(&path) {
                if !content.is_empty() {
                    return Some(content);
                }
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        None
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        if self.path().join(".sj/sjd.sock").exists() {
            let _ = self.sj().cmd.args(["daemon", "stop"]).output();
        }
    }
}

pub struct Cli {
    cmd: assert_cmd::Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Run and require a zero exit status
    pub fn passes(mut self) -> Run {
        let output = self.cmd.output().unwrap();
        assert!(output.status.success(), "expected success\n{}", describe(&output));
        Run { output }
    }

    /// Run and require a non-zero exit status
    pub fn fails(mut self) -> Run {
        let output = self.cmd.output().unwrap();
        assert!(!output.status.success(), "expected failure\n{}", describe(&output));
        Run { output }
    }
}

pub struct Run {
    output: Output,
}

impl Run {
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = String::from_utf8_lossy(&self.output.stdout);
        assert!(
            stdout.contains(expected),
            "stdout missing {:?}\n{}",
            expected,
            describe(&self.output)
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = String::from_utf8_lossy(&self.output.stderr);
        assert!(
            stderr.contains(expected),
            "stderr missing {:?}\n{}",
            expected,
            describe(&self.output)
        );
        self
    }
}

fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
