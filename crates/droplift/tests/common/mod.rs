use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// Empty working directory with a scrubbed environment
pub struct TestDir {
    pub root: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    #[allow(dead_code)]
    pub fn write_env_file(&self, content: &str) {
        fs::write(self.root.path().join(".env"), content).unwrap();
    }

    /// `droplift` running inside this directory with no inherited variables
    #[allow(deprecated)]
    pub fn droplift(&self) -> Command {
        let mut cmd = Command::cargo_bin("droplift").unwrap();
        cmd.current_dir(self.root.path()).env_clear();
        cmd
    }
}
