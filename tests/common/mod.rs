#![allow(dead_code)]

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper struct to run docket commands in an isolated temp directory
pub struct DocketTest {
    pub temp_dir: TempDir,
    binary_path: String,
}

impl DocketTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        DocketTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_docket").to_string(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("DOCKET_CONFIG")
            .env_remove("DOCKET_ROOT")
            .env_remove("DOCKET_SEED")
            .env_remove("DOCKET_FAILURE_RATE")
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute docket command")
    }

    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = self.command(args);
        for (key, value) in env {
            cmd.env(key, value);
        }
        cmd.output().expect("Failed to execute docket command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).expect("Command output was not JSON")
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".docket");
        fs::create_dir_all(&dir).expect("Failed to create .docket directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }
}
