//! Shared testing utilities for ncm CLI tests.
#![allow(dead_code)]

use assert_cmd::Command;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const VLAN: &str = "VLAN 설정";
pub const VLAN_PATH: &str = "VLAN%20%EC%84%A4%EC%A0%95";
pub const PORT_PATH: &str = "%ED%8F%AC%ED%8A%B8%20%EC%84%A4%EC%A0%95";

/// Isolated working directory plus a mock backend for CLI exercises.
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
    pub server: ServerGuard,
}

impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir, server: Server::new() }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for the compiled `ncm` binary pointed at the mock backend.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("ncm").expect("Failed to locate ncm binary");
        cmd.current_dir(&self.work_dir)
            .env("NCM_API_URL", self.server.url())
            .env_remove("NCM_LOG");
        cmd
    }

    /// Write `ncm.toml` into the working directory.
    pub fn write_config(&self, content: &str) {
        fs::write(self.work_dir.join("ncm.toml"), content).expect("Failed to write ncm.toml");
    }

    pub fn mock_devices(&mut self, devices: Value) -> Mock {
        self.server
            .mock("GET", "/api/devices")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(devices.to_string())
            .create()
    }

    pub fn mock_sw1(&mut self) -> Mock {
        self.mock_devices(json!([
            {"name": "SW1", "ip": "192.168.0.1", "vendor": "cisco", "model": "IOS"}
        ]))
    }

    pub fn mock_task_types(&mut self, names: &[&str]) -> Mock {
        self.server
            .mock("GET", "/api/task-types")
            .with_status(200)
            .with_body(json!(names).to_string())
            .create()
    }

    pub fn mock_subtasks(&mut self, encoded_type: &str, subtasks: &[&str]) -> Mock {
        self.server
            .mock("GET", format!("/api/subtasks/{}", encoded_type).as_str())
            .with_status(200)
            .with_body(json!(subtasks).to_string())
            .create()
    }

    pub fn mock_missing_subtasks(&mut self, encoded_type: &str) -> Mock {
        self.server
            .mock("GET", format!("/api/subtasks/{}", encoded_type).as_str())
            .with_status(404)
            .with_body(r#"{"status": "error", "message": "unknown task type"}"#)
            .create()
    }

    /// `VLAN 설정 / create` with a numeric `vlan_id` and a free-text `vlan_name`.
    pub fn mock_vlan_create_form(&mut self) -> Mock {
        self.server
            .mock("GET", format!("/api/parameters/{}/create", VLAN_PATH).as_str())
            .with_status(200)
            .with_body(
                json!([
                    {"name": "vlan_id", "label": "VLAN ID", "type": "number", "required": true,
                     "pattern": "^[0-9]{1,4}$"},
                    {"name": "vlan_name", "label": "VLAN 이름", "type": "text"}
                ])
                .to_string(),
            )
            .create()
    }

    pub fn mock_tasks(&mut self, device_id: &str, tasks: Value) -> Mock {
        self.server
            .mock("GET", "/api/tasks")
            .match_query(Matcher::UrlEncoded("device_id".into(), device_id.into()))
            .with_status(200)
            .with_body(tasks.to_string())
            .create()
    }
}
