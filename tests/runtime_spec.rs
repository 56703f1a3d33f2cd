use std::collections::BTreeMap;
use std::sync::Mutex;

use berth::error::{Error, Result};
use berth::runtime::{
    ContainerBackend, ContainerRuntime, ContainerSpec, ContainerStatus, ContainerSummary,
    StartAction,
};
use tokio_util::sync::CancellationToken;

/// In-memory platform double. State is a name-to-status map; `fail_stop`
/// names containers whose stop call errors out.
#[derive(Default)]
struct MockBackend {
    containers: Mutex<BTreeMap<String, ContainerStatus>>,
    fail_stop: Vec<String>,
}

impl MockBackend {
    fn with_containers(entries: &[(&str, ContainerStatus)]) -> Self {
        Self {
            containers: Mutex::new(
                entries
                    .iter()
                    .map(|(name, status)| (name.to_string(), *status))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    fn failing_stop(mut self, name: &str) -> Self {
        self.fail_stop.push(name.to_string());
        self
    }

    fn status_of(&self, name: &str) -> Option<ContainerStatus> {
        self.containers.lock().unwrap().get(name).copied()
    }
}

impl ContainerBackend for MockBackend {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_containers(&self, prefix: &str) -> Result<Vec<ContainerSummary>> {
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, status)| ContainerSummary {
                name: name.clone(),
                raw_status: status.as_str().to_string(),
                status: *status,
            })
            .collect())
    }

    async fn container_status(&self, name: &str) -> Result<Option<ContainerStatus>> {
        Ok(self.status_of(name))
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<()> {
        self.containers
            .lock()
            .unwrap()
            .insert(spec.name.clone(), ContainerStatus::Stopped);
        Ok(())
    }

    async fn start_container(&self, name: &str) -> Result<()> {
        self.containers
            .lock()
            .unwrap()
            .insert(name.to_string(), ContainerStatus::Running);
        Ok(())
    }

    async fn stop_container(&self, name: &str) -> Result<()> {
        if self.fail_stop.iter().any(|n| n == name) {
            return Err(Error::runtime(format!("cannot stop {}", name)));
        }
        self.containers
            .lock()
            .unwrap()
            .insert(name.to_string(), ContainerStatus::Stopped);
        Ok(())
    }

    async fn attach(&self, name: &str, _shell: &str) -> Result<()> {
        if self.status_of(name).is_none() {
            return Err(Error::runtime(format!("no such container: {}", name)));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_find_workspace_reports_absence_as_none() {
    let runtime = ContainerRuntime::new(MockBackend::default());
    let status = runtime
        .find_workspace("berth-api-dev")
        .await
        .expect("Find failed");
    assert!(status.is_none());
}

#[tokio::test]
async fn test_start_creates_an_absent_container() {
    let backend = MockBackend::default();
    let runtime = ContainerRuntime::new(backend);

    let action = runtime
        .start_workspace("berth-api-dev", "ubuntu:24.04")
        .await
        .expect("Start failed");

    assert_eq!(action, StartAction::Created);
    assert_eq!(
        runtime.find_workspace("berth-api-dev").await.unwrap(),
        Some(ContainerStatus::Running)
    );
}

#[tokio::test]
async fn test_start_restarts_a_stopped_container() {
    let backend = MockBackend::with_containers(&[("berth-api-dev", ContainerStatus::Stopped)]);
    let runtime = ContainerRuntime::new(backend);

    let action = runtime
        .start_workspace("berth-api-dev", "ubuntu:24.04")
        .await
        .expect("Start failed");

    assert_eq!(action, StartAction::Started);
}

#[tokio::test]
async fn test_start_leaves_a_running_container_alone() {
    let backend = MockBackend::with_containers(&[("berth-api-dev", ContainerStatus::Running)]);
    let runtime = ContainerRuntime::new(backend);

    let action = runtime
        .start_workspace("berth-api-dev", "ubuntu:24.04")
        .await
        .expect("Start failed");

    assert_eq!(action, StartAction::AlreadyRunning);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let backend = MockBackend::with_containers(&[("berth-api-dev", ContainerStatus::Running)]);
    let runtime = ContainerRuntime::new(backend);

    assert!(runtime.stop_workspace("berth-api-dev").await.unwrap());
    assert!(!runtime.stop_workspace("berth-api-dev").await.unwrap());
    assert!(!runtime.stop_workspace("berth-absent-ws").await.unwrap());
}

#[tokio::test]
async fn test_stop_all_skips_stopped_and_foreign_containers() {
    let backend = MockBackend::with_containers(&[
        ("berth-api-dev", ContainerStatus::Running),
        ("berth-api-staging", ContainerStatus::Stopped),
        ("unrelated-service", ContainerStatus::Running),
    ]);
    let runtime = ContainerRuntime::new(backend);

    let outcome = runtime
        .stop_all_workspaces(&CancellationToken::new())
        .await
        .expect("Bulk stop failed");

    assert_eq!(outcome.stopped, 1);
    assert!(outcome.failed.is_empty());
}

#[tokio::test]
async fn test_stop_all_accumulates_failures_without_aborting() {
    let backend = MockBackend::with_containers(&[
        ("berth-api-dev", ContainerStatus::Running),
        ("berth-api-staging", ContainerStatus::Running),
        ("berth-web-dev", ContainerStatus::Running),
    ])
    .failing_stop("berth-api-staging");
    let runtime = ContainerRuntime::new(backend);

    let outcome = runtime
        .stop_all_workspaces(&CancellationToken::new())
        .await
        .expect("Bulk stop failed");

    assert_eq!(outcome.stopped, 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].name, "berth-api-staging");
    assert!(outcome.failed[0].error.contains("cannot stop"));
}

#[tokio::test]
async fn test_stop_all_respects_a_cancelled_token() {
    let backend = MockBackend::with_containers(&[
        ("berth-api-dev", ContainerStatus::Running),
        ("berth-web-dev", ContainerStatus::Running),
    ]);
    let runtime = ContainerRuntime::new(backend);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = runtime
        .stop_all_workspaces(&cancel)
        .await
        .expect("Bulk stop failed");

    assert_eq!(outcome.stopped, 0);
    assert!(outcome.failed.is_empty());
    assert_eq!(
        runtime.find_workspace("berth-api-dev").await.unwrap(),
        Some(ContainerStatus::Running)
    );
}

#[tokio::test]
async fn test_attach_requires_an_existing_container() {
    let runtime = ContainerRuntime::new(MockBackend::default());
    let err = runtime
        .attach_workspace("berth-api-dev", "/bin/bash")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_classification_covers_platform_status_vocabularies() {
    let expectations = [
        ("Up 5 minutes", ContainerStatus::Running),
        ("Up About an hour (healthy)", ContainerStatus::Running),
        ("running", ContainerStatus::Running),
        ("Exited (0) 2 hours ago", ContainerStatus::Stopped),
        ("Created", ContainerStatus::Stopped),
        ("stopped", ContainerStatus::Stopped),
        ("Dead", ContainerStatus::Stopped),
        ("Restarting (1) 5 seconds ago", ContainerStatus::Unknown),
        ("", ContainerStatus::Unknown),
    ];
    for (raw, expected) in expectations {
        assert_eq!(ContainerStatus::classify(raw), expected, "raw: {raw:?}");
    }
}
