//! Container lifecycle over a detected platform.
//!
//! A workspace maps to one container named by a fixed convention
//! ([`container_name`]); that name is the only handle the runtime needs.
//! Status strings from the platform are normalized once, in
//! [`ContainerStatus::classify`] — new platforms mean a new matcher there,
//! not new call sites.

mod backend;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

pub use backend::{CliBackend, ContainerBackend, ContainerSpec, ContainerSummary, DEFAULT_TIMEOUT};

/// Fixed prefix for every container berth manages.
pub const CONTAINER_PREFIX: &str = "berth";

/// Normalized container state across platform vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Running,
    Stopped,
    Unknown,
}

impl ContainerStatus {
    /// Classify a raw platform status string.
    ///
    /// Docker reports "Up 5 minutes" / "Exited (0) 2 hours ago"; nerdctl
    /// and podman lean toward "running" / "stopped" / "created". Matching
    /// is by lowercased prefix token.
    pub fn classify(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        if lower.starts_with("up") || lower.starts_with("running") {
            Self::Running
        } else if lower.starts_with("exited")
            || lower.starts_with("created")
            || lower.starts_with("stopped")
            || lower.starts_with("dead")
        {
            Self::Stopped
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }
}

/// Derive the container name backing workspace `workspace` under owner
/// `owner`: `berth-<owner>-<workspace>`, sanitized to the container-name
/// alphabet.
pub fn container_name(owner: &str, workspace: &str) -> String {
    format!(
        "{}-{}-{}",
        CONTAINER_PREFIX,
        sanitize(owner),
        sanitize(workspace)
    )
}

fn sanitize(part: &str) -> String {
    part.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// What `start_workspace` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartAction {
    Created,
    Started,
    AlreadyRunning,
}

/// One failed item of a bulk stop.
#[derive(Debug, Clone, Serialize)]
pub struct StopFailure {
    pub name: String,
    pub error: String,
}

/// Accumulated outcome of `stop_all_workspaces`. Partial failures never
/// abort the remaining stops.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StopAllOutcome {
    pub stopped: usize,
    pub failed: Vec<StopFailure>,
}

/// Lifecycle operations over named workspace containers.
pub struct ContainerRuntime<B: ContainerBackend> {
    backend: B,
}

impl<B: ContainerBackend> ContainerRuntime<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The container's normalized status, or `None` if no container with
    /// that name exists. Errors only on communication failure.
    pub async fn find_workspace(&self, name: &str) -> Result<Option<ContainerStatus>> {
        self.backend.container_status(name).await
    }

    /// Bring the named container up: create it if absent, start it if
    /// stopped, leave it alone if already running.
    pub async fn start_workspace(&self, name: &str, image: &str) -> Result<StartAction> {
        match self.find_workspace(name).await? {
            None => {
                tracing::info!(container = name, image, "creating workspace container");
                self.backend
                    .create_container(&ContainerSpec {
                        name: name.to_string(),
                        image: image.to_string(),
                    })
                    .await?;
                self.backend.start_container(name).await?;
                Ok(StartAction::Created)
            }
            Some(ContainerStatus::Running) => Ok(StartAction::AlreadyRunning),
            Some(_) => {
                self.backend.start_container(name).await?;
                Ok(StartAction::Started)
            }
        }
    }

    /// Stop the named container. Idempotent: an already-stopped or absent
    /// container succeeds with no effect (`false`). Errors only on genuine
    /// platform failure.
    pub async fn stop_workspace(&self, name: &str) -> Result<bool> {
        match self.find_workspace(name).await? {
            None | Some(ContainerStatus::Stopped) => Ok(false),
            Some(_) => {
                self.backend.stop_container(name).await?;
                Ok(true)
            }
        }
    }

    /// Stop every managed container (the `berth-` prefix), sequentially.
    ///
    /// Best-effort: per-item failures are logged and accumulated, never
    /// aborting the remainder. Cancellation skips unstarted iterations
    /// only; an in-flight stop runs to completion.
    pub async fn stop_all_workspaces(&self, cancel: &CancellationToken) -> Result<StopAllOutcome> {
        let prefix = format!("{}-", CONTAINER_PREFIX);
        let containers = self.backend.list_containers(&prefix).await?;

        let mut outcome = StopAllOutcome::default();
        for container in containers {
            if cancel.is_cancelled() {
                tracing::info!(
                    stopped = outcome.stopped,
                    "bulk stop cancelled, skipping remaining containers"
                );
                break;
            }
            if container.status == ContainerStatus::Stopped {
                continue;
            }
            match self.backend.stop_container(&container.name).await {
                Ok(()) => outcome.stopped += 1,
                Err(e) => {
                    tracing::warn!(container = %container.name, error = %e, "failed to stop container");
                    outcome.failed.push(StopFailure {
                        name: container.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Interactive shell in the named container. Requires the container to
    /// exist; the platform rejects attaching to a stopped one.
    pub async fn attach_workspace(&self, name: &str, shell: &str) -> Result<()> {
        if self.find_workspace(name).await?.is_none() {
            return Err(Error::not_found("container", name));
        }
        self.backend.attach(name, shell).await
    }
}
