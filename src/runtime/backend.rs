//! The platform-facing seam.
//!
//! [`ContainerBackend`] is the narrow surface the runtime needs from a
//! container platform; [`CliBackend`] implements it by exec-ing the
//! platform's CLI with `DOCKER_HOST` pointed at the detected socket. Tests
//! substitute an in-memory backend.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};
use crate::platform::DetectedPlatform;

use super::ContainerStatus;

/// Everything needed to create one workspace container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
}

/// One container as reported by the platform's listing.
#[derive(Debug, Clone)]
pub struct ContainerSummary {
    pub name: String,
    /// The platform's own status vocabulary, unnormalized.
    pub raw_status: String,
    pub status: ContainerStatus,
}

/// Uniform lifecycle operations over one platform.
///
/// Absence is data (`container_status` returns `None`); errors mean the
/// platform itself could not be reached or timed out.
#[allow(async_fn_in_trait)]
pub trait ContainerBackend {
    async fn ping(&self) -> Result<()>;

    async fn list_containers(&self, prefix: &str) -> Result<Vec<ContainerSummary>>;

    async fn container_status(&self, name: &str) -> Result<Option<ContainerStatus>>;

    async fn create_container(&self, spec: &ContainerSpec) -> Result<()>;

    async fn start_container(&self, name: &str) -> Result<()>;

    async fn stop_container(&self, name: &str) -> Result<()>;

    /// Interactive exec with inherited stdio. Unbounded; the user drives it.
    async fn attach(&self, name: &str, shell: &str) -> Result<()>;
}

/// Bound on every non-interactive platform call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives a platform through its CLI binary.
pub struct CliBackend {
    binary: String,
    /// `DOCKER_HOST` value when the platform's socket differs from the
    /// binary's default.
    docker_host: Option<String>,
    timeout: Duration,
}

impl CliBackend {
    pub fn new(binary: impl Into<String>, docker_host: Option<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            docker_host,
            timeout,
        }
    }

    pub fn from_platform(detected: &DetectedPlatform) -> Self {
        let docker_host = (detected.docker_compatible
            && detected.socket != PathBuf::from("/var/run/docker.sock"))
        .then(|| format!("unix://{}", detected.socket.display()));

        Self::new(detected.platform.cli_binary(), docker_host, DEFAULT_TIMEOUT)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if let Some(host) = &self.docker_host {
            cmd.env("DOCKER_HOST", host);
        }
        cmd
    }

    /// Run one bounded, non-interactive CLI call. Timeout and spawn
    /// failures are communication errors.
    async fn exec(&self, args: &[&str]) -> Result<std::process::Output> {
        tracing::debug!(binary = %self.binary, ?args, "container platform call");
        let mut cmd = self.command(args);
        cmd.stdin(Stdio::null());

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                Error::runtime(format!(
                    "`{} {}` timed out after {:?}",
                    self.binary,
                    args.join(" "),
                    self.timeout
                ))
            })?
            .map_err(|e| Error::runtime(format!("failed to run {}: {}", self.binary, e)))?;

        Ok(output)
    }

    /// Run a call that must succeed; non-zero exit is a communication error
    /// carrying the platform's stderr.
    async fn exec_checked(&self, args: &[&str]) -> Result<std::process::Output> {
        let output = self.exec(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::runtime(format!(
                "`{} {}` failed: {}",
                self.binary,
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(output)
    }
}

fn is_missing_container(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("no such container") || lower.contains("container not found")
}

impl ContainerBackend for CliBackend {
    async fn ping(&self) -> Result<()> {
        self.exec_checked(&["version"]).await?;
        Ok(())
    }

    async fn list_containers(&self, prefix: &str) -> Result<Vec<ContainerSummary>> {
        let output = self
            .exec_checked(&["ps", "-a", "--format", "{{.Names}}\t{{.Status}}"])
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let containers = stdout
            .lines()
            .filter_map(|line| {
                let (name, raw_status) = line.split_once('\t')?;
                name.starts_with(prefix).then(|| ContainerSummary {
                    name: name.to_string(),
                    raw_status: raw_status.to_string(),
                    status: ContainerStatus::classify(raw_status),
                })
            })
            .collect();

        Ok(containers)
    }

    async fn container_status(&self, name: &str) -> Result<Option<ContainerStatus>> {
        let containers = self.list_containers("").await?;
        Ok(containers
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.status))
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<()> {
        self.exec_checked(&["create", "--name", &spec.name, "-t", &spec.image])
            .await?;
        Ok(())
    }

    async fn start_container(&self, name: &str) -> Result<()> {
        self.exec_checked(&["start", name]).await?;
        Ok(())
    }

    async fn stop_container(&self, name: &str) -> Result<()> {
        let output = self.exec(&["stop", name]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // A vanished container is the outcome we wanted anyway.
            if !is_missing_container(&stderr) {
                return Err(Error::runtime(format!(
                    "`{} stop {}` failed: {}",
                    self.binary,
                    name,
                    stderr.trim()
                )));
            }
        }
        Ok(())
    }

    async fn attach(&self, name: &str, shell: &str) -> Result<()> {
        let mut cmd = self.command(&["exec", "-it", name, shell]);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd
            .status()
            .await
            .map_err(|e| Error::runtime(format!("failed to attach to {}: {}", name, e)))?;

        tracing::debug!(container = name, ?status, "attach session ended");
        Ok(())
    }
}
