//! Container platform detection.
//!
//! Several platforms can be installed on one host at once. Each candidate
//! is probed through its communication endpoint (a per-platform socket
//! path) and classified along two independent capability axes: whether it
//! speaks a containerd-style API and whether it is Docker-API-compatible.
//! Neither flag set means only shell-based operations are viable; the model
//! permits it even though no shipped candidate is classified that way.
//!
//! Selection tie-break, in order:
//! 1. a reachable candidate that self-reports as the current docker
//!    context wins;
//! 2. several self-reporting candidates fall back to the fixed priority
//!    order below;
//! 3. none self-reporting: first reachable candidate in priority order;
//! 4. nothing reachable: `NoPlatformDetected`.
//!
//! Priority order: containerd-native daemons before Docker-compatible
//! shims before generic Docker — [`Platform::PRIORITY`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{Error, Result};

/// Upper bound on any command the host probe shells out to.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A container-runtime backend berth knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    RancherDesktop,
    Lima,
    Colima,
    Podman,
    Docker,
}

impl Platform {
    /// Fixed detection priority. Documented tie-break order; do not reorder
    /// without updating the selection tests.
    pub const PRIORITY: [Platform; 5] = [
        Platform::RancherDesktop,
        Platform::Lima,
        Platform::Colima,
        Platform::Podman,
        Platform::Docker,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RancherDesktop => "Rancher Desktop",
            Self::Lima => "Lima",
            Self::Colima => "Colima",
            Self::Podman => "Podman",
            Self::Docker => "Docker",
        }
    }

    /// The CLI binary used to drive this platform.
    pub fn cli_binary(&self) -> &'static str {
        match self {
            Self::RancherDesktop => "docker",
            Self::Lima => "nerdctl",
            Self::Colima => "docker",
            Self::Podman => "podman",
            Self::Docker => "docker",
        }
    }

    /// Speaks a containerd-style API.
    pub fn containerd(&self) -> bool {
        matches!(self, Self::RancherDesktop | Self::Lima)
    }

    /// Accepts the Docker HTTP API over its socket.
    pub fn docker_compatible(&self) -> bool {
        matches!(
            self,
            Self::RancherDesktop | Self::Colima | Self::Podman | Self::Docker
        )
    }

    /// Candidate socket paths for this platform, in probe order.
    pub fn socket_paths(&self) -> Vec<PathBuf> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        match self {
            Self::RancherDesktop => vec![home.join(".rd/docker.sock")],
            Self::Lima => vec![home.join(".lima/default/sock/containerd.sock")],
            Self::Colima => vec![home.join(".colima/default/docker.sock")],
            Self::Podman => {
                let mut paths = Vec::new();
                if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
                    paths.push(PathBuf::from(runtime_dir).join("podman/podman.sock"));
                }
                paths.push(PathBuf::from("/run/podman/podman.sock"));
                paths
            }
            Self::Docker => vec![
                PathBuf::from("/var/run/docker.sock"),
                home.join(".docker/run/docker.sock"),
            ],
        }
    }

    /// Whether a `docker context show` result names this platform.
    pub fn matches_docker_context(&self, context: &str) -> bool {
        match self {
            Self::RancherDesktop => context == "rancher-desktop",
            Self::Colima => context == "colima" || context.starts_with("colima-"),
            Self::Podman => context.starts_with("podman"),
            Self::Docker => context == "default" || context == "desktop-linux",
            // Lima's nerdctl does not participate in docker contexts.
            Self::Lima => false,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One reachable candidate with its classification.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedPlatform {
    pub platform: Platform,
    /// The socket the candidate answered on.
    pub socket: PathBuf,
    pub containerd: bool,
    pub docker_compatible: bool,
    /// The platform's own tooling reports it as the current selection.
    pub is_current_context: bool,
}

/// Host-probing seam. The real implementation touches the filesystem and
/// shells out; tests substitute a table-driven double.
pub trait HostProbe {
    /// The platform's communication endpoint exists on disk.
    fn socket_exists(&self, path: &Path) -> bool;

    /// The CLI binary is on PATH.
    fn binary_available(&self, name: &str) -> bool;

    /// The current docker context name, if docker tooling is present.
    fn current_docker_context(&self) -> Option<String>;
}

/// Probes the actual host.
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn socket_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn binary_available(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }

    fn current_docker_context(&self) -> Option<String> {
        let mut cmd = std::process::Command::new("docker");
        cmd.args(["context", "show"]);
        let stdout = bounded_output(cmd, PROBE_TIMEOUT)?;
        let context = stdout.trim().to_string();
        (!context.is_empty()).then_some(context)
    }
}

/// Run `cmd` with a hard deadline and capture its stdout. A timeout,
/// spawn failure, or non-zero exit all collapse to `None`, so a hung
/// docker daemon degrades to "no self-report" instead of wedging the
/// probe.
fn bounded_output(mut cmd: std::process::Command, timeout: Duration) -> Option<String> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => break,
            Ok(Some(_)) => return None,
            Ok(None) => {
                if Instant::now() >= deadline {
                    tracing::warn!(command = ?cmd, "probe command timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(_) => return None,
        }
    }

    let mut stdout = String::new();
    child.stdout.take()?.read_to_string(&mut stdout).ok()?;
    Some(stdout)
}

/// Every reachable candidate, in priority order. An empty list is a valid
/// non-error result meaning no supported platform is installed.
pub fn detect_all(probe: &dyn HostProbe) -> Vec<DetectedPlatform> {
    let current_context = probe.current_docker_context();
    let mut detected = Vec::new();

    for platform in Platform::PRIORITY {
        let Some(socket) = platform
            .socket_paths()
            .into_iter()
            .find(|p| probe.socket_exists(p))
        else {
            continue;
        };
        if !probe.binary_available(platform.cli_binary()) {
            tracing::debug!(platform = %platform, "socket present but CLI binary missing, skipping");
            continue;
        }

        let is_current_context = current_context
            .as_deref()
            .is_some_and(|ctx| platform.matches_docker_context(ctx));

        detected.push(DetectedPlatform {
            platform,
            socket,
            containerd: platform.containerd(),
            docker_compatible: platform.docker_compatible(),
            is_current_context,
        });
    }

    detected
}

/// The single platform to operate through, per the documented tie-break.
pub fn detect(probe: &dyn HostProbe) -> Result<DetectedPlatform> {
    let chosen = select(detect_all(probe))?;
    tracing::info!(platform = %chosen.platform, socket = %chosen.socket.display(), "selected container platform");
    Ok(chosen)
}

/// The tie-break over an already-probed candidate list. `candidates` must
/// be in priority order (as [`detect_all`] returns them): the first
/// self-reporting candidate wins, so several self-reporting candidates
/// fall back to priority order, and none self-reporting picks the head of
/// the list.
pub fn select(mut candidates: Vec<DetectedPlatform>) -> Result<DetectedPlatform> {
    if candidates.is_empty() {
        return Err(Error::NoPlatformDetected);
    }
    let chosen = candidates
        .iter()
        .position(|c| c.is_current_context)
        .unwrap_or(0);
    Ok(candidates.remove(chosen))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_output_captures_stdout() {
        let mut cmd = std::process::Command::new("sh");
        cmd.args(["-c", "printf hello"]);
        assert_eq!(
            bounded_output(cmd, Duration::from_secs(5)).as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn test_bounded_output_gives_up_on_a_hung_command() {
        let mut cmd = std::process::Command::new("sleep");
        cmd.arg("30");
        let started = Instant::now();
        assert_eq!(bounded_output(cmd, Duration::from_millis(100)), None);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_bounded_output_treats_a_failing_exit_as_absent() {
        let mut cmd = std::process::Command::new("sh");
        cmd.args(["-c", "exit 3"]);
        assert_eq!(bounded_output(cmd, Duration::from_secs(5)), None);
    }
}
