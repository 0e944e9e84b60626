use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backend owns a container. Fixed for the lifetime of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Linux,
    Windows,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Running,
    Stopped,
    Unknown,
}

impl ContainerStatus {
    /// Normalises the free-form status strings reported by the backends.
    ///
    /// `distrobox list` reports either plain words or podman's
    /// `Up 2 hours` / `Exited (0) 3 days ago` phrasing.
    pub fn from_backend(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();

        if lowered == "running" || lowered.starts_with("up") {
            Self::Running
        } else if lowered == "stopped" || lowered == "created" || lowered.starts_with("exited") {
            Self::Stopped
        } else {
            Self::Unknown
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Read-only snapshot of one container as reported by its backend.
///
/// Records are rebuilt on every listing; `name` together with `kind` is the
/// key every lifecycle call dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRecord {
    pub name: String,
    pub status: ContainerStatus,
    pub distro: String,
    pub kind: ContainerKind,
    pub image: String,
    pub created: String,
    pub id: Option<String>,
}

impl ContainerRecord {
    pub const UNKNOWN_CREATED: &'static str = "unknown";

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }
}

/// Knobs for creating a Linux container.
///
/// Deserializes from the `distrobox_options` settings object; keys it does not
/// know (such as `audio_support`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOptions {
    /// Share the invoking user's home directory into the container
    #[serde(default = "default_home_sharing")]
    pub home_sharing: bool,
    /// Pass the host GPU through
    #[serde(default)]
    pub nvidia_support: bool,
    #[serde(default)]
    pub additional_packages: Vec<String>,
}

fn default_home_sharing() -> bool {
    true
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            home_sharing: default_home_sharing(),
            nvidia_support: false,
            additional_packages: Vec::new(),
        }
    }
}
