use crate::domain::{
    ApplicationRecord, CommandOutput, CommandRunner, ContainerKind, ContainerRecord,
    CreateOptions,
};
use crate::error::{ManagerError, Result};
use crate::infra::process::describe;
use crate::infra::{ContainerConfigStore, distrobox, podman, shortcut, soda};
use anyhow::bail;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Span, debug, error, info, warn};

/// Tools that must be on `PATH` before any container can be managed
pub const REQUIRED_TOOLS: [&str; 2] = [distrobox::PROGRAM, podman::PROGRAM];

/// A start request whose process was launched.
///
/// This says nothing about the container having reached the running state;
/// the backend keeps working after the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launched {
    pub pid: u32,
}

/// Inventory and lifecycle façade over distrobox and soda.
///
/// Every call is independent and blocking apart from `start`. Backend
/// failures are logged and reported as `false`, `None` or an empty listing;
/// they never escape as errors. Callers driving a UI should invoke these from
/// a worker thread.
pub struct ContainerManager {
    runner: Arc<dyn CommandRunner>,
    configs: ContainerConfigStore,
    home: Option<PathBuf>,
    launcher_dir: PathBuf,
    span: Span,
}

impl ContainerManager {
    /// Fails with [`ManagerError::MissingDependency`] when any of
    /// [`REQUIRED_TOOLS`] cannot be resolved. Log events are emitted inside
    /// `span`; no subscriber is installed here.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        configs: ContainerConfigStore,
        span: Span,
    ) -> Result<Self> {
        let missing: Vec<String> = REQUIRED_TOOLS
            .iter()
            .filter(|tool| !runner.is_available(tool))
            .map(|tool| tool.to_string())
            .collect();

        if !missing.is_empty() {
            span.in_scope(|| error!(missing = ?missing, "required tools not found"));
            return Err(ManagerError::MissingDependency(missing));
        }

        Ok(Self {
            runner,
            configs,
            home: dirs::home_dir(),
            launcher_dir: shortcut::default_launcher_dir(),
            span,
        })
    }

    /// Home directory shared into new Linux containers
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Directory receiving application launchers
    pub fn with_launcher_dir(mut self, dir: PathBuf) -> Self {
        self.launcher_dir = dir;
        self
    }

    /// Whether the optional Windows backend is installed
    pub fn windows_available(&self) -> bool {
        self.runner.is_available(soda::PROGRAM)
    }

    /// All containers: Linux records first, then Windows records, each in the
    /// order the backend reported them. Names are not de-duplicated.
    pub fn list(&self) -> Vec<ContainerRecord> {
        let _enter = self.span.enter();

        let mut records = self.list_linux();
        records.extend(self.list_windows());

        debug!(count = records.len(), "listed containers");
        records
    }

    fn list_linux(&self) -> Vec<ContainerRecord> {
        let result = self
            .run_checked(distrobox::PROGRAM, &distrobox::list_args())
            .and_then(|output| distrobox::parse_list(&output.stdout));

        match result {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "could not list distrobox containers");
                Vec::new()
            }
        }
    }

    fn list_windows(&self) -> Vec<ContainerRecord> {
        if !self.windows_available() {
            return Vec::new();
        }

        match self.run_checked(soda::PROGRAM, &soda::list_args()) {
            Ok(output) => soda::parse_list(&output.stdout),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "could not list soda containers");
                Vec::new()
            }
        }
    }

    /// Creates a container. `image_or_version` is an image reference for
    /// Linux and a Windows version for Windows; `options` only apply to Linux.
    pub fn create(
        &self,
        kind: ContainerKind,
        name: &str,
        image_or_version: &str,
        options: &CreateOptions,
    ) -> bool {
        let _enter = self.span.enter();

        if name.trim().is_empty() {
            warn!(%kind, "refusing to create a container without a name");
            return false;
        }

        let (program, args) = match kind {
            ContainerKind::Linux => (
                distrobox::PROGRAM,
                distrobox::create_args(name, image_or_version, options, self.home.as_deref()),
            ),
            ContainerKind::Windows => {
                if !self.windows_available() {
                    error!(container = name, "soda is not installed");
                    return false;
                }
                (soda::PROGRAM, soda::create_args(name, image_or_version))
            }
        };

        report(self.run_checked(program, &args), "create", name, kind).is_some()
    }

    /// Launches the backend's start action without waiting for it.
    ///
    /// For Linux this is `distrobox enter`, which boots the container as a
    /// side effect of attaching a session.
    pub fn start(&self, record: &ContainerRecord) -> Option<Launched> {
        let _enter = self.span.enter();

        let (program, args) = match record.kind {
            ContainerKind::Linux => (distrobox::PROGRAM, distrobox::enter_args(&record.name)),
            ContainerKind::Windows => (soda::PROGRAM, soda::start_args(&record.name)),
        };

        let launched = self
            .runner
            .spawn_detached(program, &args)
            .map(|pid| Launched { pid });

        report(launched, "start", &record.name, record.kind)
    }

    /// Stops a container and waits for the backend. Linux containers are
    /// stopped through podman directly.
    pub fn stop(&self, record: &ContainerRecord) -> bool {
        let _enter = self.span.enter();

        let (program, args) = match record.kind {
            ContainerKind::Linux => (podman::PROGRAM, podman::stop_args(&record.name)),
            ContainerKind::Windows => (soda::PROGRAM, soda::stop_args(&record.name)),
        };

        report(self.run_checked(program, &args), "stop", &record.name, record.kind).is_some()
    }

    /// Force-removes a container and, once the backend succeeded, its
    /// per-container config document.
    pub fn delete(&self, record: &ContainerRecord) -> bool {
        let _enter = self.span.enter();

        let (program, args) = match record.kind {
            ContainerKind::Linux => (distrobox::PROGRAM, distrobox::remove_args(&record.name)),
            ContainerKind::Windows => (soda::PROGRAM, soda::remove_args(&record.name)),
        };

        let result = self.run_checked(program, &args);
        if report(result, "delete", &record.name, record.kind).is_none() {
            return false;
        }

        match self.configs.remove(&record.name) {
            Ok(removed) => debug!(container = %record.name, removed, "container config cleanup"),
            Err(e) => warn!(
                container = %record.name,
                error = %format!("{e:#}"),
                "container deleted but its config could not be removed"
            ),
        }

        true
    }

    /// Scans a Linux container for desktop descriptors. Windows containers
    /// have no equivalent and always yield nothing.
    pub fn list_applications(&self, record: &ContainerRecord) -> Vec<ApplicationRecord> {
        let _enter = self.span.enter();

        if record.kind == ContainerKind::Windows {
            debug!(container = %record.name, "application scan not supported for windows");
            return Vec::new();
        }

        let listing = match self.run_checked(
            distrobox::PROGRAM,
            &distrobox::find_desktop_files_args(&record.name),
        ) {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    container = %record.name,
                    error = %format!("{e:#}"),
                    "could not search for applications"
                );
                return Vec::new();
            }
        };

        let apps: Vec<ApplicationRecord> = listing
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|path| self.read_application(&record.name, path))
            .collect();

        debug!(container = %record.name, count = apps.len(), "scanned applications");
        apps
    }

    fn read_application(&self, container: &str, path: &str) -> Option<ApplicationRecord> {
        match self.run_checked(distrobox::PROGRAM, &distrobox::read_file_args(container, path)) {
            Ok(output) => ApplicationRecord::parse(path, &output.stdout),
            Err(e) => {
                debug!(container, path, error = %format!("{e:#}"), "skipping unreadable descriptor");
                None
            }
        }
    }

    /// Writes a host launcher for `app`. Defaults the display name to
    /// `"<app> (<container>)"`. Returns the launcher path.
    pub fn create_application_shortcut(
        &self,
        record: &ContainerRecord,
        app: &ApplicationRecord,
        display_name: Option<&str>,
    ) -> Option<PathBuf> {
        let _enter = self.span.enter();

        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| shortcut::default_display_name(record, app));

        match shortcut::write(&self.launcher_dir, record, app, &display_name) {
            Ok(path) => {
                info!(container = %record.name, path = ?path, "created launcher");
                Some(path)
            }
            Err(e) => {
                error!(container = %record.name, error = %format!("{e:#}"), "could not create launcher");
                None
            }
        }
    }

    pub fn container_config(&self, name: &str) -> Map<String, Value> {
        let _enter = self.span.enter();
        self.configs.load(name)
    }

    pub fn save_container_config(&self, name: &str, config: &Map<String, Value>) -> bool {
        let _enter = self.span.enter();

        match self.configs.save(name, config) {
            Ok(()) => true,
            Err(e) => {
                error!(container = name, error = %format!("{e:#}"), "could not save container config");
                false
            }
        }
    }

    fn run_checked(&self, program: &str, args: &[String]) -> anyhow::Result<CommandOutput> {
        let output = self.runner.output(program, args)?;
        ensure_success(&output, program, args)?;
        Ok(output)
    }
}

fn ensure_success(output: &CommandOutput, program: &str, args: &[String]) -> anyhow::Result<()> {
    if output.success() {
        return Ok(());
    }

    let code = output
        .code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "signal".to_string());

    bail!(
        "`{}` exited with {code}: {}",
        describe(program, args),
        output.stderr.trim()
    )
}

fn report<T>(
    result: anyhow::Result<T>,
    action: &str,
    name: &str,
    kind: ContainerKind,
) -> Option<T> {
    match result {
        Ok(value) => {
            info!(container = name, %kind, "{action} succeeded");
            Some(value)
        }
        Err(e) => {
            error!(container = name, %kind, error = %format!("{e:#}"), "{action} failed");
            None
        }
    }
}
