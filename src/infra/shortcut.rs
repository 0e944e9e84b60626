use crate::domain::{ApplicationRecord, ContainerKind, ContainerRecord};
use crate::infra::{distrobox, soda};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_ICON: &str = "application-x-executable";

/// Where launchers land when no directory is configured
pub fn default_launcher_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .unwrap_or_else(|| PathBuf::from("Desktop"))
}

pub fn default_display_name(container: &ContainerRecord, app: &ApplicationRecord) -> String {
    format!("{} ({})", app.display_name(), container.name)
}

/// Renders the host-side `.desktop` launcher for a containerized app.
pub fn render(container: &ContainerRecord, app: &ApplicationRecord, display_name: &str) -> String {
    let exec = app.exec.as_deref().unwrap_or_default();
    let exec_cmd = match container.kind {
        ContainerKind::Linux => distrobox::launcher_exec(&container.name, exec),
        ContainerKind::Windows => soda::launcher_exec(&container.name, exec),
    };
    let comment = app
        .comment
        .clone()
        .unwrap_or_else(|| format!("Run in {} container", container.name));
    let icon = app.icon.as_deref().unwrap_or(DEFAULT_ICON);

    format!(
        "[Desktop Entry]\n\
         Name={display_name}\n\
         Comment={comment}\n\
         Exec={exec_cmd}\n\
         Icon={icon}\n\
         Terminal=false\n\
         Type=Application\n\
         Categories=HoUerManager;\n"
    )
}

/// Writes the launcher into `launcher_dir` with executable permissions and
/// returns its path.
pub fn write(
    launcher_dir: &Path,
    container: &ContainerRecord,
    app: &ApplicationRecord,
    display_name: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(launcher_dir).with_context(|| format!("creating {:?}", launcher_dir))?;

    let target = launcher_dir.join(format!("{}.desktop", file_stem(display_name)));
    fs::write(&target, render(container, app, display_name))
        .with_context(|| format!("writing launcher {:?}", target))?;
    make_executable(&target)?;

    Ok(target)
}

/// File name for a launcher. Path separators become `-` and leading dots are
/// dropped so the file always lands directly inside the launcher directory.
fn file_stem(display_name: &str) -> String {
    let replaced: String = display_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '-' } else { c })
        .collect();
    let stem = replaced.trim().trim_start_matches('.').trim_start();

    if stem.is_empty() {
        "App".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("marking {:?} executable", path))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
