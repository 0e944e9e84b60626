//! Command shapes and output parsing for `distrobox`, the Linux backend.

use crate::domain::{ContainerKind, ContainerRecord, ContainerStatus, CreateOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

pub const PROGRAM: &str = "distrobox";

/// Where desktop descriptors are searched for inside a container
pub const APPLICATIONS_DIR: &str = "/usr/share/applications";

/// One element of `distrobox list --json`.
///
/// Fields are kept as raw JSON so a `null` or a numeric timestamp does not
/// reject the entry.
#[derive(Debug, Deserialize)]
struct ListEntry {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    status: Value,
    #[serde(default)]
    distro: Value,
    #[serde(default)]
    image: Value,
    #[serde(default)]
    created: Value,
    #[serde(default)]
    id: Value,
}

impl From<ListEntry> for ContainerRecord {
    fn from(entry: ListEntry) -> Self {
        ContainerRecord {
            name: text(entry.name).unwrap_or_default(),
            status: text(entry.status)
                .as_deref()
                .map(ContainerStatus::from_backend)
                .unwrap_or(ContainerStatus::Unknown),
            distro: text(entry.distro).unwrap_or_else(|| "unknown".to_string()),
            kind: ContainerKind::Linux,
            image: text(entry.image).unwrap_or_default(),
            created: text(entry.created)
                .unwrap_or_else(|| ContainerRecord::UNKNOWN_CREATED.to_string()),
            id: text(entry.id),
        }
    }
}

/// Scalars become text, `null` and structures count as absent.
fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses `distrobox list --json`. Blank output means no containers.
///
/// Output that is not a JSON array is an error. Elements that are not objects
/// are skipped so one odd entry does not hide the rest.
pub fn parse_list(stdout: &str) -> Result<Vec<ContainerRecord>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<Value> =
        serde_json::from_str(stdout).context("parsing `distrobox list --json` output")?;

    let records = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<ListEntry>(entry) {
            Ok(entry) => Some(ContainerRecord::from(entry)),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed distrobox entry");
                None
            }
        })
        .collect();

    Ok(records)
}

pub fn list_args() -> Vec<String> {
    vec!["list".into(), "--json".into()]
}

pub fn create_args(
    name: &str,
    image: &str,
    options: &CreateOptions,
    home: Option<&Path>,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "create".into(),
        "--name".into(),
        name.into(),
        "--image".into(),
        image.into(),
    ];

    if options.home_sharing {
        if let Some(home) = home {
            args.push("--home".into());
            args.push(home.to_string_lossy().into_owned());
        }
    }

    if options.nvidia_support {
        args.push("--nvidia".into());
    }

    for package in &options.additional_packages {
        args.push("--additional-packages".into());
        args.push(package.clone());
    }

    args
}

pub fn enter_args(name: &str) -> Vec<String> {
    vec!["enter".into(), name.into()]
}

pub fn remove_args(name: &str) -> Vec<String> {
    vec!["rm".into(), name.into(), "--force".into()]
}

/// Runs `command` inside the container
pub fn exec_args(name: &str, command: &[&str]) -> Vec<String> {
    let mut args = vec!["enter".into(), name.into(), "--".into()];
    args.extend(command.iter().map(|part| part.to_string()));
    args
}

pub fn find_desktop_files_args(name: &str) -> Vec<String> {
    exec_args(name, &["find", APPLICATIONS_DIR, "-name", "*.desktop"])
}

pub fn read_file_args(name: &str, path: &str) -> Vec<String> {
    exec_args(name, &["cat", path])
}

/// Launcher command line for an application living in the container
pub fn launcher_exec(name: &str, exec: &str) -> String {
    format!("{PROGRAM} enter {name} -- {exec}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_full_entry() {
        let json = r#"[{"name":"dev","status":"running","distro":"fedora","image":"fedora:latest","created":"t0","id":"abc"}]"#;
        let records = parse_list(json).unwrap();

        assert_eq!(
            records,
            vec![ContainerRecord {
                name: "dev".into(),
                status: ContainerStatus::Running,
                distro: "fedora".into(),
                kind: ContainerKind::Linux,
                image: "fedora:latest".into(),
                created: "t0".into(),
                id: Some("abc".into()),
            }]
        );
    }

    #[test]
    fn fills_missing_fields_with_sentinels() {
        let records = parse_list(r#"[{"name":"bare"}]"#).unwrap();

        assert_eq!(records[0].status, ContainerStatus::Unknown);
        assert_eq!(records[0].distro, "unknown");
        assert_eq!(records[0].created, "unknown");
        assert_eq!(records[0].image, "");
        assert!(records[0].id.is_none());
    }

    #[test]
    fn tolerates_null_and_numeric_fields() {
        let json = r#"[
            {"name":"good","status":"running","image":"fedora:latest"},
            {"name":"odd","status":null,"image":null,"created":null},
            {"name":"stamped","created":1700000000,"id":42}
        ]"#;
        let records = parse_list(json).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].status, ContainerStatus::Running);
        assert_eq!(records[1].name, "odd");
        assert_eq!(records[1].image, "");
        assert_eq!(records[1].status, ContainerStatus::Unknown);
        assert_eq!(records[1].created, "unknown");
        assert_eq!(records[2].created, "1700000000");
        assert_eq!(records[2].id.as_deref(), Some("42"));
    }

    #[test]
    fn skips_entries_that_are_not_objects() {
        let records = parse_list(r#"[{"name":"dev"}, "garbage", 7]"#).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "dev");
    }

    #[test]
    fn blank_output_is_empty_list() {
        assert!(parse_list("  \n").unwrap().is_empty());
    }

    #[test]
    fn rejects_unstructured_output() {
        assert!(parse_list("NAME STATUS\ndev running").is_err());
    }

    #[test]
    fn create_args_share_home_by_default() {
        let home = PathBuf::from("/home/alice");
        let args = create_args(
            "t1",
            "ubuntu:latest",
            &CreateOptions::default(),
            Some(home.as_path()),
        );

        assert_eq!(
            args,
            vec![
                "create",
                "--name",
                "t1",
                "--image",
                "ubuntu:latest",
                "--home",
                "/home/alice"
            ]
        );
    }

    #[test]
    fn create_args_with_gpu_and_packages() {
        let options = CreateOptions {
            home_sharing: false,
            nvidia_support: true,
            additional_packages: vec!["git".into(), "vim".into()],
        };
        let args = create_args("t1", "ubuntu:latest", &options, None);

        assert!(!args.contains(&"--home".to_string()));
        assert!(args.contains(&"--nvidia".to_string()));
        assert_eq!(
            &args[args.len() - 4..],
            &["--additional-packages", "git", "--additional-packages", "vim"]
        );
    }

    #[test]
    fn in_container_commands_use_separator() {
        assert_eq!(
            find_desktop_files_args("dev"),
            vec![
                "enter",
                "dev",
                "--",
                "find",
                "/usr/share/applications",
                "-name",
                "*.desktop"
            ]
        );
        assert_eq!(
            read_file_args("dev", "/a.desktop"),
            vec!["enter", "dev", "--", "cat", "/a.desktop"]
        );
    }

    #[test]
    fn launcher_exec_wraps_command() {
        assert_eq!(
            launcher_exec("dev", "firefox %u"),
            "distrobox enter dev -- firefox %u"
        );
    }
}
