//! Command shapes and output parsing for `soda`, the optional Windows backend.

use crate::domain::{ContainerKind, ContainerRecord, ContainerStatus};

pub const PROGRAM: &str = "soda";

/// Image reported when a listing line carries only a name
const DEFAULT_IMAGE: &str = "windows";

/// Parses the tabular output of `soda list`.
///
/// The first line is a header. Every other non-blank line is split on
/// whitespace: name first, image second. A line mentioning "running"
/// anywhere, in any case, is running; everything else is stopped. A container
/// whose name contains "running" is therefore always reported as running.
pub fn parse_list(stdout: &str) -> Vec<ContainerRecord> {
    stdout
        .trim_start()
        .lines()
        .skip(1)
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<ContainerRecord> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let image = tokens.next().unwrap_or(DEFAULT_IMAGE);

    let status = if line.to_lowercase().contains("running") {
        ContainerStatus::Running
    } else {
        ContainerStatus::Stopped
    };

    Some(ContainerRecord {
        name: name.to_string(),
        status,
        distro: "Windows".to_string(),
        kind: ContainerKind::Windows,
        image: image.to_string(),
        created: ContainerRecord::UNKNOWN_CREATED.to_string(),
        id: None,
    })
}

pub fn list_args() -> Vec<String> {
    vec!["list".into()]
}

pub fn create_args(name: &str, version: &str) -> Vec<String> {
    vec![
        "create".into(),
        "--name".into(),
        name.into(),
        "--version".into(),
        version.into(),
    ]
}

pub fn start_args(name: &str) -> Vec<String> {
    vec!["start".into(), name.into()]
}

pub fn stop_args(name: &str) -> Vec<String> {
    vec!["stop".into(), name.into()]
}

pub fn remove_args(name: &str) -> Vec<String> {
    vec!["remove".into(), name.into()]
}

pub fn launcher_exec(name: &str, exec: &str) -> String {
    format!("{PROGRAM} run {name} {exec}")
}
