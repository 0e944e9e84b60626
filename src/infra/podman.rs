//! The low-level runtime distrobox builds on. Only used to stop containers,
//! since distrobox has no stop primitive.

pub const PROGRAM: &str = "podman";

pub fn stop_args(name: &str) -> Vec<String> {
    vec!["stop".into(), name.into()]
}
