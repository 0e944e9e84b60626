pub mod config;
pub mod distrobox;
pub mod podman;
pub mod process;
pub mod shortcut;
pub mod soda;

pub use config::{ContainerConfigStore, Settings};
pub use process::SystemRunner;
