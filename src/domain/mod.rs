mod application;
mod container;
pub mod traits;

pub use application::ApplicationRecord;
pub use container::{ContainerKind, ContainerRecord, ContainerStatus, CreateOptions};
pub use traits::{CommandOutput, CommandRunner};
