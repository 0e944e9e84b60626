mod container_manager;
mod refresher;

pub use container_manager::{ContainerManager, Launched, REQUIRED_TOOLS};
pub use refresher::Refresher;
