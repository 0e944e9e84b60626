pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{
    ApplicationRecord, CommandRunner, ContainerKind, ContainerRecord, ContainerStatus,
    CreateOptions,
};
pub use error::ManagerError;
pub use infra::{Settings, SystemRunner};
pub use services::{ContainerManager, Launched, Refresher};
