pub mod container;
pub mod doctor;
pub mod settings;
pub mod target;

pub use container::ContainerAction;
pub use settings::ConfigAction;
pub use target::{KindArg, Target};
