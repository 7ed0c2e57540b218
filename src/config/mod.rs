pub mod defaults;
pub mod loader;
pub mod types;

pub use defaults::*;
pub use loader::ConfigLoader;
pub use types::*;
