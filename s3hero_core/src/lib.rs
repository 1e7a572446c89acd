pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use storage::errors::{ConfigError, Result};
pub use storage::manager::Manager;
pub use storage::profile::{Config, Profile, Provider};
