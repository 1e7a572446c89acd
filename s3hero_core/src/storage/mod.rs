pub mod errors;
pub mod manager;
pub mod profile;

// Re-export the modules here for easy import elsewhere.
pub use errors::*;
pub use manager::*;
pub use profile::*;
