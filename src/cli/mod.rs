// mod.rs - CLI module

pub mod args;
pub mod validation;

// Re-export main types for convenience
pub use args::Args;
pub use validation::{validate_args, ValidationResult};
