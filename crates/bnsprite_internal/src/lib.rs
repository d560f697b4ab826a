//! This module is separated into its own crate to keep the public facade thin, and should not be used directly.

/// `use bnsprite_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export bnsprite_types for convenience
pub use bnsprite_types;

// Re-export commonly used types at crate root
pub use bnsprite_types::file::{Format, SpriteDocument, SpriteError, bn, sf, sprite};
