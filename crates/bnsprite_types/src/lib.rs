//! This crate provides the sprite data model and the BN/SF codecs for the `bnsprite-rs` project.
//!
//! # File Formats
//!
//! - **BN**: Pointer-tree sprites with per-frame sub animations and palette groups
//!   (`.bnsa`, `.bnsprite`, `.dmp`)
//! - **SF**: Section-based sprites built from deduplicated single-object frames
//!   (`.sfsa`, `.sfsprite`, `.bin`)
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use bnsprite_types::prelude::*;
//!
//! # fn main() -> Result<(), SpriteError> {
//! let mut sprite = SpriteDocument::open_bn("hero.bnsa")?;
//! sprite.convert_bn_to_sf()?;
//! sprite.save_sf("hero.sfsa")?;
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use bnsprite_types::file::{bn::ParseConfig, sprite::SpriteDocument};
//!
//! let sprite = SpriteDocument::open_bn_with_config("hero.bnsa", &ParseConfig::strict());
//! // ...
//! ```

pub mod file;

/// `use bnsprite_types::prelude::*;` to import commonly used items.
pub mod prelude;
