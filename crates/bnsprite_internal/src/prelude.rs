//! Prelude module for `bnsprite_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use bnsprite_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let mut sprite = SpriteDocument::new();
//! sprite.push_tileset(vec![0; TILE_SIZE]).unwrap();
//! sprite.import_palette_group_bytes(&[0; 0x20], COLORS_16, PaletteImport::NewGroup).unwrap();
//! sprite.new_animation().unwrap();
//!
//! let bytes = sprite.to_bn_bytes().unwrap();
//! assert_eq!(SpriteDocument::from_bn_bytes(&bytes).unwrap(), sprite);
//! ```

// Re-export everything from bnsprite_types::prelude
#[doc(inline)]
pub use bnsprite_types::prelude::*;

// Re-export the entire bnsprite_types module for advanced usage
#[doc(inline)]
pub use bnsprite_types;
