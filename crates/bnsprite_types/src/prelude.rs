//! Prelude module for `bnsprite_types`.
//!
//! This module provides a convenient way to import commonly used types and constants.
//!
//! # Examples
//!
//! ```
//! use bnsprite_types::prelude::*;
//!
//! let mut sprite = SpriteDocument::new();
//! assert!(sprite.new_animation().is_ok());
//! assert_eq!(Format::from_path("hero.sfsa"), Some(Format::Sf));
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	Animation,
	// Codec types
	BnEncoder,
	BnParseConfig,

	// Errors
	FileType,
	Format,
	Frame,
	Limit,
	Object,
	ObjectSize,
	Palette,
	PaletteGroup,
	PaletteImport,
	PointerKind,
	SfEncoder,
	SpriteDocument,
	SpriteError,
	SubAnimation,
	SubFrame,
	SubObject,
	Tileset,
};

// Constants
#[doc(inline)]
pub use crate::file::sprite::{COLORS_16, COLORS_256, TILE_SIZE};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
