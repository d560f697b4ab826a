//! Sprite file support for `bnsprite-rs`.

mod cursor;
mod error;
mod pointer;
mod registry;

pub mod bn;
pub mod sf;
pub mod sprite;

// Re-export unified error type
pub use error::{FileType, Limit, PointerKind, SpriteError};

// Re-export main sprite types
pub use bn::{Encoder as BnEncoder, ParseConfig as BnParseConfig};
pub use sf::Encoder as SfEncoder;
pub use sprite::{
	Animation, Format, Frame, Object, ObjectSize, Palette, PaletteGroup, PaletteImport, SpriteDocument,
	SubAnimation, SubFrame, SubObject, Tileset,
};
