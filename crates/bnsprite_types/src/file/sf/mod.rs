//! SF sprite support.
//!
//! SF sprites store every distinct frame layout once as a "sprite" and build
//! animations from 4-byte entries referencing those sprites. A frame holds one
//! object, all frames share one palette group and tile numbers are stored
//! halved.
//!
//! # File Structure
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0x00 | 4 | `tileset_header` | Offset of the tileset section |
//! | 0x04 | 4 | `palette_header` | Offset of the palette section |
//! | 0x08 | 4 | `animation_header` | Offset of the animation section |
//! | 0x0C | 4 | `sprite_header` | Offset of the sprite section |
//! | 0x10 | 4 | `tile_shift` | Left shift applied to stored start tiles |
//!
//! ## Tileset section
//!
//! `u16` largest tile count, `u16` total tile count, `u16` header size, 2 bytes
//! padding, then one `(u16 tile_count, u16 tile_number)` entry per sprite. Tile
//! data follows the header; a sprite's tiles start at
//! `section + header_size + tile_number * 0x20`.
//!
//! ## Palette section
//!
//! `u16` colour depth (always 5), `u16` colours per palette, then palettes until
//! the next section.
//!
//! ## Animation section
//!
//! `u16` count, 2 bytes padding, a table of offsets relative to the section, then
//! entries of `(sprite, delay, flag, palette)`. The last entry of an animation
//! has flag `0x80`, or `0x40` when it loops.
//!
//! ## Sprite section
//!
//! `u16` count, 2 bytes padding, a table of offsets relative to the section, then
//! 8-byte OAM records:
//!
//! | Byte | Field |
//! |------|-------|
//! | 0 | start tile bits 0-7 (after the shift) |
//! | 1 | x (signed) |
//! | 2 | y (signed) |
//! | 3 | size |
//! | 4 | shape |
//! | 5 | `0x01` h-flip, `0x02` v-flip |
//! | 6 | non-zero on the last record |
//! | 7 | start tile bits 8-15 (after the shift) |
//!
//! # Examples
//!
//! ```no_run
//! use bnsprite_types::file::sprite::SpriteDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sprite = SpriteDocument::open_sf("battle.sfsa")?;
//! for (index, animation) in sprite.animations().iter().enumerate() {
//!     println!("animation {index}: {} frames", animation.frames.len());
//! }
//! # Ok(())
//! # }
//! ```

mod decode;
mod encode;


pub use decode::decode;
pub use encode::Encoder;

/// Format constants.
pub mod constants {
	/// Size of the file header
	pub const HEADER_SIZE: u64 = 0x14;

	/// Tile number shift written by the encoder
	pub const TILE_SHIFT: u32 = 1;

	/// Count and padding at the start of the animation and sprite sections
	pub const SECTION_HEADER_SIZE: u64 = 4;

	/// Fixed part of the tileset section header
	pub const TILESET_HEADER_SIZE: u64 = 8;

	/// One `(tile_count, tile_number)` entry
	pub const TILESET_ENTRY_SIZE: u64 = 4;

	/// The only supported bits per colour channel
	pub const COLOR_DEPTH: u16 = 5;

	/// One `(sprite, delay, flag, palette)` animation entry
	pub const ANIMATION_ENTRY_SIZE: u64 = 4;

	/// One OAM record
	pub const SPRITE_RECORD_SIZE: u64 = 8;

	/// Loop bit of the last animation entry
	pub const FLAG_LOOP: u8 = 0x40;

	/// Last animation entry without loop
	pub const FLAG_END: u8 = 0x80;

	/// Any of these bits terminates an animation
	pub const FLAG_TERMINATOR_MASK: u8 = 0xC0;

	/// OAM flip byte: horizontal flip
	pub const FLIP_H: u8 = 0x01;

	/// OAM flip byte: vertical flip
	pub const FLIP_V: u8 = 0x02;
}
