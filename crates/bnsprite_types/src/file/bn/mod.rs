//! BN sprite support.
//!
//! BN sprites are a tree of pointer tables. Every pointer is a little-endian
//! `u32` relative to the metadata offset (4 when the metadata header is
//! present, 0 otherwise), except entries of the sub animation and object group
//! tables, which are relative to the start of their own group.
//!
//! # File Structure
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0x00 | 1 | `largest_tileset` | Tile count of the largest tileset, clamped to 255 |
//! | 0x01 | 2 | `metadata` | `00 01` when the header is present |
//! | 0x03 | 1 | `animation_count` | Number of animations |
//! | 0x04 | 4 × N | `animations` | Pointers to the first frame row of each animation |
//!
//! ## Frame row (20 bytes)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00 | 4 | tileset pointer (`u32` byte length, then tile data) |
//! | 0x04 | 4 | palette group pointer (`20 00 00 00`, then 16-colour palettes) |
//! | 0x08 | 4 | sub animation group pointer |
//! | 0x0C | 4 | object group pointer |
//! | 0x10 | 1 | delay |
//! | 0x12 | 1 | flags: `0x01`/`0x02` special, `0x40` loop, `0x80` or `0x40` last frame |
//!
//! Frame rows of one animation follow each other until a row flagged as last.
//!
//! ## Sub animation and object groups
//!
//! Both groups start with a table of offsets relative to the group, whose first
//! entry doubles as the table length. Sub animations are `(object, delay, flag)`
//! triples ending with a flag that has `0x80` or `0x40` set. Objects are 5-byte
//! OAM records ending with `FF FF FF FF FF`:
//!
//! | Byte | Bits | Field |
//! |------|------|-------|
//! | 0 | 0-7 | start tile |
//! | 1 | 0-7 | x (signed) |
//! | 2 | 0-7 | y (signed) |
//! | 3 | 0-1, 6, 7 | size, h-flip, v-flip |
//! | 4 | 0-1, 4-7 | shape, palette index |
//!
//! # Examples
//!
//! ```no_run
//! use bnsprite_types::file::{bn::ParseConfig, sprite::SpriteDocument};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sprite = SpriteDocument::open_bn_with_config("dump.dmp", &ParseConfig::strict())?;
//! let bytes = sprite.to_bn_bytes()?;
//! println!("{} bytes", bytes.len());
//! # Ok(())
//! # }
//! ```

mod decode;
mod encode;
mod parse_config;


pub use decode::decode;
pub use encode::Encoder;
pub use parse_config::ParseConfig;

/// Format constants.
pub mod constants {
	/// Size of the optional metadata header
	pub const METADATA_SIZE: u64 = 4;

	/// Bytes 1 and 2 of a file with a metadata header
	pub const METADATA_MAGIC: [u8; 2] = [0x00, 0x01];

	/// Size of one frame row
	pub const FRAME_ROW_SIZE: u64 = 0x14;

	/// Frame flag: special flag 0
	pub const FLAG_SPECIAL_0: u8 = 0x01;

	/// Frame flag: special flag 1
	pub const FLAG_SPECIAL_1: u8 = 0x02;

	/// Loop bit, on the last frame or sub frame only
	pub const FLAG_LOOP: u8 = 0x40;

	/// Last frame without loop
	pub const FLAG_END: u8 = 0x80;

	/// Any of these bits terminates a frame or sub frame list
	pub const FLAG_TERMINATOR_MASK: u8 = 0xC0;

	/// Every legal frame flag bit
	pub const FRAME_FLAG_MASK: u8 = 0xC3;

	/// Marker word before the colours of a palette group
	pub const PALETTE_MARKER: u32 = 0x20;

	/// Colour bit that is never set in a valid palette
	pub const INVALID_COLOR_BIT: u16 = 0x8000;

	/// Size of one OAM record
	pub const OBJECT_RECORD_SIZE: usize = 5;

	/// Record terminating an object
	pub const OBJECT_TERMINATOR: [u8; OBJECT_RECORD_SIZE] = [0xFF; OBJECT_RECORD_SIZE];

	/// Trailer written after every sub animation
	pub const SUB_ANIMATION_TRAILER: [u8; 3] = [0xFF; 3];

	/// Pointer written for unused tilesets and palette groups
	pub const UNUSED_POINTER: u32 = 0xFFFF_FFFF;

	/// Smallest sub animation reachable by a table entry (two triples)
	pub const MIN_SUB_ANIMATION_SIZE: u64 = 6;

	/// Smallest object reachable by a table entry (a record and the terminator)
	pub const MIN_OBJECT_SIZE: u64 = 10;

	/// OAM byte 3: horizontal flip
	pub const OAM_H_FLIP: u8 = 0x40;

	/// OAM byte 3: vertical flip
	pub const OAM_V_FLIP: u8 = 0x80;

	/// OAM byte 3: reserved bits
	pub const OAM_RESERVED_3: u8 = 0x3C;

	/// OAM byte 4: reserved bits
	pub const OAM_RESERVED_4: u8 = 0x0C;
}
