//! Error types for sprite parsing, serialization and editing.

use std::fmt;

use thiserror::Error;

/// Kind of file or blob an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// BN sprite (`.bnsa`, `.bnsprite`, `.dmp`)
	Bn,
	/// SF sprite (`.sfsa`, `.sfsprite`, `.bin`)
	Sf,
	/// Raw 4bpp tileset dump
	Tileset,
	/// Raw GBA palette dump
	Palette,
}

impl fmt::Display for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FileType::Bn => write!(f, "BN sprite"),
			FileType::Sf => write!(f, "SF sprite"),
			FileType::Tileset => write!(f, "tileset"),
			FileType::Palette => write!(f, "palette"),
		}
	}
}

/// Which pointer failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
	/// Entry of the top-level animation table
	Animation,
	/// Frame row tileset pointer
	Tileset,
	/// Frame row palette group pointer
	PaletteGroup,
	/// Frame row sub animation group pointer
	SubAnimationGroup,
	/// Entry of a sub animation group table
	SubAnimation,
	/// Frame row object group pointer
	ObjectGroup,
	/// Entry of an object group table
	Object,
	/// Entry of the SF sprite table, or an animation entry's sprite index
	Sprite,
	/// SF file header section offset
	Section,
}

impl fmt::Display for PointerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			PointerKind::Animation => "animation",
			PointerKind::Tileset => "tileset",
			PointerKind::PaletteGroup => "palette group",
			PointerKind::SubAnimationGroup => "sub animation group",
			PointerKind::SubAnimation => "sub animation",
			PointerKind::ObjectGroup => "object group",
			PointerKind::Object => "object",
			PointerKind::Sprite => "sprite",
			PointerKind::Section => "section",
		};
		f.write_str(name)
	}
}

/// Format limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
	/// Animations per document (255)
	Animations,
	/// Sub animations per frame (255)
	SubAnimations,
	/// Objects per frame (255)
	Objects,
	/// Unique SF sprites (255)
	Sprites,
	/// Palettes per palette group (256)
	Palettes,
	/// BN object palette index (15)
	PaletteIndex,
	/// BN start tile index (255)
	StartTile,
	/// Tiles packed into the SF tileset block (65535)
	TileCount,
}

impl Limit {
	/// Largest value the format can store for this limit.
	pub const fn max(self) -> usize {
		match self {
			Limit::Animations | Limit::SubAnimations | Limit::Objects | Limit::Sprites => 0xFF,
			Limit::Palettes => 0x100,
			Limit::PaletteIndex => 0x0F,
			Limit::StartTile => 0xFF,
			Limit::TileCount => 0xFFFF,
		}
	}
}

impl fmt::Display for Limit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Limit::Animations => "animation count",
			Limit::SubAnimations => "sub animation count",
			Limit::Objects => "object count",
			Limit::Sprites => "unique sprite count",
			Limit::Palettes => "palette count",
			Limit::PaletteIndex => "palette index",
			Limit::StartTile => "start tile",
			Limit::TileCount => "tile count",
		};
		f.write_str(name)
	}
}

/// Unified error type for every codec and model operation.
#[derive(Debug, Error)]
pub enum SpriteError {
	/// IO error, including reads past the end of the data
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// A loop without a length field ran into the end of the file
	#[error("{file_type}: reached the end of file while reading {section} at address 0x{offset:08X}")]
	UnexpectedEof {
		/// Source format
		file_type: FileType,
		/// Section being read
		section: &'static str,
		/// Position of the cursor
		offset: u64,
	},

	/// Pointer out of bounds or pointing backwards into its own table
	#[error("{file_type}: invalid {kind} pointer at address 0x{offset:08X}")]
	MalformedPointer {
		/// Source format
		file_type: FileType,
		/// Which pointer failed
		kind: PointerKind,
		/// Address of the pointer entry
		offset: u64,
	},

	/// Illegal size/shape pair, flag combination or reserved bit
	#[error("{file_type}: unexpected {field} 0x{value:02X} at address 0x{offset:08X}")]
	MalformedEnumeration {
		/// Source format
		file_type: FileType,
		/// Field being decoded
		field: &'static str,
		/// Raw value found
		value: u32,
		/// Address of the offending byte(s)
		offset: u64,
	},

	/// A delay byte of zero
	#[error("{file_type}: invalid delay 0 at address 0x{offset:08X}")]
	ZeroDelay {
		/// Source format
		file_type: FileType,
		/// Address of the delay byte
		offset: u64,
	},

	/// Tileset data extends past the end of the file
	#[error("{file_type}: error reading tileset at address 0x{offset:08X}")]
	MalformedTileset {
		/// Source format
		file_type: FileType,
		/// Address of the tileset
		offset: u64,
	},

	/// Palette group without a single valid palette
	#[error("{file_type}: invalid palette at address 0x{offset:08X}")]
	MalformedPalette {
		/// Source format
		file_type: FileType,
		/// Address where scanning stopped
		offset: u64,
	},

	/// A count or index exceeds what the format can store
	#[error("{limit} exceeds the format limit: {actual} > {}", limit.max())]
	LimitExceeded {
		/// Which limit
		limit: Limit,
		/// Offending value
		actual: usize,
	},

	/// SF palette block uses a colour depth other than 5 bits per channel
	#[error("Unsupported color mode {0}")]
	UnsupportedColorDepth(u16),

	/// Imported blob has an unusable length
	#[error("Invalid {file_type} file: size {size} bytes is empty or not a multiple of the unit size")]
	InvalidResourceSize {
		/// Kind of blob
		file_type: FileType,
		/// Size in bytes
		size: usize,
	},

	/// Document cannot be serialized as-is
	#[error("{file_type}: {message}")]
	InvalidData {
		/// Target format
		file_type: FileType,
		/// Description of the problem
		message: String,
	},

	/// SF stores start tiles halved, so odd tiles cannot be represented
	#[error(
		"Odd start tile {tile} in animation {animation}, frame {frame}, object {object}, OAM {sub_object}"
	)]
	OddStartTile {
		/// Animation index
		animation: usize,
		/// Frame index
		frame: usize,
		/// Object index
		object: usize,
		/// Sub object index
		sub_object: usize,
		/// Offending start tile
		tile: u16,
	},

	/// Model API index outside the current bounds
	#[error("Invalid {what} index {index} (count: {len})")]
	IndexOutOfRange {
		/// Kind of entity
		what: &'static str,
		/// Requested index
		index: usize,
		/// Number of entities available
		len: usize,
	},

	/// Removing the frame would leave the animation empty
	#[error("Animation {animation} must keep at least one frame")]
	EmptyAnimation {
		/// Animation index
		animation: usize,
	},

	/// Nothing to encode
	#[error("Sprite has no animations")]
	EmptyDocument,
}

impl SpriteError {
	/// Creates an `IndexOutOfRange` error.
	pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
		Self::IndexOutOfRange {
			what,
			index,
			len,
		}
	}

	/// Creates an `InvalidData` error.
	pub fn invalid_data(file_type: FileType, message: impl Into<String>) -> Self {
		Self::InvalidData {
			file_type,
			message: message.into(),
		}
	}

	/// Returns an error if `actual` is above the limit.
	pub fn check_limit(limit: Limit, actual: usize) -> Result<(), Self> {
		if actual > limit.max() {
			return Err(Self::LimitExceeded {
				limit,
				actual,
			});
		}
		Ok(())
	}

	/// Byte offset the error refers to, if any.
	pub fn offset(&self) -> Option<u64> {
		match self {
			SpriteError::UnexpectedEof {
				offset,
				..
			}
			| SpriteError::MalformedPointer {
				offset,
				..
			}
			| SpriteError::MalformedEnumeration {
				offset,
				..
			}
			| SpriteError::ZeroDelay {
				offset,
				..
			}
			| SpriteError::MalformedTileset {
				offset,
				..
			}
			| SpriteError::MalformedPalette {
				offset,
				..
			} => Some(*offset),
			_ => None,
		}
	}
}
