//! Sprite object graph: animations, frames, OAM lists and shared resources.
//!
//! Cross references are plain indices: frames name their tileset and palette
//! group by ID into the owning [`SpriteDocument`](super::SpriteDocument), sub frames name an
//! object by its index within the frame.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::file::{FileType, Limit, SpriteError};

/// Bytes per 8x8 4bpp tile.
pub const TILE_SIZE: usize = 0x20;

/// Colours in a 4bpp palette.
pub const COLORS_16: usize = 16;

/// Colours in an 8bpp palette (SF only).
pub const COLORS_256: usize = 256;

/// The twelve hardware sprite dimensions, named width by height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectSize {
	/// 8x8
	#[default]
	S8x8,
	/// 16x8
	S16x8,
	/// 8x16
	S8x16,
	/// 16x16
	S16x16,
	/// 32x8
	S32x8,
	/// 8x32
	S8x32,
	/// 32x32
	S32x32,
	/// 32x16
	S32x16,
	/// 16x32
	S16x32,
	/// 64x64
	S64x64,
	/// 64x32
	S64x32,
	/// 32x64
	S32x64,
}

impl ObjectSize {
	/// Every legal size, ordered by `(size, shape)` bits.
	pub const ALL: [ObjectSize; 12] = [
		ObjectSize::S8x8,
		ObjectSize::S16x8,
		ObjectSize::S8x16,
		ObjectSize::S16x16,
		ObjectSize::S32x8,
		ObjectSize::S8x32,
		ObjectSize::S32x32,
		ObjectSize::S32x16,
		ObjectSize::S16x32,
		ObjectSize::S64x64,
		ObjectSize::S64x32,
		ObjectSize::S32x64,
	];

	/// Decodes the 2-bit OAM size and shape fields.
	///
	/// Shape 3 is prohibited by the hardware and yields `None`.
	pub const fn from_size_shape(size: u8, shape: u8) -> Option<Self> {
		if size > 3 || shape > 2 {
			return None;
		}
		Some(Self::ALL[(size * 3 + shape) as usize])
	}

	/// Encodes to the `(size, shape)` OAM fields.
	pub const fn size_shape(self) -> (u8, u8) {
		let index = self as u8;
		(index / 3, index % 3)
	}

	/// Finds the size with the given pixel dimensions.
	pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
		Self::ALL.into_iter().find(|size| size.width() == width && size.height() == height)
	}

	/// Width in pixels.
	pub const fn width(self) -> u32 {
		match self {
			ObjectSize::S8x8 | ObjectSize::S8x16 | ObjectSize::S8x32 => 8,
			ObjectSize::S16x8 | ObjectSize::S16x16 | ObjectSize::S16x32 => 16,
			ObjectSize::S32x8 | ObjectSize::S32x32 | ObjectSize::S32x16 | ObjectSize::S32x64 => 32,
			ObjectSize::S64x64 | ObjectSize::S64x32 => 64,
		}
	}

	/// Height in pixels.
	pub const fn height(self) -> u32 {
		match self {
			ObjectSize::S8x8 | ObjectSize::S16x8 | ObjectSize::S32x8 => 8,
			ObjectSize::S8x16 | ObjectSize::S16x16 | ObjectSize::S32x16 => 16,
			ObjectSize::S8x32 | ObjectSize::S32x32 | ObjectSize::S16x32 | ObjectSize::S64x32 => 32,
			ObjectSize::S64x64 | ObjectSize::S32x64 => 64,
		}
	}

	/// Number of 8x8 tiles covered.
	pub const fn tile_count(self) -> u32 {
		(self.width() / 8) * (self.height() / 8)
	}
}

/// One hardware sprite (OAM entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubObject {
	/// First tile within the frame's tileset
	pub start_tile: u16,
	/// Horizontal offset from the sprite origin
	pub pos_x: i8,
	/// Vertical offset from the sprite origin
	pub pos_y: i8,
	/// Horizontal flip
	pub h_flip: bool,
	/// Vertical flip
	pub v_flip: bool,
	/// Dimensions
	pub size: ObjectSize,
}

impl Default for SubObject {
	fn default() -> Self {
		Self {
			start_tile: 0,
			pos_x: -4,
			pos_y: -4,
			h_flip: false,
			v_flip: false,
			size: ObjectSize::S8x8,
		}
	}
}

/// A group of OAM entries drawn together with one palette.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Object {
	/// Palette within the frame's palette group (4bpp formats only use 0-15)
	pub palette_index: u8,
	/// OAM entries
	pub sub_objects: Vec<SubObject>,
}

impl Object {
	/// Object with a single default OAM entry.
	pub fn blank() -> Self {
		Self {
			palette_index: 0,
			sub_objects: vec![SubObject::default()],
		}
	}
}

/// One step of a sub animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubFrame {
	/// Object shown, indexed within the frame
	pub object_index: u8,
	/// Duration in game frames (1-255)
	pub delay: u8,
}

impl Default for SubFrame {
	fn default() -> Self {
		Self {
			object_index: 0,
			delay: 1,
		}
	}
}

/// Secondary cycle over a frame's objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubAnimation {
	/// Restart after the last sub frame
	pub looping: bool,
	/// Steps
	pub sub_frames: Vec<SubFrame>,
}

impl SubAnimation {
	/// Sub animation with a single default sub frame.
	pub fn blank() -> Self {
		Self {
			looping: false,
			sub_frames: vec![SubFrame::default()],
		}
	}
}

/// One step of an animation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
	/// Format specific trigger (BN flag bit 0x01)
	pub special_flag_0: bool,
	/// Format specific trigger (BN flag bit 0x02)
	pub special_flag_1: bool,
	/// Tileset ID within the document
	pub tileset_id: usize,
	/// Palette group ID within the document
	pub palette_group_id: usize,
	/// Sub animations
	pub sub_animations: Vec<SubAnimation>,
	/// Objects
	pub objects: Vec<Object>,
	/// Duration in game frames (1-255)
	pub delay: u8,
}

impl Default for Frame {
	fn default() -> Self {
		Self {
			special_flag_0: false,
			special_flag_1: false,
			tileset_id: 0,
			palette_group_id: 0,
			sub_animations: vec![SubAnimation::blank()],
			objects: vec![Object::blank()],
			delay: 1,
		}
	}
}

impl Frame {
	/// Compares tileset and OAM geometry, ignoring palettes, delays and sub animations.
	pub fn same_sprite(&self, other: &Frame) -> bool {
		self.tileset_id == other.tileset_id
			&& self.objects.len() == other.objects.len()
			&& self.objects.iter().zip(&other.objects).all(|(a, b)| a.sub_objects == b.sub_objects)
	}
}

/// Ordered list of frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Animation {
	/// Restart after the last frame
	pub looping: bool,
	/// Frames (at least one)
	pub frames: Vec<Frame>,
}

impl Default for Animation {
	fn default() -> Self {
		Self {
			looping: false,
			frames: vec![Frame::default()],
		}
	}
}

/// Raw 4bpp tile data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tileset {
	/// Tile bytes, a multiple of [`TILE_SIZE`]
	pub data: Vec<u8>,
}

impl Tileset {
	/// Wraps tile data, rejecting empty or partial tiles.
	pub fn from_bytes(data: Vec<u8>) -> Result<Self, SpriteError> {
		if data.is_empty() || data.len() % TILE_SIZE != 0 {
			return Err(SpriteError::InvalidResourceSize {
				file_type: FileType::Tileset,
				size: data.len(),
			});
		}
		Ok(Self {
			data,
		})
	}

	/// Number of whole tiles.
	pub fn tile_count(&self) -> usize {
		self.data.len() / TILE_SIZE
	}

	/// One palette index per pixel, low nibble first.
	pub fn pixels(&self) -> Vec<u8> {
		self.data.iter().flat_map(|&byte| [byte & 0x0F, byte >> 4]).collect()
	}
}

/// A list of GBA BGR555 colours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Palette {
	/// Colours, 16 or 256 entries
	pub colors: Vec<u16>,
}

const fn expand_channel(channel: u32) -> u32 {
	(channel * 0xFF + 0x0F) / 0x1F
}

const fn quantize_channel(channel: u32) -> u32 {
	(channel * 0x1F + 0x7F) / 0xFF
}

impl Palette {
	/// Expands a BGR555 colour to opaque `0xAARRGGBB`.
	pub const fn gba_to_rgb(color: u16) -> u32 {
		let color = color as u32;
		let r = expand_channel(color & 0x1F);
		let g = expand_channel((color >> 5) & 0x1F);
		let b = expand_channel((color >> 10) & 0x1F);
		(0xFF << 24) | (r << 16) | (g << 8) | b
	}

	/// Quantizes `0x??RRGGBB` to BGR555, alpha is ignored.
	pub const fn rgb_to_gba(rgb: u32) -> u16 {
		let r = quantize_channel((rgb >> 16) & 0xFF);
		let g = quantize_channel((rgb >> 8) & 0xFF);
		let b = quantize_channel(rgb & 0xFF);
		((b << 10) | (g << 5) | r) as u16
	}

	/// Every colour as `0xAARRGGBB`.
	pub fn to_rgb(&self) -> Vec<u32> {
		self.colors.iter().map(|&color| Self::gba_to_rgb(color)).collect()
	}
}

/// Alternative palettes a frame's objects select from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaletteGroup {
	/// Palettes (at least one)
	pub palettes: Vec<Palette>,
}

impl PaletteGroup {
	/// Parses a headerless dump of little-endian colours.
	///
	/// # Errors
	///
	/// Fails if `colors_per_palette` is not 16 or 256, if the data does not hold a
	/// whole number of palettes, or if it holds more than 256 palettes.
	pub fn from_bytes(data: &[u8], colors_per_palette: usize) -> Result<Self, SpriteError> {
		let palette_bytes = colors_per_palette * 2;
		if !matches!(colors_per_palette, COLORS_16 | COLORS_256)
			|| data.is_empty()
			|| data.len() % palette_bytes != 0
		{
			return Err(SpriteError::InvalidResourceSize {
				file_type: FileType::Palette,
				size: data.len(),
			});
		}
		SpriteError::check_limit(Limit::Palettes, data.len() / palette_bytes)?;

		let palettes = data
			.chunks_exact(palette_bytes)
			.map(|chunk| {
				let mut colors = vec![0; colors_per_palette];
				LittleEndian::read_u16_into(chunk, &mut colors);
				Palette {
					colors,
				}
			})
			.collect();

		Ok(Self {
			palettes,
		})
	}

	/// Serializes every colour as little-endian `u16`, no header.
	pub fn to_bytes(&self) -> Vec<u8> {
		let colors: Vec<u16> = self.palettes.iter().flat_map(|palette| palette.colors.iter().copied()).collect();
		let mut data = vec![0; colors.len() * 2];
		LittleEndian::write_u16_into(&colors, &mut data);
		data
	}
}
