//! In-memory sprite document shared by the BN and SF codecs.
//!
//! A [`SpriteDocument`] owns three arenas: animations, tilesets and palette
//! groups. Frames refer to resources by their index in those arenas, so a
//! tileset used by many frames is stored once.
//!
//! # Examples
//!
//! ## Converting a BN sprite to SF
//!
//! ```no_run
//! use bnsprite_types::file::sprite::SpriteDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sprite = SpriteDocument::open_bn("hero.bnsa")?;
//! if sprite.convert_bn_to_sf()? {
//!     println!("palette groups merged");
//! }
//! sprite.save_sf("hero.sfsa")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Building a sprite from scratch
//!
//! ```
//! use bnsprite_types::file::sprite::{PaletteGroup, PaletteImport, SpriteDocument, COLORS_16};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sprite = SpriteDocument::new();
//! sprite.push_tileset(vec![0x11; 0x40])?;
//! sprite.import_palette_group_bytes(&[0u8; 0x20], COLORS_16, PaletteImport::NewGroup)?;
//! sprite.new_animation()?;
//!
//! let bytes = sprite.to_bn_bytes()?;
//! let decoded = SpriteDocument::from_bn_bytes(&bytes)?;
//! assert_eq!(decoded, sprite);
//! # Ok(())
//! # }
//! ```

mod convert;
mod edit;
mod format;
mod types;

use std::{
	fs,
	io::{BufWriter, Cursor, Read, Seek, Write},
	path::Path,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::file::{FileType, Limit, SpriteError, bn, sf};

pub use edit::PaletteImport;
pub use format::Format;
pub use types::{
	Animation, COLORS_16, COLORS_256, Frame, Object, ObjectSize, Palette, PaletteGroup, SubAnimation,
	SubFrame, SubObject, TILE_SIZE, Tileset,
};

/// A complete sprite: animations plus the resources their frames reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteDocument {
	animations: Vec<Animation>,
	tilesets: Vec<Tileset>,
	palette_groups: Vec<PaletteGroup>,
}

impl SpriteDocument {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a document from prepared arenas.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::InvalidData`] if a frame names a tileset or palette
	/// group that does not exist, and [`SpriteError::LimitExceeded`] for more than
	/// 255 animations.
	pub fn from_parts(
		animations: Vec<Animation>,
		tilesets: Vec<Tileset>,
		palette_groups: Vec<PaletteGroup>,
	) -> Result<Self, SpriteError> {
		let document = Self::from_raw(animations, tilesets, palette_groups);
		SpriteError::check_limit(Limit::Animations, document.animations.len())?;
		document.check_references(FileType::Bn)?;
		Ok(document)
	}

	/// Assembles a document without validation, for decoders that already did it.
	pub(crate) fn from_raw(
		animations: Vec<Animation>,
		tilesets: Vec<Tileset>,
		palette_groups: Vec<PaletteGroup>,
	) -> Self {
		Self {
			animations,
			tilesets,
			palette_groups,
		}
	}

	/// Every frame's tileset and palette group ID must index an existing resource.
	pub(crate) fn check_references(&self, file_type: FileType) -> Result<(), SpriteError> {
		for (animation_index, animation) in self.animations.iter().enumerate() {
			for (frame_index, frame) in animation.frames.iter().enumerate() {
				if frame.tileset_id >= self.tilesets.len() {
					return Err(SpriteError::invalid_data(
						file_type,
						format!(
							"animation {animation_index} frame {frame_index} uses missing tileset {}",
							frame.tileset_id
						),
					));
				}
				if frame.palette_group_id >= self.palette_groups.len() {
					return Err(SpriteError::invalid_data(
						file_type,
						format!(
							"animation {animation_index} frame {frame_index} uses missing palette group {}",
							frame.palette_group_id
						),
					));
				}
			}
		}
		Ok(())
	}

	/// All animations in order.
	pub fn animations(&self) -> &[Animation] {
		&self.animations
	}

	/// Number of animations.
	pub fn animation_count(&self) -> usize {
		self.animations.len()
	}

	/// Returns `true` if the document has no animations.
	pub fn is_empty(&self) -> bool {
		self.animations.is_empty()
	}

	/// Animation at `index`.
	pub fn animation(&self, index: usize) -> Result<&Animation, SpriteError> {
		self.animations
			.get(index)
			.ok_or_else(|| SpriteError::out_of_range("animation", index, self.animations.len()))
	}

	/// Frame `frame` of animation `animation`.
	pub fn frame(&self, animation: usize, frame: usize) -> Result<&Frame, SpriteError> {
		let frames = &self.animation(animation)?.frames;
		frames.get(frame).ok_or_else(|| SpriteError::out_of_range("frame", frame, frames.len()))
	}

	/// All tilesets, indexed by tileset ID.
	pub fn tilesets(&self) -> &[Tileset] {
		&self.tilesets
	}

	/// Tileset with the given ID.
	pub fn tileset(&self, id: usize) -> Result<&Tileset, SpriteError> {
		self.tilesets.get(id).ok_or_else(|| SpriteError::out_of_range("tileset", id, self.tilesets.len()))
	}

	/// All palette groups, indexed by palette group ID.
	pub fn palette_groups(&self) -> &[PaletteGroup] {
		&self.palette_groups
	}

	/// Palette group with the given ID.
	pub fn palette_group(&self, id: usize) -> Result<&PaletteGroup, SpriteError> {
		self.palette_groups
			.get(id)
			.ok_or_else(|| SpriteError::out_of_range("palette group", id, self.palette_groups.len()))
	}

	/// Total number of frames across all animations.
	pub fn frame_count(&self) -> usize {
		self.animations.iter().map(|animation| animation.frames.len()).sum()
	}

	/// Opens a sprite, choosing the codec from the file extension.
	///
	/// Unknown extensions are read as BN, the format the tool was built around.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or fails validation.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, SpriteError> {
		match Format::from_path(&path) {
			Some(Format::Sf) => Self::open_sf(path),
			_ => Self::open_bn(path),
		}
	}

	/// Opens a BN sprite with the default [`bn::ParseConfig`].
	///
	/// # Arguments
	///
	/// * `path` - Path to a `.bnsa`, `.bnsprite` or `.dmp` file
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read, a pointer is out of bounds,
	/// an enumeration holds an illegal value, or a delay is zero. The error
	/// carries the byte offset of the offending data.
	///
	/// # Examples
	///
	/// ```no_run
	/// use bnsprite_types::file::sprite::SpriteDocument;
	///
	/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
	/// let sprite = SpriteDocument::open_bn("hero.bnsa")?;
	/// println!("{} animations", sprite.animation_count());
	/// # Ok(())
	/// # }
	/// ```
	pub fn open_bn(path: impl AsRef<Path>) -> Result<Self, SpriteError> {
		Self::open_bn_with_config(path, &bn::ParseConfig::default())
	}

	/// Opens a BN sprite with an explicit parse configuration.
	pub fn open_bn_with_config(
		path: impl AsRef<Path>,
		config: &bn::ParseConfig,
	) -> Result<Self, SpriteError> {
		let file = fs::File::open(path)?;
		Self::from_bn_reader(std::io::BufReader::new(file), config)
	}

	/// Parses a BN sprite held in memory.
	pub fn from_bn_bytes(data: &[u8]) -> Result<Self, SpriteError> {
		Self::from_bn_reader(Cursor::new(data), &bn::ParseConfig::default())
	}

	/// Parses a BN sprite from any seekable reader.
	pub fn from_bn_reader<R: Read + Seek>(reader: R, config: &bn::ParseConfig) -> Result<Self, SpriteError> {
		bn::decode(reader, config)
	}

	/// Opens an SF sprite.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read, a section or sprite index is
	/// out of range, or the palette block uses a colour depth other than 5.
	pub fn open_sf(path: impl AsRef<Path>) -> Result<Self, SpriteError> {
		let file = fs::File::open(path)?;
		Self::from_sf_reader(std::io::BufReader::new(file))
	}

	/// Parses an SF sprite held in memory.
	pub fn from_sf_bytes(data: &[u8]) -> Result<Self, SpriteError> {
		Self::from_sf_reader(Cursor::new(data))
	}

	/// Parses an SF sprite from any seekable reader.
	pub fn from_sf_reader<R: Read + Seek>(reader: R) -> Result<Self, SpriteError> {
		sf::decode(reader)
	}

	/// Saves the sprite, choosing the codec from the file extension.
	///
	/// Unknown extensions are written as BN.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SpriteError> {
		match Format::from_path(&path) {
			Some(Format::Sf) => self.save_sf(path),
			_ => self.save_bn(path),
		}
	}

	/// Writes the sprite as BN.
	///
	/// The whole document is validated before the file is created, so a
	/// validation failure leaves the file system untouched.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::EmptyDocument`], [`SpriteError::LimitExceeded`] or
	/// [`SpriteError::InvalidData`] if the document cannot be represented, or an
	/// IO error from writing.
	///
	/// # Examples
	///
	/// ```no_run
	/// use bnsprite_types::file::sprite::SpriteDocument;
	///
	/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
	/// let sprite = SpriteDocument::open_bn("hero.bnsa")?;
	/// sprite.save_bn("hero_copy.bnsa")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn save_bn(&self, path: impl AsRef<Path>) -> Result<(), SpriteError> {
		let encoder = bn::Encoder::new(self)?;
		let path = path.as_ref();
		debug!("Writing BN sprite to {}", path.display());
		let mut writer = BufWriter::new(fs::File::create(path)?);
		encoder.write(&mut writer)?;
		writer.flush()?;
		Ok(())
	}

	/// Serializes the sprite as BN into a byte vector.
	pub fn to_bn_bytes(&self) -> Result<Vec<u8>, SpriteError> {
		let mut buffer = Cursor::new(Vec::new());
		self.write_bn(&mut buffer)?;
		Ok(buffer.into_inner())
	}

	/// Serializes the sprite as BN into any seekable writer.
	pub fn write_bn<W: Write + Seek>(&self, writer: W) -> Result<(), SpriteError> {
		bn::Encoder::new(self)?.write(writer)
	}

	/// Writes the sprite as SF.
	///
	/// The document must already be SF compatible, see
	/// [`convert_bn_to_sf`](Self::convert_bn_to_sf). Validation runs before the
	/// file is created.
	pub fn save_sf(&self, path: impl AsRef<Path>) -> Result<(), SpriteError> {
		let encoder = sf::Encoder::new(self)?;
		let path = path.as_ref();
		debug!("Writing SF sprite to {}", path.display());
		let mut writer = BufWriter::new(fs::File::create(path)?);
		encoder.write(&mut writer)?;
		writer.flush()?;
		Ok(())
	}

	/// Serializes the sprite as SF into a byte vector.
	pub fn to_sf_bytes(&self) -> Result<Vec<u8>, SpriteError> {
		let mut buffer = Cursor::new(Vec::new());
		self.write_sf(&mut buffer)?;
		Ok(buffer.into_inner())
	}

	/// Serializes the sprite as SF into any seekable writer.
	pub fn write_sf<W: Write + Seek>(&self, writer: W) -> Result<(), SpriteError> {
		sf::Encoder::new(self)?.write(writer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn document() -> SpriteDocument {
		let mut frame = Frame::default();
		frame.tileset_id = 1;
		SpriteDocument::from_parts(
			vec![Animation {
				looping: true,
				frames: vec![Frame::default(), frame],
			}],
			vec![Tileset::from_bytes(vec![0; TILE_SIZE]).unwrap(), Tileset::from_bytes(vec![1; TILE_SIZE]).unwrap()],
			vec![PaletteGroup {
				palettes: vec![Palette {
					colors: vec![0; COLORS_16],
				}],
			}],
		)
		.unwrap()
	}

	#[test]
	fn test_getters() {
		let sprite = document();
		assert_eq!(sprite.animation_count(), 1);
		assert_eq!(sprite.frame_count(), 2);
		assert_eq!(sprite.frame(0, 1).unwrap().tileset_id, 1);
		assert!(matches!(
			sprite.frame(0, 2),
			Err(SpriteError::IndexOutOfRange {
				what: "frame",
				index: 2,
				len: 2
			})
		));
		assert!(sprite.animation(1).is_err());
		assert!(sprite.tileset(2).is_err());
		assert!(sprite.palette_group(0).is_ok());
	}

	#[test]
	fn test_from_parts_rejects_dangling_ids() {
		let mut frame = Frame::default();
		frame.palette_group_id = 3;
		let result = SpriteDocument::from_parts(
			vec![Animation {
				looping: false,
				frames: vec![frame],
			}],
			vec![Tileset::from_bytes(vec![0; TILE_SIZE]).unwrap()],
			vec![PaletteGroup::default()],
		);
		assert!(matches!(result, Err(SpriteError::InvalidData { .. })));
	}

	#[test]
	fn test_in_memory_round_trip_both_formats() {
		let sprite = document();
		let bn = SpriteDocument::from_bn_bytes(&sprite.to_bn_bytes().unwrap()).unwrap();
		assert_eq!(bn, sprite);

		let sf = SpriteDocument::from_sf_bytes(&sprite.to_sf_bytes().unwrap()).unwrap();
		assert_eq!(sf.animation_count(), 1);
		assert_eq!(sf.animations()[0].frames.len(), 2);
		assert_eq!(sf.tilesets(), sprite.tilesets());
	}

	#[test]
	fn test_serde_json_snapshot() {
		let sprite = document();
		let json = serde_json::to_string(&sprite).unwrap();
		let restored: SpriteDocument = serde_json::from_str(&json).unwrap();
		assert_eq!(restored, sprite);
	}
}
