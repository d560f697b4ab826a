//! SF sprite encoder.
//!
//! Frames are deduplicated into sprites by tileset and OAM geometry, so frames
//! that only differ in palette or delay share one sprite. Tilesets are packed
//! into a single tile block in order of first use.

use std::io::{Seek, Write};

use log::{debug, trace, warn};

use crate::file::{
	FileType, Limit, SpriteError,
	cursor::ByteCursor,
	pointer::POINTER_SIZE,
	sprite::{COLORS_16, COLORS_256, Frame, SpriteDocument},
};

use super::constants::*;

/// Tile range of a packed tileset.
#[derive(Debug, Clone, Copy)]
struct PackedTileset {
	id: usize,
	tile_number: u16,
	tile_count: u16,
}

/// A unique frame layout and the tiles it draws from.
#[derive(Debug, Clone, Copy)]
struct Sprite<'a> {
	frame: &'a Frame,
	tileset: PackedTileset,
}

/// Validated SF serialization plan for one document.
///
/// The document must use a single palette group and even start tiles; run
/// [`SpriteDocument::convert_bn_to_sf`] on BN sprites first.
///
/// # Examples
///
/// ```
/// use bnsprite_types::file::{sf::Encoder, sprite::{PaletteImport, SpriteDocument, COLORS_16}};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sprite = SpriteDocument::new();
/// sprite.push_tileset(vec![0; 0x20])?;
/// sprite.import_palette_group_bytes(&[0; 0x20], COLORS_16, PaletteImport::NewGroup)?;
/// sprite.new_animation()?;
/// sprite.new_animation()?;
///
/// let encoder = Encoder::new(&sprite)?;
/// assert_eq!(encoder.sprite_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Encoder<'a> {
	document: &'a SpriteDocument,
	sprites: Vec<Sprite<'a>>,
	sprite_indices: Vec<Vec<usize>>,
	tilesets: Vec<PackedTileset>,
	tileset_slots: Vec<Option<usize>>,
	largest_tileset: u16,
	total_tiles: u16,
	colors_per_palette: u16,
}

impl<'a> Encoder<'a> {
	/// Validates `document` for SF output and deduplicates its sprites.
	///
	/// # Errors
	///
	/// - [`SpriteError::EmptyDocument`] without animations
	/// - [`SpriteError::OddStartTile`] for start tiles SF cannot store
	/// - [`SpriteError::LimitExceeded`] for more than 255 animations or unique
	///   sprites, or more than 65535 tiles in total
	/// - [`SpriteError::InvalidData`] for frames using another palette group
	///   than 0 or a palette index past the end of group 0, frames without OAM
	///   entries and mixed palette sizes
	pub fn new(document: &'a SpriteDocument) -> Result<Self, SpriteError> {
		document.check_structure(FileType::Sf)?;

		let colors_per_palette = Self::check_palettes(document)?;
		let palette_count = document.palette_group(0)?.palettes.len();
		for (a, animation) in document.animations().iter().enumerate() {
			for (f, frame) in animation.frames.iter().enumerate() {
				Self::check_frame(frame, a, f, palette_count)?;
			}
		}

		let mut encoder = Self {
			document,
			sprites: Vec::new(),
			sprite_indices: Vec::with_capacity(document.animation_count()),
			tilesets: Vec::new(),
			tileset_slots: vec![None; document.tilesets().len()],
			largest_tileset: 0,
			total_tiles: 0,
			colors_per_palette,
		};

		for animation in document.animations() {
			let mut indices = Vec::with_capacity(animation.frames.len());
			for frame in &animation.frames {
				let tileset = encoder.pack_tileset(frame.tileset_id)?;
				indices.push(encoder.intern_sprite(frame, tileset));
			}
			encoder.sprite_indices.push(indices);
		}
		SpriteError::check_limit(Limit::Sprites, encoder.sprites.len())?;

		debug!(
			"{} frames share {} sprites and {} tiles",
			document.frame_count(),
			encoder.sprites.len(),
			encoder.total_tiles
		);
		Ok(encoder)
	}

	/// Number of unique sprites that will be written.
	pub fn sprite_count(&self) -> usize {
		self.sprites.len()
	}

	fn check_frame(
		frame: &Frame,
		animation: usize,
		frame_index: usize,
		palette_count: usize,
	) -> Result<(), SpriteError> {
		if frame.palette_group_id != 0 {
			return Err(SpriteError::invalid_data(
				FileType::Sf,
				format!(
					"animation {animation} frame {frame_index} uses palette group {}, convert the sprite first",
					frame.palette_group_id
				),
			));
		}

		let object = &frame.objects[0];
		if usize::from(object.palette_index) >= palette_count {
			return Err(SpriteError::invalid_data(
				FileType::Sf,
				format!(
					"animation {animation} frame {frame_index} uses palette {} of {palette_count}",
					object.palette_index
				),
			));
		}
		if frame.objects.len() > 1 {
			warn!(
				"Animation {animation} frame {frame_index}: SF keeps object 0 only, dropping {} objects",
				frame.objects.len() - 1
			);
		}
		if object.sub_objects.is_empty() {
			return Err(SpriteError::invalid_data(
				FileType::Sf,
				format!("animation {animation} frame {frame_index} has no OAM entries"),
			));
		}
		for (sub_object, entry) in object.sub_objects.iter().enumerate() {
			if entry.start_tile % 2 != 0 {
				return Err(SpriteError::OddStartTile {
					animation,
					frame: frame_index,
					object: 0,
					sub_object,
					tile: entry.start_tile,
				});
			}
		}
		Ok(())
	}

	/// Returns the uniform palette size of group 0.
	fn check_palettes(document: &SpriteDocument) -> Result<u16, SpriteError> {
		let group = document.palette_group(0)?;
		let Some(first) = group.palettes.first() else {
			return Err(SpriteError::invalid_data(FileType::Sf, "palette group 0 is empty"));
		};
		SpriteError::check_limit(Limit::Palettes, group.palettes.len())?;

		let colors = first.colors.len();
		if !matches!(colors, COLORS_16 | COLORS_256)
			|| group.palettes.iter().any(|palette| palette.colors.len() != colors)
		{
			return Err(SpriteError::invalid_data(
				FileType::Sf,
				"palettes must all hold either 16 or 256 colours",
			));
		}
		Ok(colors as u16)
	}

	fn pack_tileset(&mut self, id: usize) -> Result<PackedTileset, SpriteError> {
		if let Some(slot) = self.tileset_slots[id] {
			return Ok(self.tilesets[slot]);
		}

		let tile_count = self.document.tilesets()[id].tile_count();
		let total = usize::from(self.total_tiles) + tile_count;
		SpriteError::check_limit(Limit::TileCount, total)?;

		let packed = PackedTileset {
			id,
			tile_number: self.total_tiles,
			tile_count: tile_count as u16,
		};
		self.tileset_slots[id] = Some(self.tilesets.len());
		self.tilesets.push(packed);
		self.largest_tileset = self.largest_tileset.max(packed.tile_count);
		self.total_tiles = total as u16;
		Ok(packed)
	}

	fn intern_sprite(&mut self, frame: &'a Frame, tileset: PackedTileset) -> usize {
		match self.sprites.iter().position(|sprite| sprite.frame.same_sprite(frame)) {
			Some(index) => index,
			None => {
				self.sprites.push(Sprite {
					frame,
					tileset,
				});
				self.sprites.len() - 1
			}
		}
	}

	/// Writes the sprite to a seekable stream positioned at its start.
	pub fn write<W: Write + Seek>(&self, writer: W) -> Result<(), SpriteError> {
		let mut cursor = ByteCursor::new(writer)?;
		cursor.seek(HEADER_SIZE)?;

		debug!("Writing tilesets");
		let tileset_header = cursor.tell()?;
		self.write_tilesets(&mut cursor)?;

		debug!("Writing palettes");
		let palette_header = cursor.tell()?;
		self.write_palettes(&mut cursor)?;

		debug!("Writing animations");
		let animation_header = cursor.tell()?;
		self.write_animations(&mut cursor)?;

		debug!("Writing sprites");
		let sprite_header = cursor.tell()?;
		self.write_sprites(&mut cursor)?;

		cursor.seek(0)?;
		for offset in [tileset_header, palette_header, animation_header, sprite_header] {
			cursor.write_u32(to_u32(offset)?)?;
		}
		cursor.write_u32(TILE_SHIFT)?;
		cursor.flush()?;
		Ok(())
	}

	fn write_tilesets<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<(), SpriteError> {
		let header_size = TILESET_HEADER_SIZE + TILESET_ENTRY_SIZE * self.sprites.len() as u64;
		cursor.write_u16(self.largest_tileset)?;
		cursor.write_u16(self.total_tiles)?;
		cursor.write_u16(header_size as u16)?;
		cursor.pad_to_alignment(4, false)?;

		for sprite in &self.sprites {
			cursor.write_u16(sprite.tileset.tile_count)?;
			cursor.write_u16(sprite.tileset.tile_number)?;
		}

		for packed in &self.tilesets {
			trace!("Tileset {} at tile {}", packed.id, packed.tile_number);
			cursor.write_bytes(&self.document.tilesets()[packed.id].data)?;
		}
		cursor.pad_to_alignment(4, false)?;
		Ok(())
	}

	fn write_palettes<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<(), SpriteError> {
		cursor.write_u16(COLOR_DEPTH)?;
		cursor.write_u16(self.colors_per_palette)?;

		let group = self.document.palette_group(0)?;
		for color in group.palettes.iter().flat_map(|palette| &palette.colors) {
			cursor.write_u16(*color)?;
		}
		cursor.pad_to_alignment(4, false)?;
		Ok(())
	}

	fn write_animations<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<(), SpriteError> {
		let animations = self.document.animations();
		cursor.write_u16(animations.len() as u16)?;
		cursor.pad_to_alignment(4, false)?;

		let mut pointer = SECTION_HEADER_SIZE + POINTER_SIZE * animations.len() as u64;
		for animation in animations {
			cursor.write_u32(to_u32(pointer)?)?;
			pointer += ANIMATION_ENTRY_SIZE * animation.frames.len() as u64;
		}

		for (animation, indices) in animations.iter().zip(&self.sprite_indices) {
			let last = animation.frames.len() - 1;
			for (index, (frame, sprite)) in animation.frames.iter().zip(indices).enumerate() {
				cursor.write_u8(*sprite as u8)?;
				cursor.write_u8(frame.delay)?;
				cursor.write_u8(match (index == last, animation.looping) {
					(false, _) => 0,
					(true, true) => FLAG_LOOP,
					(true, false) => FLAG_END,
				})?;
				cursor.write_u8(frame.objects[0].palette_index)?;
			}
		}
		cursor.pad_to_alignment(4, false)?;
		Ok(())
	}

	fn write_sprites<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<(), SpriteError> {
		cursor.write_u16(self.sprites.len() as u16)?;
		cursor.pad_to_alignment(4, false)?;

		let mut pointer = SECTION_HEADER_SIZE + POINTER_SIZE * self.sprites.len() as u64;
		for sprite in &self.sprites {
			cursor.write_u32(to_u32(pointer)?)?;
			pointer += SPRITE_RECORD_SIZE * sprite.frame.objects[0].sub_objects.len() as u64;
		}

		for sprite in &self.sprites {
			let sub_objects = &sprite.frame.objects[0].sub_objects;
			for (index, sub_object) in sub_objects.iter().enumerate() {
				let (size, shape) = sub_object.size.size_shape();
				let mut flip = 0;
				if sub_object.h_flip {
					flip |= FLIP_H;
				}
				if sub_object.v_flip {
					flip |= FLIP_V;
				}

				cursor.write_u8((sub_object.start_tile >> 1) as u8)?;
				cursor.write_i8(sub_object.pos_x)?;
				cursor.write_i8(sub_object.pos_y)?;
				cursor.write_u8(size)?;
				cursor.write_u8(shape)?;
				cursor.write_u8(flip)?;
				cursor.write_u8(u8::from(index == sub_objects.len() - 1))?;
				cursor.write_u8((sub_object.start_tile >> 9) as u8)?;
			}
		}
		cursor.pad_to_alignment(4, false)?;
		Ok(())
	}
}

fn to_u32(value: u64) -> Result<u32, SpriteError> {
	u32::try_from(value).map_err(|_| SpriteError::invalid_data(FileType::Sf, "sprite exceeds the 4 GiB offset range"))
}
