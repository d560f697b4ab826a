//! BN sprite encoder.
//!
//! Output order is fixed: metadata, animation table, frame rows, tilesets,
//! palette groups, sub animation groups, object groups. The animation table and
//! frame rows are reserved first and backpatched once every payload address is
//! known. Resources no frame references are skipped and get
//! [`UNUSED_POINTER`] in the address map.

use std::io::{Seek, Write};

use log::{debug, trace};

use crate::file::{
	FileType, Limit, SpriteError,
	cursor::ByteCursor,
	pointer::POINTER_SIZE,
	sprite::{COLORS_16, Frame, SpriteDocument},
};

use super::constants::*;

/// Validated BN serialization plan for one document.
///
/// Construction performs every check, so [`write`](Self::write) only fails on IO.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use bnsprite_types::file::{bn::Encoder, sprite::{PaletteImport, SpriteDocument, COLORS_16}};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sprite = SpriteDocument::new();
/// sprite.push_tileset(vec![0; 0x20])?;
/// sprite.import_palette_group_bytes(&[0; 0x20], COLORS_16, PaletteImport::NewGroup)?;
/// sprite.new_animation()?;
///
/// let mut output = Cursor::new(Vec::new());
/// Encoder::new(&sprite)?.write(&mut output)?;
/// assert_eq!(&output.get_ref()[1..4], &[0x00, 0x01, 0x01]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Encoder<'a> {
	document: &'a SpriteDocument,
	tileset_used: Vec<bool>,
	palette_group_used: Vec<bool>,
}

impl<'a> Encoder<'a> {
	/// Validates `document` for BN output.
	///
	/// # Errors
	///
	/// - [`SpriteError::EmptyDocument`] without animations
	/// - [`SpriteError::LimitExceeded`] for more than 255 animations, objects or
	///   sub animations per frame, start tiles above 255 or palette indices above 15
	/// - [`SpriteError::InvalidData`] for empty lists, zero delays, dangling
	///   resource IDs or palettes that are not 16 colours
	pub fn new(document: &'a SpriteDocument) -> Result<Self, SpriteError> {
		document.check_structure(FileType::Bn)?;

		let mut tileset_used = vec![false; document.tilesets().len()];
		let mut palette_group_used = vec![false; document.palette_groups().len()];
		for frame in document.animations().iter().flat_map(|animation| &animation.frames) {
			tileset_used[frame.tileset_id] = true;
			palette_group_used[frame.palette_group_id] = true;
			Self::check_frame(frame)?;
		}

		for (id, group) in document.palette_groups().iter().enumerate() {
			if !palette_group_used[id] {
				continue;
			}
			if group.palettes.is_empty() {
				return Err(SpriteError::invalid_data(FileType::Bn, format!("palette group {id} is empty")));
			}
			if group.palettes.iter().any(|palette| palette.colors.len() != COLORS_16) {
				return Err(SpriteError::invalid_data(
					FileType::Bn,
					format!("palette group {id} holds palettes that are not 16 colours"),
				));
			}
		}

		for (id, tileset) in document.tilesets().iter().enumerate() {
			if tileset_used[id] && u32::try_from(tileset.data.len()).is_err() {
				return Err(SpriteError::invalid_data(FileType::Bn, format!("tileset {id} is too large")));
			}
		}

		Ok(Self {
			document,
			tileset_used,
			palette_group_used,
		})
	}

	fn check_frame(frame: &Frame) -> Result<(), SpriteError> {
		for object in &frame.objects {
			SpriteError::check_limit(Limit::PaletteIndex, usize::from(object.palette_index))?;
			for sub_object in &object.sub_objects {
				SpriteError::check_limit(Limit::StartTile, usize::from(sub_object.start_tile))?;
			}
		}
		Ok(())
	}

	/// Writes the sprite to a seekable stream positioned at its start.
	pub fn write<W: Write + Seek>(&self, writer: W) -> Result<(), SpriteError> {
		let mut cursor = ByteCursor::new(writer)?;
		let animations = self.document.animations();
		let animation_count = animations.len() as u64;
		let frame_rows = METADATA_SIZE + POINTER_SIZE * animation_count;

		cursor.seek(1)?;
		cursor.write_bytes(&METADATA_MAGIC)?;
		cursor.write_u8(animations.len() as u8)?;

		// Animation table and frame rows are filled in last
		cursor.seek(frame_rows + FRAME_ROW_SIZE * self.document.frame_count() as u64)?;

		debug!("Writing tilesets");
		let (tileset_pointers, largest_tileset) = self.write_tilesets(&mut cursor)?;

		debug!("Writing palette groups");
		let palette_pointers = self.write_palette_groups(&mut cursor)?;

		debug!("Writing sub animations");
		let sub_animation_pointers = self.write_sub_animations(&mut cursor)?;

		debug!("Writing objects");
		let object_pointers = self.write_objects(&mut cursor)?;

		debug!("Writing frame data");
		cursor.seek(frame_rows)?;
		let mut animation_pointers = Vec::with_capacity(animations.len());
		let mut row = 0;
		for animation in animations {
			animation_pointers.push(relative(cursor.tell()?, METADATA_SIZE)?);
			for (index, frame) in animation.frames.iter().enumerate() {
				cursor.write_u32(tileset_pointers[frame.tileset_id])?;
				cursor.write_u32(palette_pointers[frame.palette_group_id])?;
				cursor.write_u32(sub_animation_pointers[row])?;
				cursor.write_u32(object_pointers[row])?;
				cursor.write_u16(u16::from(frame.delay))?;

				let mut flag = 0u16;
				if frame.special_flag_0 {
					flag |= u16::from(FLAG_SPECIAL_0);
				}
				if frame.special_flag_1 {
					flag |= u16::from(FLAG_SPECIAL_1);
				}
				if index == animation.frames.len() - 1 {
					flag |= u16::from(terminator(animation.looping));
				}
				cursor.write_u16(flag)?;
				row += 1;
			}
		}

		cursor.seek(METADATA_SIZE)?;
		for pointer in animation_pointers {
			cursor.write_u32(pointer)?;
		}

		cursor.seek(0)?;
		cursor.write_u8(largest_tileset)?;
		cursor.flush()?;
		Ok(())
	}

	/// Returns the pointer of every tileset and the clamped tile count of the largest.
	fn write_tilesets<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<(Vec<u32>, u8), SpriteError> {
		let tilesets = self.document.tilesets();
		let mut pointers = Vec::with_capacity(tilesets.len());
		let mut largest = 0u8;

		for (id, tileset) in tilesets.iter().enumerate() {
			if !self.tileset_used[id] {
				trace!("Tileset {id} is unused");
				pointers.push(UNUSED_POINTER);
				continue;
			}

			pointers.push(relative(cursor.tell()?, METADATA_SIZE)?);
			cursor.write_u32(tileset.data.len() as u32)?;
			cursor.write_bytes(&tileset.data)?;

			let tile_count = tileset.tile_count().min(usize::from(u8::MAX)) as u8;
			largest = largest.max(tile_count);
		}
		cursor.pad_to_alignment(4, false)?;

		Ok((pointers, largest))
	}

	fn write_palette_groups<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<Vec<u32>, SpriteError> {
		let groups = self.document.palette_groups();
		let mut pointers = Vec::with_capacity(groups.len());

		for (id, group) in groups.iter().enumerate() {
			if !self.palette_group_used[id] {
				trace!("Palette group {id} is unused");
				pointers.push(UNUSED_POINTER);
				continue;
			}

			pointers.push(relative(cursor.tell()?, METADATA_SIZE)?);
			cursor.write_u32(PALETTE_MARKER)?;
			for color in group.palettes.iter().flat_map(|palette| &palette.colors) {
				cursor.write_u16(*color)?;
			}
		}

		Ok(pointers)
	}

	/// Writes one sub animation group per frame, in frame order.
	fn write_sub_animations<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<Vec<u32>, SpriteError> {
		let mut pointers = Vec::with_capacity(self.document.frame_count());

		for frame in self.document.animations().iter().flat_map(|animation| &animation.frames) {
			let group = cursor.tell()?;
			pointers.push(relative(group, METADATA_SIZE)?);
			cursor.seek(group + POINTER_SIZE * frame.sub_animations.len() as u64)?;

			let mut entries = Vec::with_capacity(frame.sub_animations.len());
			for sub_animation in &frame.sub_animations {
				entries.push(relative(cursor.tell()?, group)?);
				let last = sub_animation.sub_frames.len() - 1;
				for (index, sub_frame) in sub_animation.sub_frames.iter().enumerate() {
					cursor.write_u8(sub_frame.object_index)?;
					cursor.write_u8(sub_frame.delay)?;
					cursor.write_u8(if index == last { terminator(sub_animation.looping) } else { 0 })?;
				}
				cursor.write_bytes(&SUB_ANIMATION_TRAILER)?;
			}

			backpatch(cursor, group, &entries)?;
			cursor.pad_to_alignment(4, false)?;
		}

		Ok(pointers)
	}

	/// Writes one object group per frame, in frame order.
	///
	/// Every group except those of the last animation is followed by at least one
	/// byte of padding, as existing BN files do.
	fn write_objects<W: Write + Seek>(&self, cursor: &mut ByteCursor<W>) -> Result<Vec<u32>, SpriteError> {
		let animations = self.document.animations();
		let mut pointers = Vec::with_capacity(self.document.frame_count());

		for (animation_index, animation) in animations.iter().enumerate() {
			let pad_extra = animation_index < animations.len() - 1;
			for frame in &animation.frames {
				let group = cursor.tell()?;
				pointers.push(relative(group, METADATA_SIZE)?);
				cursor.seek(group + POINTER_SIZE * frame.objects.len() as u64)?;

				let mut entries = Vec::with_capacity(frame.objects.len());
				for object in &frame.objects {
					entries.push(relative(cursor.tell()?, group)?);
					for sub_object in &object.sub_objects {
						let (size, shape) = sub_object.size.size_shape();
						let mut attribute_3 = size;
						if sub_object.v_flip {
							attribute_3 |= OAM_V_FLIP;
						}
						if sub_object.h_flip {
							attribute_3 |= OAM_H_FLIP;
						}

						cursor.write_u8(sub_object.start_tile as u8)?;
						cursor.write_i8(sub_object.pos_x)?;
						cursor.write_i8(sub_object.pos_y)?;
						cursor.write_u8(attribute_3)?;
						cursor.write_u8(shape | (object.palette_index << 4))?;
					}
					cursor.write_bytes(&OBJECT_TERMINATOR)?;
				}

				backpatch(cursor, group, &entries)?;
				cursor.pad_to_alignment(4, pad_extra)?;
			}
		}

		Ok(pointers)
	}
}

/// Flag byte closing a frame or sub frame list.
const fn terminator(looping: bool) -> u8 {
	if looping { FLAG_LOOP | FLAG_END } else { FLAG_END }
}

/// Converts an absolute position to a pointer relative to `base`.
fn relative(position: u64, base: u64) -> Result<u32, SpriteError> {
	u32::try_from(position - base)
		.map_err(|_| SpriteError::invalid_data(FileType::Bn, "sprite exceeds the 4 GiB pointer range"))
}

/// Fills a reserved table at `table` and returns to the current end.
fn backpatch<W: Write + Seek>(cursor: &mut ByteCursor<W>, table: u64, entries: &[u32]) -> Result<(), SpriteError> {
	let end = cursor.tell()?;
	cursor.seek(table)?;
	for entry in entries {
		cursor.write_u32(*entry)?;
	}
	cursor.seek(end)?;
	Ok(())
}
