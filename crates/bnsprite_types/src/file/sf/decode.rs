//! SF sprite decoder.
//!
//! Sections are read in dependency order: sprites first, then the tileset
//! entries that assign each sprite a tileset, then animations built from
//! copies of the sprites, and finally the palettes, whose count depends on the
//! highest palette index the animations use.

use std::io::{Read, Seek};

use log::{debug, trace};

use crate::file::{
	FileType, Limit, PointerKind, SpriteError,
	cursor::ByteCursor,
	pointer::{POINTER_SIZE, PointerResolver},
	sprite::{
		Animation, COLORS_16, COLORS_256, Frame, Object, ObjectSize, Palette, PaletteGroup,
		SpriteDocument, SubAnimation, SubFrame, SubObject, TILE_SIZE, Tileset,
	},
};

use super::constants::*;

/// Decodes an SF sprite from a seekable reader.
///
/// Sprites that no animation references are collected into one extra
/// animation at the end, so no layout in the file is lost.
///
/// # Errors
///
/// Returns the first validation failure with the byte offset of the offending
/// data, [`SpriteError::UnsupportedColorDepth`] for palettes that are not 5 bits
/// per channel, or an IO error if the data ends inside a fixed-size record.
pub fn decode<R: Read + Seek>(reader: R) -> Result<SpriteDocument, SpriteError> {
	Decoder::new(reader)?.decode()
}

/// Section offsets from the file header.
#[derive(Debug, Clone, Copy)]
struct Header {
	tilesets: u64,
	palettes: u64,
	animations: u64,
	sprites: u64,
	tile_shift: u32,
}

impl Header {
	/// End of the palette section: the nearest section after it, or the end of the file.
	fn palette_block_end(&self, file_size: u64) -> u64 {
		[self.tilesets, self.animations, self.sprites]
			.into_iter()
			.filter(|&offset| offset > self.palettes)
			.fold(file_size, u64::min)
	}
}

/// Tileset entry of one sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TilesetEntry {
	tile_count: u16,
	tile_number: u16,
}

struct Decoder<R> {
	cursor: ByteCursor<R>,
	resolver: PointerResolver,
}

impl<R: Read + Seek> Decoder<R> {
	fn new(reader: R) -> Result<Self, SpriteError> {
		Ok(Self {
			cursor: ByteCursor::new(reader)?,
			resolver: PointerResolver::new(FileType::Sf),
		})
	}

	fn decode(mut self) -> Result<SpriteDocument, SpriteError> {
		let header = self.read_header()?;

		debug!("Reading sprites");
		let mut sprites = self.read_sprites(&header)?;

		debug!("Reading tileset entries");
		let tilesets = self.read_tilesets(&header, &mut sprites)?;

		debug!("Reading animations");
		let (mut animations, used, palette_count) = self.read_animations(&header, &sprites)?;

		let unused: Vec<Frame> =
			sprites.iter().zip(&used).filter(|(_, used)| !**used).map(|(sprite, _)| sprite.clone()).collect();
		if !unused.is_empty() {
			debug!("Collecting {} unused sprites into animation {}", unused.len(), animations.len());
			animations.push(Animation {
				looping: false,
				frames: unused,
			});
		}
		SpriteError::check_limit(Limit::Animations, animations.len())?;

		debug!("Reading palettes");
		let palette_group = self.read_palettes(&header, palette_count)?;

		Ok(SpriteDocument::from_raw(animations, tilesets, vec![palette_group]))
	}

	fn read_header(&mut self) -> Result<Header, SpriteError> {
		self.cursor.seek(0)?;
		let mut offsets = [0u64; 4];
		for (index, offset) in offsets.iter_mut().enumerate() {
			*offset = u64::from(self.cursor.read_u32()?);
			if *offset >= self.cursor.file_size() {
				return Err(SpriteError::MalformedPointer {
					file_type: FileType::Sf,
					kind: PointerKind::Section,
					offset: index as u64 * POINTER_SIZE,
				});
			}
		}

		let shift_offset = self.cursor.tell()?;
		let tile_shift = self.cursor.read_u32()?;
		if tile_shift > 15 {
			return Err(SpriteError::MalformedEnumeration {
				file_type: FileType::Sf,
				field: "tile number shift",
				value: tile_shift,
				offset: shift_offset,
			});
		}

		let [tilesets, palettes, animations, sprites] = offsets;
		Ok(Header {
			tilesets,
			palettes,
			animations,
			sprites,
			tile_shift,
		})
	}

	/// Reads `u16` count and padding of a section with an offset table.
	fn read_section_count(&mut self, section: u64) -> Result<usize, SpriteError> {
		self.cursor.seek(section)?;
		let count = usize::from(self.cursor.read_u16()?);
		self.cursor.skip(2)?;
		Ok(count)
	}

	fn read_sprites(&mut self, header: &Header) -> Result<Vec<Frame>, SpriteError> {
		let count = self.read_section_count(header.sprites)?;
		let pointers =
			self.resolver
				.read_table(&mut self.cursor, PointerKind::Sprite, count, header.sprites, SPRITE_RECORD_SIZE)?;

		let mut sprites = Vec::with_capacity(count);
		for (index, pointer) in pointers.into_iter().enumerate() {
			self.cursor.seek(pointer)?;
			let sub_objects = self.read_sprite(header.tile_shift)?;
			trace!("Sprite {index}: {} OAM entries", sub_objects.len());

			sprites.push(Frame {
				sub_animations: vec![SubAnimation {
					looping: true,
					sub_frames: vec![SubFrame::default()],
				}],
				objects: vec![Object {
					palette_index: 0,
					sub_objects,
				}],
				..Frame::default()
			});
		}
		Ok(sprites)
	}

	/// Reads OAM records up to and including the one flagged as last.
	fn read_sprite(&mut self, tile_shift: u32) -> Result<Vec<SubObject>, SpriteError> {
		let mut sub_objects = Vec::new();
		loop {
			let record_offset = self.cursor.tell()?;
			if record_offset + SPRITE_RECORD_SIZE > self.cursor.file_size() {
				return Err(SpriteError::UnexpectedEof {
					file_type: FileType::Sf,
					section: "sprite data",
					offset: record_offset,
				});
			}

			let record = self.cursor.read_bytes(SPRITE_RECORD_SIZE as usize)?;
			let size = ObjectSize::from_size_shape(record[3], record[4]).ok_or(
				SpriteError::MalformedEnumeration {
					file_type: FileType::Sf,
					field: "OAM dimension",
					value: (u32::from(record[3]) << 4) | u32::from(record[4]),
					offset: record_offset + 3,
				},
			)?;

			let start_tile = ((u32::from(record[7]) << 8) | u32::from(record[0])) << tile_shift;
			let start_tile = u16::try_from(start_tile).map_err(|_| SpriteError::MalformedEnumeration {
				file_type: FileType::Sf,
				field: "start tile",
				value: start_tile,
				offset: record_offset,
			})?;

			sub_objects.push(SubObject {
				start_tile,
				pos_x: record[1] as i8,
				pos_y: record[2] as i8,
				h_flip: record[5] & FLIP_H != 0,
				v_flip: record[5] & FLIP_V != 0,
				size,
			});

			if record[6] != 0 {
				return Ok(sub_objects);
			}
		}
	}

	/// Assigns every sprite a tileset, sharing tilesets with identical tile ranges.
	fn read_tilesets(&mut self, header: &Header, sprites: &mut [Frame]) -> Result<Vec<Tileset>, SpriteError> {
		self.cursor.seek(header.tilesets)?;
		let largest = self.cursor.read_u16()?;
		let total = self.cursor.read_u16()?;
		let header_size = u64::from(self.cursor.read_u16()?);
		self.cursor.skip(2)?;
		trace!("Tileset header: largest {largest}, total {total}, header size 0x{header_size:X}");

		let mut entries: Vec<(TilesetEntry, u64)> = Vec::new();
		for sprite in sprites.iter_mut() {
			let entry_offset = self.cursor.tell()?;
			let entry = TilesetEntry {
				tile_count: self.cursor.read_u16()?,
				tile_number: self.cursor.read_u16()?,
			};

			sprite.tileset_id = match entries.iter().position(|(known, _)| *known == entry) {
				Some(id) => id,
				None => {
					entries.push((entry, entry_offset));
					entries.len() - 1
				}
			};
		}

		let data_start = header.tilesets + header_size;
		let mut tilesets = Vec::with_capacity(entries.len());
		for (entry, entry_offset) in entries {
			let address = data_start + u64::from(entry.tile_number) * TILE_SIZE as u64;
			let size = usize::from(entry.tile_count) * TILE_SIZE;
			if address + size as u64 > self.cursor.file_size() {
				return Err(SpriteError::MalformedTileset {
					file_type: FileType::Sf,
					offset: entry_offset,
				});
			}

			self.cursor.seek(address)?;
			tilesets.push(Tileset {
				data: self.cursor.read_bytes(size)?,
			});
		}
		Ok(tilesets)
	}

	/// Returns the animations, which sprites they use and the palette count they need.
	fn read_animations(
		&mut self,
		header: &Header,
		sprites: &[Frame],
	) -> Result<(Vec<Animation>, Vec<bool>, usize), SpriteError> {
		let count = self.read_section_count(header.animations)?;
		SpriteError::check_limit(Limit::Animations, count)?;
		let pointers = self.resolver.read_table(
			&mut self.cursor,
			PointerKind::Animation,
			count,
			header.animations,
			ANIMATION_ENTRY_SIZE,
		)?;

		let mut used = vec![false; sprites.len()];
		let mut palette_count = 0;
		let mut animations = Vec::with_capacity(count);
		for (index, pointer) in pointers.into_iter().enumerate() {
			self.cursor.seek(pointer)?;
			let mut animation = Animation {
				looping: false,
				frames: Vec::new(),
			};

			loop {
				let entry_offset = self.cursor.tell()?;
				if entry_offset + ANIMATION_ENTRY_SIZE > self.cursor.file_size() {
					return Err(SpriteError::UnexpectedEof {
						file_type: FileType::Sf,
						section: "animation data",
						offset: entry_offset,
					});
				}

				let sprite_index = usize::from(self.cursor.read_u8()?);
				let delay = self.cursor.read_u8()?;
				let flag = self.cursor.read_u8()?;
				let palette_index = self.cursor.read_u8()?;

				let sprite = sprites.get(sprite_index).ok_or(SpriteError::MalformedPointer {
					file_type: FileType::Sf,
					kind: PointerKind::Sprite,
					offset: entry_offset,
				})?;
				if delay == 0 {
					return Err(SpriteError::ZeroDelay {
						file_type: FileType::Sf,
						offset: entry_offset + 1,
					});
				}

				let mut frame = sprite.clone();
				frame.delay = delay;
				frame.objects[0].palette_index = palette_index;
				animation.frames.push(frame);
				used[sprite_index] = true;
				palette_count = palette_count.max(usize::from(palette_index) + 1);

				if flag & FLAG_TERMINATOR_MASK != 0 {
					animation.looping = flag & FLAG_LOOP != 0;
					break;
				}
			}

			trace!(
				"Animation {index}: {} frames{}",
				animation.frames.len(),
				if animation.looping { " (loop)" } else { "" }
			);
			animations.push(animation);
		}

		Ok((animations, used, palette_count))
	}

	/// Reads at least `palette_count` palettes, and keeps going until the next section.
	fn read_palettes(&mut self, header: &Header, palette_count: usize) -> Result<PaletteGroup, SpriteError> {
		self.cursor.seek(header.palettes)?;
		let color_depth = self.cursor.read_u16()?;
		if color_depth != COLOR_DEPTH {
			return Err(SpriteError::UnsupportedColorDepth(color_depth));
		}

		let size_offset = self.cursor.tell()?;
		let colors = usize::from(self.cursor.read_u16()?);
		if !matches!(colors, COLORS_16 | COLORS_256) {
			return Err(SpriteError::MalformedEnumeration {
				file_type: FileType::Sf,
				field: "palette size",
				value: colors as u32,
				offset: size_offset,
			});
		}

		let file_size = self.cursor.file_size();
		let block_end = header.palette_block_end(file_size);
		let palette_size = (colors * 2) as u64;

		let mut palettes = Vec::new();
		while palettes.len() < palette_count || self.cursor.tell()? < block_end {
			let offset = self.cursor.tell()?;
			if offset + palette_size > file_size {
				if palettes.len() < palette_count {
					return Err(SpriteError::UnexpectedEof {
						file_type: FileType::Sf,
						section: "palette data",
						offset,
					});
				}
				break;
			}

			let mut palette = Palette {
				colors: Vec::with_capacity(colors),
			};
			for _ in 0..colors {
				palette.colors.push(self.cursor.read_u16()?);
			}
			palettes.push(palette);
			SpriteError::check_limit(Limit::Palettes, palettes.len())?;
		}

		if palettes.is_empty() {
			return Err(SpriteError::MalformedPalette {
				file_type: FileType::Sf,
				offset: header.palettes,
			});
		}
		trace!("{} palettes of {colors} colours", palettes.len());

		Ok(PaletteGroup {
			palettes,
		})
	}
}
