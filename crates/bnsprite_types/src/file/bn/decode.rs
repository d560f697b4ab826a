//! BN sprite decoder.
//!
//! Decoding walks the pointer tree depth first. Tileset and palette group
//! pointers are only interned while frames are read; their payloads are
//! loaded afterwards, once every address is known, because the end of a palette
//! group is bounded by the next palette group address in the file.

use std::io::{Read, Seek};

use log::{debug, trace, warn};

use crate::file::{
	FileType, Limit, PointerKind, SpriteError,
	cursor::ByteCursor,
	pointer::PointerResolver,
	registry::ResourceRegistry,
	sprite::{
		Animation, COLORS_16, Frame, Object, ObjectSize, Palette, PaletteGroup, SpriteDocument,
		SubAnimation, SubFrame, SubObject, Tileset,
	},
};

use super::{ParseConfig, constants::*};

/// Decodes a BN sprite from a seekable reader.
///
/// # Errors
///
/// Returns the first validation failure with the byte offset of the offending
/// data, or an IO error if the data ends inside a fixed-size record.
pub fn decode<R: Read + Seek>(reader: R, config: &ParseConfig) -> Result<SpriteDocument, SpriteError> {
	Decoder::new(reader, config)?.decode()
}

struct Decoder<'a, R> {
	cursor: ByteCursor<R>,
	config: &'a ParseConfig,
	resolver: PointerResolver,
	registry: ResourceRegistry,
	metadata_offset: u64,
}

impl<'a, R: Read + Seek> Decoder<'a, R> {
	fn new(reader: R, config: &'a ParseConfig) -> Result<Self, SpriteError> {
		Ok(Self {
			cursor: ByteCursor::new(reader)?,
			config,
			resolver: PointerResolver::new(FileType::Bn),
			registry: ResourceRegistry::new(),
			metadata_offset: 0,
		})
	}

	fn decode(mut self) -> Result<SpriteDocument, SpriteError> {
		let count = self.read_animation_count()?;

		debug!("Reading {count} animation pointers");
		let pointers =
			self.resolver
				.read_table(&mut self.cursor, PointerKind::Animation, count, self.metadata_offset, 1)?;

		debug!("Reading frame data");
		let mut animations = Vec::with_capacity(count);
		for (index, pointer) in pointers.into_iter().enumerate() {
			let animation = self.read_animation(pointer)?;
			trace!(
				"Animation {index}: {} frames{}",
				animation.frames.len(),
				if animation.looping { " (loop)" } else { "" }
			);
			animations.push(animation);
		}

		debug!("Reading {} tilesets", self.registry.tileset_addresses().len());
		let tilesets = self.read_tilesets()?;

		debug!("Reading {} palette groups", self.registry.palette_group_addresses().len());
		let palette_groups = self.read_palette_groups()?;

		Ok(SpriteDocument::from_raw(animations, tilesets, palette_groups))
	}

	/// Detects the metadata header and returns the animation count.
	fn read_animation_count(&mut self) -> Result<usize, SpriteError> {
		self.cursor.seek(1)?;
		let magic = [self.cursor.read_u8()?, self.cursor.read_u8()?];
		if magic == METADATA_MAGIC {
			self.metadata_offset = METADATA_SIZE;
			return Ok(usize::from(self.cursor.read_u8()?));
		}

		if self.config.require_metadata {
			return Err(SpriteError::MalformedEnumeration {
				file_type: FileType::Bn,
				field: "metadata header",
				value: u32::from(u16::from_be_bytes(magic)),
				offset: 1,
			});
		}

		warn!("Missing metadata, guessing the number of animations from the first pointer");
		self.cursor.seek(0)?;
		let count = (self.cursor.read_u32()? / 4) as usize;
		SpriteError::check_limit(Limit::Animations, count)?;
		self.cursor.seek(0)?;
		Ok(count)
	}

	fn read_animation(&mut self, address: u64) -> Result<Animation, SpriteError> {
		self.cursor.seek(address)?;
		let mut animation = Animation {
			looping: false,
			frames: Vec::new(),
		};

		loop {
			if !self.cursor.has_remaining()? {
				return Err(self.unexpected_eof("frame data")?);
			}

			let (frame, flag) = self.read_frame()?;
			animation.frames.push(frame);
			animation.looping = flag & FLAG_LOOP != 0;
			if flag & FLAG_TERMINATOR_MASK != 0 {
				return Ok(animation);
			}
		}
	}

	/// Reads one frame row, returning the frame and its raw flag byte.
	fn read_frame(&mut self) -> Result<(Frame, u8), SpriteError> {
		let relative_to = self.metadata_offset;

		let tileset = self.resolver.read_field(&mut self.cursor, PointerKind::Tileset, relative_to)?;
		let tileset_id = self.registry.intern_tileset(tileset);

		let palette_group =
			self.resolver
				.read_field(&mut self.cursor, PointerKind::PaletteGroup, relative_to)?;
		let palette_group_id = self.registry.intern_palette_group(palette_group);

		let group = self
			.resolver
			.read_field(&mut self.cursor, PointerKind::SubAnimationGroup, relative_to)?;
		let resume = self.cursor.tell()?;
		let sub_animations = self.read_sub_animation_group(group)?;
		self.cursor.seek(resume)?;

		let group = self.resolver.read_field(&mut self.cursor, PointerKind::ObjectGroup, relative_to)?;
		let resume = self.cursor.tell()?;
		let objects = self.read_object_group(group)?;
		self.cursor.seek(resume)?;

		let delay = self.read_delay()?;
		self.cursor.skip(1)?;

		let flag_offset = self.cursor.tell()?;
		let flag = self.cursor.read_u8()?;
		if flag & !FRAME_FLAG_MASK != 0 {
			return Err(SpriteError::MalformedEnumeration {
				file_type: FileType::Bn,
				field: "end of frame flag",
				value: u32::from(flag),
				offset: flag_offset,
			});
		}
		self.cursor.skip(1)?;

		trace!("Frame: tileset {tileset_id}, palette group {palette_group_id}, delay {delay}, flag 0x{flag:02X}");

		let frame = Frame {
			special_flag_0: flag & FLAG_SPECIAL_0 != 0,
			special_flag_1: flag & FLAG_SPECIAL_1 != 0,
			tileset_id,
			palette_group_id,
			sub_animations,
			objects,
			delay,
		};
		Ok((frame, flag))
	}

	fn read_sub_animation_group(&mut self, group: u64) -> Result<Vec<SubAnimation>, SpriteError> {
		let count = self.resolver.read_table_count(
			&mut self.cursor,
			PointerKind::SubAnimationGroup,
			group,
			Limit::SubAnimations,
		)?;
		let pointers = self.resolver.read_table(
			&mut self.cursor,
			PointerKind::SubAnimation,
			count,
			group,
			MIN_SUB_ANIMATION_SIZE,
		)?;

		let mut sub_animations = Vec::with_capacity(count);
		for pointer in pointers {
			self.cursor.seek(pointer)?;
			sub_animations.push(self.read_sub_animation()?);
		}
		Ok(sub_animations)
	}

	fn read_sub_animation(&mut self) -> Result<SubAnimation, SpriteError> {
		let mut sub_animation = SubAnimation::default();
		loop {
			if !self.cursor.has_remaining()? {
				return Err(self.unexpected_eof("sub animation data")?);
			}

			let object_index = self.cursor.read_u8()?;
			let delay = self.read_delay()?;

			let flag_offset = self.cursor.tell()?;
			let flag = self.cursor.read_u8()?;
			if flag & !FLAG_TERMINATOR_MASK != 0 {
				return Err(SpriteError::MalformedEnumeration {
					file_type: FileType::Bn,
					field: "end of sub animation flag",
					value: u32::from(flag),
					offset: flag_offset,
				});
			}

			sub_animation.sub_frames.push(SubFrame {
				object_index,
				delay,
			});
			sub_animation.looping = flag & FLAG_LOOP != 0;
			if flag & FLAG_TERMINATOR_MASK != 0 {
				return Ok(sub_animation);
			}
		}
	}

	fn read_object_group(&mut self, group: u64) -> Result<Vec<Object>, SpriteError> {
		let count =
			self.resolver
				.read_table_count(&mut self.cursor, PointerKind::ObjectGroup, group, Limit::Objects)?;
		let pointers =
			self.resolver
				.read_table(&mut self.cursor, PointerKind::Object, count, group, MIN_OBJECT_SIZE)?;

		let mut objects = Vec::with_capacity(count);
		for pointer in pointers {
			self.cursor.seek(pointer)?;
			objects.push(self.read_object()?);
		}
		Ok(objects)
	}

	fn read_object(&mut self) -> Result<Object, SpriteError> {
		let mut object = Object::default();
		loop {
			if !self.cursor.has_remaining()? {
				return Err(self.unexpected_eof("object data")?);
			}

			let record = self.cursor.read_bytes(OBJECT_RECORD_SIZE)?;
			if record == OBJECT_TERMINATOR {
				return Ok(object);
			}
			let end = self.cursor.tell()?;

			let size_bits = record[3] & 0x03;
			let shape_bits = record[4] & 0x03;
			let size = ObjectSize::from_size_shape(size_bits, shape_bits).ok_or(
				SpriteError::MalformedEnumeration {
					file_type: FileType::Bn,
					field: "OAM dimension",
					value: u32::from((size_bits << 4) | shape_bits),
					offset: end - 5,
				},
			)?;
			if record[3] & OAM_RESERVED_3 != 0 {
				return Err(SpriteError::MalformedEnumeration {
					file_type: FileType::Bn,
					field: "OAM flag byte 3",
					value: u32::from(record[3]),
					offset: end - 2,
				});
			}
			if record[4] & OAM_RESERVED_4 != 0 {
				return Err(SpriteError::MalformedEnumeration {
					file_type: FileType::Bn,
					field: "OAM flag byte 4",
					value: u32::from(record[4]),
					offset: end - 1,
				});
			}

			// The format stores one palette per OAM entry, the model one per object
			object.palette_index = record[4] >> 4;
			object.sub_objects.push(SubObject {
				start_tile: u16::from(record[0]),
				pos_x: record[1] as i8,
				pos_y: record[2] as i8,
				h_flip: record[3] & OAM_H_FLIP != 0,
				v_flip: record[3] & OAM_V_FLIP != 0,
				size,
			});
		}
	}

	/// Reads a delay byte, rejecting zero.
	fn read_delay(&mut self) -> Result<u8, SpriteError> {
		let offset = self.cursor.tell()?;
		let delay = self.cursor.read_u8()?;
		if delay == 0 {
			return Err(SpriteError::ZeroDelay {
				file_type: FileType::Bn,
				offset,
			});
		}
		Ok(delay)
	}

	fn read_tilesets(&mut self) -> Result<Vec<Tileset>, SpriteError> {
		let addresses = self.registry.tileset_addresses().to_vec();
		let mut tilesets = Vec::with_capacity(addresses.len());
		for address in addresses {
			self.cursor.seek(address)?;
			let size = u64::from(self.cursor.read_u32()?);
			if self.cursor.tell()? + size > self.cursor.file_size() {
				return Err(SpriteError::MalformedTileset {
					file_type: FileType::Bn,
					offset: address,
				});
			}
			tilesets.push(Tileset {
				data: self.cursor.read_bytes(size as usize)?,
			});
		}
		Ok(tilesets)
	}

	fn read_palette_groups(&mut self) -> Result<Vec<PaletteGroup>, SpriteError> {
		let addresses = self.registry.palette_group_addresses().to_vec();
		let file_size = self.cursor.file_size();
		let palette_size = (COLORS_16 * 2) as u64;

		let mut groups = Vec::with_capacity(addresses.len());
		for address in addresses {
			let bound = self.registry.next_palette_group_address(address).unwrap_or(file_size).min(file_size);

			// Skip the 0x20 marker word
			self.cursor.seek(address + 4)?;
			let mut palettes = Vec::new();
			while palettes.len() < self.config.max_palettes_per_group && self.cursor.tell()? < bound {
				if self.cursor.tell()? + palette_size > file_size {
					break;
				}
				match self.read_palette()? {
					Some(palette) => palettes.push(palette),
					None => break,
				}
			}

			if palettes.is_empty() {
				return Err(SpriteError::MalformedPalette {
					file_type: FileType::Bn,
					offset: self.cursor.tell()?.saturating_sub(2),
				});
			}
			trace!("Palette group at 0x{address:08X}: {} palettes", palettes.len());
			groups.push(PaletteGroup {
				palettes,
			});
		}
		Ok(groups)
	}

	/// Reads 16 colours, or `None` once a colour with the invalid bit shows up.
	fn read_palette(&mut self) -> Result<Option<Palette>, SpriteError> {
		let mut colors = Vec::with_capacity(COLORS_16);
		for _ in 0..COLORS_16 {
			let color = self.cursor.read_u16()?;
			if color & INVALID_COLOR_BIT != 0 {
				return Ok(None);
			}
			colors.push(color);
		}
		Ok(Some(Palette {
			colors,
		}))
	}

	fn unexpected_eof(&mut self, section: &'static str) -> Result<SpriteError, SpriteError> {
		Ok(SpriteError::UnexpectedEof {
			file_type: FileType::Bn,
			section,
			offset: self.cursor.tell()?,
		})
	}
}
