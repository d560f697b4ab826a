//! Mutation API over a [`SpriteDocument`].
//!
//! Every operation is bounds checked and reports failures as
//! [`SpriteError::IndexOutOfRange`] instead of silently doing nothing.

use std::{fs, path::Path};

use log::{debug, trace};

use crate::file::{FileType, Limit, SpriteError};

use super::{Animation, Frame, PaletteGroup, SpriteDocument, Tileset};

/// Where imported palettes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteImport {
	/// Append to the palettes of an existing group
	Append(usize),
	/// Replace every palette of an existing group
	Replace(usize),
	/// Add a new group at the end
	NewGroup,
}

impl SpriteDocument {
	fn animation_mut(&mut self, index: usize) -> Result<&mut Animation, SpriteError> {
		let len = self.animations.len();
		self.animations.get_mut(index).ok_or_else(|| SpriteError::out_of_range("animation", index, len))
	}

	fn check_frame(&self, animation: usize, frame: usize) -> Result<(), SpriteError> {
		self.frame(animation, frame).map(|_| ())
	}

	fn check_replacement(&self, frame: &Frame) -> Result<(), SpriteError> {
		self.tileset(frame.tileset_id)?;
		self.palette_group(frame.palette_group_id)?;
		if frame.objects.is_empty() || frame.sub_animations.is_empty() {
			return Err(SpriteError::invalid_data(
				FileType::Bn,
				"a frame needs at least one object and one sub animation",
			));
		}
		Ok(())
	}

	fn push_animation(&mut self, animation: Animation) -> Result<usize, SpriteError> {
		SpriteError::check_limit(Limit::Animations, self.animations.len() + 1)?;
		self.animations.push(animation);
		Ok(self.animations.len() - 1)
	}

	/// Appends an animation holding one blank frame and returns its index.
	///
	/// The blank frame uses tileset 0 and palette group 0, with one sub animation
	/// showing object 0 and one object holding a single 8x8 OAM entry at (-4, -4).
	///
	/// # Errors
	///
	/// Returns [`SpriteError::LimitExceeded`] if the document already holds 255
	/// animations.
	pub fn new_animation(&mut self) -> Result<usize, SpriteError> {
		self.push_animation(Animation::default())
	}

	/// Appends a copy of animation `source` and returns the new index.
	pub fn duplicate_animation(&mut self, source: usize) -> Result<usize, SpriteError> {
		let copy = self.animation(source)?.clone();
		self.push_animation(copy)
	}

	/// Swaps two animations.
	pub fn swap_animations(&mut self, a: usize, b: usize) -> Result<(), SpriteError> {
		self.animation(a)?;
		self.animation(b)?;
		self.animations.swap(a, b);
		Ok(())
	}

	/// Removes and returns animation `index`.
	pub fn delete_animation(&mut self, index: usize) -> Result<Animation, SpriteError> {
		self.animation(index)?;
		Ok(self.animations.remove(index))
	}

	/// Sets whether animation `index` restarts after its last frame.
	pub fn set_animation_loop(&mut self, index: usize, looping: bool) -> Result<(), SpriteError> {
		self.animation_mut(index)?.looping = looping;
		Ok(())
	}

	/// Appends a blank frame to `animation` and returns its index.
	pub fn new_frame(&mut self, animation: usize) -> Result<usize, SpriteError> {
		let frames = &mut self.animation_mut(animation)?.frames;
		frames.push(Frame::default());
		Ok(frames.len() - 1)
	}

	/// Appends a copy of frame `source_frame` of `source_animation` to `animation`.
	///
	/// The source may be in a different animation.
	pub fn duplicate_frame(
		&mut self,
		animation: usize,
		source_animation: usize,
		source_frame: usize,
	) -> Result<usize, SpriteError> {
		self.animation(animation)?;
		let copy = self.frame(source_animation, source_frame)?.clone();
		let frames = &mut self.animation_mut(animation)?.frames;
		frames.push(copy);
		Ok(frames.len() - 1)
	}

	/// Swaps two frames within `animation`.
	pub fn swap_frames(&mut self, animation: usize, a: usize, b: usize) -> Result<(), SpriteError> {
		self.check_frame(animation, a)?;
		self.check_frame(animation, b)?;
		self.animation_mut(animation)?.frames.swap(a, b);
		Ok(())
	}

	/// Removes and returns a frame.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::EmptyAnimation`] when `frame` is the only frame left;
	/// delete the animation instead.
	pub fn delete_frame(&mut self, animation: usize, frame: usize) -> Result<Frame, SpriteError> {
		self.check_frame(animation, frame)?;
		let frames = &mut self.animation_mut(animation)?.frames;
		if frames.len() == 1 {
			return Err(SpriteError::EmptyAnimation {
				animation,
			});
		}
		Ok(frames.remove(frame))
	}

	/// Replaces a frame by value and returns the previous one.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::IndexOutOfRange`] if the position does not exist or
	/// the replacement names a missing tileset or palette group, and
	/// [`SpriteError::InvalidData`] if it has no objects or no sub animations.
	pub fn replace_frame(
		&mut self,
		animation: usize,
		frame: usize,
		replacement: Frame,
	) -> Result<Frame, SpriteError> {
		self.check_frame(animation, frame)?;
		self.check_replacement(&replacement)?;
		let slot = &mut self.animation_mut(animation)?.frames[frame];
		trace!("Replacing animation {animation} frame {frame}");
		Ok(std::mem::replace(slot, replacement))
	}

	/// Overwrites tileset `id` with raw 4bpp data.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::InvalidResourceSize`] if `data` is empty or not a
	/// multiple of 32 bytes. The tileset is unchanged on error.
	pub fn import_tileset_bytes(&mut self, id: usize, data: Vec<u8>) -> Result<(), SpriteError> {
		self.tileset(id)?;
		self.tilesets[id] = Tileset::from_bytes(data)?;
		Ok(())
	}

	/// Overwrites tileset `id` with the contents of a headerless tile dump.
	pub fn import_tileset(&mut self, id: usize, path: impl AsRef<Path>) -> Result<(), SpriteError> {
		self.tileset(id)?;
		let path = path.as_ref();
		debug!("Importing tileset {id} from {}", path.display());
		self.import_tileset_bytes(id, fs::read(path)?)
	}

	/// Writes tileset `id` as a headerless tile dump.
	pub fn export_tileset(&self, id: usize, path: impl AsRef<Path>) -> Result<(), SpriteError> {
		let tileset = self.tileset(id)?;
		fs::write(path, &tileset.data)?;
		Ok(())
	}

	/// Appends a new tileset and returns its ID.
	pub fn push_tileset(&mut self, data: Vec<u8>) -> Result<usize, SpriteError> {
		self.tilesets.push(Tileset::from_bytes(data)?);
		Ok(self.tilesets.len() - 1)
	}

	/// Pixel indices of tileset `id`, two per byte, low nibble first.
	pub fn tileset_pixels(&self, id: usize) -> Result<Vec<u8>, SpriteError> {
		Ok(self.tileset(id)?.pixels())
	}

	/// Imports palettes from a headerless colour dump.
	///
	/// Returns the ID of the group that received the palettes.
	///
	/// # Errors
	///
	/// Fails with [`SpriteError::InvalidResourceSize`] if the data is not a whole
	/// number of palettes, and with [`SpriteError::LimitExceeded`] if the target
	/// group would hold more than 256 palettes.
	pub fn import_palette_group_bytes(
		&mut self,
		data: &[u8],
		colors_per_palette: usize,
		mode: PaletteImport,
	) -> Result<usize, SpriteError> {
		let imported = PaletteGroup::from_bytes(data, colors_per_palette)?;
		match mode {
			PaletteImport::NewGroup => {
				self.palette_groups.push(imported);
				Ok(self.palette_groups.len() - 1)
			}
			PaletteImport::Append(id) => {
				let group = self.palette_group(id)?;
				SpriteError::check_limit(Limit::Palettes, group.palettes.len() + imported.palettes.len())?;
				self.palette_groups[id].palettes.extend(imported.palettes);
				Ok(id)
			}
			PaletteImport::Replace(id) => {
				self.palette_group(id)?;
				let max_index = imported.palettes.len() - 1;
				self.palette_groups[id] = imported;
				self.clamp_palette_indices(id, max_index);
				Ok(id)
			}
		}
	}

	/// Imports palettes from a file, see [`import_palette_group_bytes`](Self::import_palette_group_bytes).
	pub fn import_palette_group(
		&mut self,
		path: impl AsRef<Path>,
		colors_per_palette: usize,
		mode: PaletteImport,
	) -> Result<usize, SpriteError> {
		let path = path.as_ref();
		debug!("Importing palettes from {} ({mode:?})", path.display());
		let data = fs::read(path)?;
		self.import_palette_group_bytes(&data, colors_per_palette, mode)
	}

	/// Serializes palette group `id` as headerless little-endian colours.
	pub fn palette_group_bytes(&self, id: usize) -> Result<Vec<u8>, SpriteError> {
		Ok(self.palette_group(id)?.to_bytes())
	}

	/// Writes palette group `id` as a headerless colour dump.
	pub fn export_palette_group(&self, id: usize, path: impl AsRef<Path>) -> Result<(), SpriteError> {
		fs::write(path, self.palette_group_bytes(id)?)?;
		Ok(())
	}

	/// Replaces every palette group at once.
	///
	/// Frames keep their palette group IDs.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::InvalidData`] if a group is empty or a frame would
	/// be left pointing past the new groups. The groups are unchanged on error.
	pub fn replace_palette_groups(&mut self, groups: Vec<PaletteGroup>) -> Result<(), SpriteError> {
		if let Some(id) = groups.iter().position(|group| group.palettes.is_empty()) {
			return Err(SpriteError::invalid_data(FileType::Palette, format!("palette group {id} is empty")));
		}
		let orphan = self
			.animations
			.iter()
			.flat_map(|animation| &animation.frames)
			.map(|frame| frame.palette_group_id)
			.find(|&id| id >= groups.len());
		if let Some(id) = orphan {
			return Err(SpriteError::invalid_data(
				FileType::Palette,
				format!("frames still use palette group {id} but only {} groups were given", groups.len()),
			));
		}

		self.palette_groups = groups;
		Ok(())
	}

	/// Objects of frames using group `id` are limited to `max_index`.
	fn clamp_palette_indices(&mut self, id: usize, max_index: usize) {
		let max_index = u8::try_from(max_index).unwrap_or(u8::MAX);
		self.animations
			.iter_mut()
			.flat_map(|animation| animation.frames.iter_mut())
			.filter(|frame| frame.palette_group_id == id)
			.flat_map(|frame| frame.objects.iter_mut())
			.for_each(|object| object.palette_index = object.palette_index.min(max_index));
	}

	/// Appends another document's resources and animations.
	///
	/// Incoming frames have their tileset and palette group IDs shifted by the
	/// number of resources this document held before the merge.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::LimitExceeded`] if the result would hold more than
	/// 255 animations. `self` is unchanged on error.
	pub fn merge(&mut self, other: &SpriteDocument) -> Result<(), SpriteError> {
		SpriteError::check_limit(Limit::Animations, self.animations.len() + other.animations.len())?;

		let tileset_base = self.tilesets.len();
		let palette_base = self.palette_groups.len();
		debug!(
			"Merging {} animations (tileset IDs +{tileset_base}, palette group IDs +{palette_base})",
			other.animations.len()
		);

		self.tilesets.extend(other.tilesets.iter().cloned());
		self.palette_groups.extend(other.palette_groups.iter().cloned());
		self.animations.extend(other.animations.iter().cloned().map(|mut animation| {
			for frame in &mut animation.frames {
				frame.tileset_id += tileset_base;
				frame.palette_group_id += palette_base;
			}
			animation
		}));

		Ok(())
	}

	/// Removes all animations and resources.
	pub fn clear(&mut self) {
		self.animations.clear();
		self.tilesets.clear();
		self.palette_groups.clear();
	}

	/// Checks list lengths, delays and resource references.
	///
	/// Objects may be empty; BN stores them as a bare terminator.
	pub(crate) fn check_structure(&self, file_type: FileType) -> Result<(), SpriteError> {
		if self.animations.is_empty() {
			return Err(SpriteError::EmptyDocument);
		}
		SpriteError::check_limit(Limit::Animations, self.animations.len())?;

		for (a, animation) in self.animations.iter().enumerate() {
			if animation.frames.is_empty() {
				return Err(SpriteError::invalid_data(file_type, format!("animation {a} has no frames")));
			}
			for (f, frame) in animation.frames.iter().enumerate() {
				let at = || format!("animation {a} frame {f}");
				if frame.delay == 0 {
					return Err(SpriteError::invalid_data(file_type, format!("{} has delay 0", at())));
				}
				if frame.objects.is_empty() {
					return Err(SpriteError::invalid_data(file_type, format!("{} has no objects", at())));
				}
				if frame.sub_animations.is_empty() {
					return Err(SpriteError::invalid_data(file_type, format!("{} has no sub animations", at())));
				}
				SpriteError::check_limit(Limit::Objects, frame.objects.len())?;
				SpriteError::check_limit(Limit::SubAnimations, frame.sub_animations.len())?;

				for (s, sub_animation) in frame.sub_animations.iter().enumerate() {
					if sub_animation.sub_frames.is_empty() {
						return Err(SpriteError::invalid_data(
							file_type,
							format!("{} sub animation {s} has no frames", at()),
						));
					}
					if sub_animation.sub_frames.iter().any(|sub_frame| sub_frame.delay == 0) {
						return Err(SpriteError::invalid_data(
							file_type,
							format!("{} sub animation {s} has delay 0", at()),
						));
					}
				}
			}
		}

		self.check_references(file_type)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file::sprite::{COLORS_16, Palette, TILE_SIZE};

	fn sprite_with(animations: usize, tilesets: usize, groups: usize) -> SpriteDocument {
		let mut sprite = SpriteDocument::new();
		for i in 0..tilesets {
			sprite.push_tileset(vec![i as u8; TILE_SIZE]).unwrap();
		}
		for _ in 0..groups {
			sprite
				.import_palette_group_bytes(&[0u8; 0x20], COLORS_16, PaletteImport::NewGroup)
				.unwrap();
		}
		for i in 0..animations {
			let index = sprite.new_animation().unwrap();
			let mut frame = Frame::default();
			frame.tileset_id = i % tilesets;
			frame.palette_group_id = i % groups;
			sprite.replace_frame(index, 0, frame).unwrap();
		}
		sprite
	}

	#[test]
	fn test_new_animation_defaults() {
		let mut sprite = SpriteDocument::new();
		assert_eq!(sprite.new_animation().unwrap(), 0);

		let frame = sprite.frame(0, 0).unwrap();
		assert_eq!(frame.delay, 1);
		assert_eq!(frame.sub_animations.len(), 1);
		assert_eq!(frame.sub_animations[0].sub_frames[0].delay, 1);
		assert_eq!(frame.objects[0].sub_objects[0].pos_x, -4);
		assert_eq!(frame.objects[0].sub_objects[0].pos_y, -4);
	}

	#[test]
	fn test_animation_limit() {
		let mut sprite = SpriteDocument::new();
		for _ in 0..255 {
			sprite.new_animation().unwrap();
		}
		assert!(matches!(
			sprite.new_animation(),
			Err(SpriteError::LimitExceeded {
				limit: Limit::Animations,
				actual: 256
			})
		));
		assert!(sprite.duplicate_animation(0).is_err());
		assert_eq!(sprite.animation_count(), 255);
	}

	#[test]
	fn test_invalid_indices_are_reported() {
		let mut sprite = sprite_with(2, 1, 1);
		assert!(matches!(
			sprite.swap_animations(0, 2),
			Err(SpriteError::IndexOutOfRange {
				what: "animation",
				index: 2,
				len: 2
			})
		));
		assert!(sprite.delete_animation(5).is_err());
		assert!(sprite.set_animation_loop(9, true).is_err());
		assert!(sprite.new_frame(2).is_err());
		assert!(sprite.duplicate_frame(0, 1, 3).is_err());
		assert!(sprite.swap_frames(0, 0, 1).is_err());
		assert!(sprite.replace_frame(1, 1, Frame::default()).is_err());
		assert!(sprite.export_tileset(1, "unused.bin").is_err());
		assert!(sprite.tileset_pixels(4).is_err());
		assert_eq!(sprite.animation_count(), 2);
	}

	#[test]
	fn test_frame_editing() {
		let mut sprite = sprite_with(2, 2, 1);
		assert_eq!(sprite.duplicate_frame(0, 1, 0).unwrap(), 1);
		assert_eq!(sprite.frame(0, 1).unwrap().tileset_id, 1);

		sprite.swap_frames(0, 0, 1).unwrap();
		assert_eq!(sprite.frame(0, 0).unwrap().tileset_id, 1);

		let removed = sprite.delete_frame(0, 0).unwrap();
		assert_eq!(removed.tileset_id, 1);
		assert!(matches!(
			sprite.delete_frame(0, 0),
			Err(SpriteError::EmptyAnimation {
				animation: 0
			})
		));

		sprite.set_animation_loop(1, true).unwrap();
		assert!(sprite.animation(1).unwrap().looping);

		let deleted = sprite.delete_animation(0).unwrap();
		assert_eq!(deleted.frames.len(), 1);
		assert_eq!(sprite.animation_count(), 1);
	}

	#[test]
	fn test_tileset_import_validates_size() {
		let mut sprite = sprite_with(1, 1, 1);
		assert!(matches!(
			sprite.import_tileset_bytes(0, vec![0; 0x21]),
			Err(SpriteError::InvalidResourceSize {
				file_type: FileType::Tileset,
				size: 0x21
			})
		));
		assert!(sprite.import_tileset_bytes(0, Vec::new()).is_err());
		assert_eq!(sprite.tileset(0).unwrap().data.len(), TILE_SIZE);

		sprite.import_tileset_bytes(0, vec![0xAB; 0x40]).unwrap();
		assert_eq!(sprite.tileset(0).unwrap().tile_count(), 2);
		assert_eq!(&sprite.tileset_pixels(0).unwrap()[..2], &[0x0B, 0x0A]);
	}

	#[test]
	fn test_palette_import_modes() {
		let mut sprite = sprite_with(1, 1, 1);
		let two_palettes = [0u8; 0x40];

		assert_eq!(
			sprite.import_palette_group_bytes(&two_palettes, COLORS_16, PaletteImport::Append(0)).unwrap(),
			0
		);
		assert_eq!(sprite.palette_group(0).unwrap().palettes.len(), 3);

		assert_eq!(
			sprite.import_palette_group_bytes(&two_palettes, COLORS_16, PaletteImport::NewGroup).unwrap(),
			1
		);
		assert_eq!(sprite.palette_groups().len(), 2);

		let mut frame = sprite.frame(0, 0).unwrap().clone();
		frame.objects[0].palette_index = 2;
		sprite.replace_frame(0, 0, frame).unwrap();
		sprite.import_palette_group_bytes(&[0u8; 0x20], COLORS_16, PaletteImport::Replace(0)).unwrap();
		assert_eq!(sprite.palette_group(0).unwrap().palettes.len(), 1);
		assert_eq!(sprite.frame(0, 0).unwrap().objects[0].palette_index, 0);

		assert!(sprite.import_palette_group_bytes(&[0u8; 0x1F], COLORS_16, PaletteImport::NewGroup).is_err());
		assert!(
			sprite.import_palette_group_bytes(&two_palettes, COLORS_16, PaletteImport::Append(7)).is_err()
		);
	}

	#[test]
	fn test_palette_append_limit() {
		let mut sprite = sprite_with(1, 1, 1);
		let full = vec![0u8; 0x20 * 255];
		sprite.import_palette_group_bytes(&full, COLORS_16, PaletteImport::Append(0)).unwrap();
		assert_eq!(sprite.palette_group(0).unwrap().palettes.len(), 256);

		let err = sprite
			.import_palette_group_bytes(&[0u8; 0x20], COLORS_16, PaletteImport::Append(0))
			.unwrap_err();
		assert!(matches!(
			err,
			SpriteError::LimitExceeded {
				limit: Limit::Palettes,
				actual: 257
			}
		));
	}

	#[test]
	fn test_replace_palette_groups() {
		let mut sprite = sprite_with(1, 1, 2);
		let group = PaletteGroup {
			palettes: vec![Palette {
				colors: vec![0x7FFF; COLORS_16],
			}],
		};
		sprite.replace_palette_groups(vec![group.clone()]).unwrap();
		assert_eq!(sprite.palette_groups(), &[group]);
		assert_eq!(sprite.palette_group_bytes(0).unwrap()[..2], [0xFF, 0x7F]);
	}

	#[test]
	fn test_replace_palette_groups_keeps_frames_valid() {
		let mut sprite = sprite_with(2, 1, 2);
		let before = sprite.palette_groups().to_vec();

		let err = sprite.replace_palette_groups(Vec::new()).unwrap_err();
		assert!(matches!(err, SpriteError::InvalidData { .. }));
		assert!(sprite.replace_palette_groups(vec![before[0].clone()]).is_err());
		assert!(sprite.replace_palette_groups(vec![before[0].clone(), PaletteGroup::default()]).is_err());
		assert_eq!(sprite.palette_groups(), before.as_slice());
	}

	#[test]
	fn test_replace_frame_rejects_dangling_or_empty_frames() {
		let mut sprite = sprite_with(2, 1, 1);
		let before = sprite.clone();

		let dangling = Frame {
			tileset_id: 99,
			palette_group_id: 7,
			..Frame::default()
		};
		assert!(matches!(
			sprite.replace_frame(0, 0, dangling),
			Err(SpriteError::IndexOutOfRange {
				what: "tileset",
				index: 99,
				len: 1
			})
		));

		let no_group = Frame {
			palette_group_id: 1,
			..Frame::default()
		};
		assert!(matches!(
			sprite.replace_frame(0, 0, no_group),
			Err(SpriteError::IndexOutOfRange {
				what: "palette group",
				..
			})
		));

		let empty = Frame {
			objects: Vec::new(),
			sub_animations: Vec::new(),
			..Frame::default()
		};
		assert!(matches!(sprite.replace_frame(1, 0, empty), Err(SpriteError::InvalidData { .. })));
		assert_eq!(sprite, before);
	}

	#[test]
	fn test_merge_renumbers_resources() {
		let mut a = sprite_with(5, 4, 2);
		let b = sprite_with(3, 2, 1);

		a.merge(&b).unwrap();
		assert_eq!(a.animation_count(), 8);
		assert_eq!(a.tilesets().len(), 6);
		assert_eq!(a.palette_groups().len(), 3);

		for (index, animation) in b.animations().iter().enumerate() {
			let merged = a.animation(5 + index).unwrap();
			for (before, after) in animation.frames.iter().zip(&merged.frames) {
				assert_eq!(after.tileset_id, before.tileset_id + 4);
				assert_eq!(after.palette_group_id, before.palette_group_id + 2);
			}
		}
	}

	#[test]
	fn test_merge_limit_leaves_target_untouched() {
		let mut a = sprite_with(200, 1, 1);
		let b = sprite_with(56, 1, 1);
		assert!(matches!(a.merge(&b), Err(SpriteError::LimitExceeded { .. })));
		assert_eq!(a.animation_count(), 200);
		assert_eq!(a.tilesets().len(), 1);
	}

	#[test]
	fn test_check_structure() {
		let mut sprite = SpriteDocument::new();
		assert!(matches!(sprite.check_structure(FileType::Bn), Err(SpriteError::EmptyDocument)));

		sprite = sprite_with(1, 1, 1);
		assert!(sprite.check_structure(FileType::Bn).is_ok());

		let mut frame = sprite.frame(0, 0).unwrap().clone();
		frame.delay = 0;
		sprite.replace_frame(0, 0, frame).unwrap();
		assert!(matches!(sprite.check_structure(FileType::Bn), Err(SpriteError::InvalidData { .. })));

		sprite.clear();
		assert!(sprite.is_empty());
		assert!(sprite.tilesets().is_empty());
	}
}
