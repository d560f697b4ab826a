//! BN to SF normalization.

use log::{debug, info};

use crate::file::{FileType, Limit, SpriteError};

use super::{PaletteGroup, SpriteDocument};

impl SpriteDocument {
	/// Rewrites the document in place so it can be saved as SF.
	///
	/// SF stores a single palette group and halved start tiles. All palette groups
	/// are concatenated in ID order into group 0, and every object's palette index
	/// is shifted by the number of palettes that preceded its old group.
	///
	/// Returns `false` if the document was already compatible.
	///
	/// # Errors
	///
	/// Returns [`SpriteError::InvalidData`] if a frame names a missing tileset or
	/// palette group, [`SpriteError::OddStartTile`] if any OAM entry starts on an odd tile,
	/// and [`SpriteError::LimitExceeded`] if the merged group would exceed 256
	/// palettes. The document is unchanged on error.
	pub fn convert_bn_to_sf(&mut self) -> Result<bool, SpriteError> {
		self.check_references(FileType::Sf)?;
		self.check_even_start_tiles()?;

		let needs_merge = self.palette_groups.len() > 1
			|| self.animations.iter().flat_map(|a| &a.frames).any(|frame| frame.palette_group_id != 0);
		if !needs_merge {
			debug!("Sprite is already SF compatible");
			return Ok(false);
		}

		let mut bases = Vec::with_capacity(self.palette_groups.len());
		let mut total = 0usize;
		for group in &self.palette_groups {
			bases.push(total);
			total += group.palettes.len();
		}
		SpriteError::check_limit(Limit::Palettes, total)?;

		for frame in self.animations.iter().flat_map(|a| &a.frames) {
			let base = bases[frame.palette_group_id];
			for object in &frame.objects {
				let index = usize::from(object.palette_index) + base;
				if index > usize::from(u8::MAX) {
					return Err(SpriteError::LimitExceeded {
						limit: Limit::Palettes,
						actual: index + 1,
					});
				}
			}
		}

		for frame in self.animations.iter_mut().flat_map(|a| &mut a.frames) {
			let base = bases[frame.palette_group_id];
			for object in &mut frame.objects {
				// Range checked above
				object.palette_index = (usize::from(object.palette_index) + base) as u8;
			}
			frame.palette_group_id = 0;
		}

		let merged = PaletteGroup {
			palettes: self.palette_groups.drain(..).flat_map(|group| group.palettes).collect(),
		};
		self.palette_groups.push(merged);

		info!("Merged palette groups into one group of {total} palettes");
		Ok(true)
	}

	fn check_even_start_tiles(&self) -> Result<(), SpriteError> {
		for (animation, anim) in self.animations.iter().enumerate() {
			for (frame, frm) in anim.frames.iter().enumerate() {
				for (object, obj) in frm.objects.iter().enumerate() {
					if let Some((sub_object, oam)) =
						obj.sub_objects.iter().enumerate().find(|(_, oam)| oam.start_tile % 2 != 0)
					{
						return Err(SpriteError::OddStartTile {
							animation,
							frame,
							object,
							sub_object,
							tile: oam.start_tile,
						});
					}
				}
			}
		}
		Ok(())
	}
}
