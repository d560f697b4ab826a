//! Benchmark helper utilities for bnsprite-rs
//!
//! This module builds synthetic sprites shaped like real game assets, so the
//! benchmarks need no game files.

use bnsprite_types::file::sprite::{
	Animation, COLORS_16, Frame, Object, ObjectSize, Palette, PaletteGroup, SpriteDocument, SubAnimation,
	SubFrame, SubObject, TILE_SIZE, Tileset,
};

/// Builds a sprite with `animations` animations of `frames` frames each.
///
/// Every frame has `objects` objects of four OAM entries and a sub animation
/// stepping through them. Frames cycle over four tilesets and two palette
/// groups so the shared resource paths of both codecs are exercised. Start
/// tiles are even and below 256, so the result encodes as BN and as SF after
/// [`SpriteDocument::convert_bn_to_sf`].
pub fn generate_test_sprite(animations: usize, frames: usize, objects: usize) -> SpriteDocument {
	let tilesets = (0..4u8)
		.map(|seed| Tileset {
			data: (0..64 * TILE_SIZE).map(|i| (i as u8).wrapping_mul(seed + 1)).collect(),
		})
		.collect();
	let palette_groups = (0..2u16)
		.map(|seed| PaletteGroup {
			palettes: (0..4u16)
				.map(|p| Palette {
					colors: (0..COLORS_16 as u16).map(|c| (c * 0x21 + p + seed) & 0x7FFF).collect(),
				})
				.collect(),
		})
		.collect();

	let animations = (0..animations)
		.map(|a| Animation {
			looping: a % 2 == 0,
			frames: (0..frames).map(|f| generate_frame(a + f, objects)).collect(),
		})
		.collect();

	SpriteDocument::from_parts(animations, tilesets, palette_groups)
		.unwrap_or_else(|e| panic!("Synthetic sprite is invalid: {e}"))
}

fn generate_frame(seed: usize, objects: usize) -> Frame {
	let objects: Vec<Object> = (0..objects)
		.map(|o| Object {
			palette_index: (o % 4) as u8,
			sub_objects: (0..4)
				.map(|s| SubObject {
					start_tile: (((seed + o * 4 + s) * 2) % 256) as u16,
					pos_x: (s as i8) * 8 - 16,
					pos_y: (o as i8).wrapping_mul(8).wrapping_sub(32),
					h_flip: s % 2 == 1,
					v_flip: o % 3 == 2,
					size: ObjectSize::ALL[(seed + s) % ObjectSize::ALL.len()],
				})
				.collect(),
		})
		.collect();

	Frame {
		tileset_id: seed % 4,
		palette_group_id: seed % 2,
		sub_animations: vec![SubAnimation {
			looping: true,
			sub_frames: (0..objects.len())
				.map(|o| SubFrame {
					object_index: o as u8,
					delay: 2,
				})
				.collect(),
		}],
		objects,
		delay: (seed % 8 + 1) as u8,
		..Frame::default()
	}
}

/// Common benchmark sizes as `(animations, frames, objects)`
pub mod sizes {
	/// A pickup or effect sprite
	pub const SMALL: (usize, usize, usize) = (4, 4, 1);
	/// A typical enemy
	pub const MEDIUM: (usize, usize, usize) = (16, 8, 4);
	/// A boss or player character
	pub const LARGE: (usize, usize, usize) = (64, 12, 8);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generate_test_sprite() {
		let sprite = generate_test_sprite(3, 2, 2);

		assert_eq!(sprite.animation_count(), 3);
		assert_eq!(sprite.frame_count(), 6);
		assert_eq!(sprite.tilesets().len(), 4);
		assert_eq!(sprite.palette_groups().len(), 2);
		assert_eq!(sprite.frame(1, 1).unwrap().objects.len(), 2);
	}

	#[test]
	fn test_generated_sprite_encodes_as_both_formats() {
		let (animations, frames, objects) = sizes::MEDIUM;
		let mut sprite = generate_test_sprite(animations, frames, objects);

		let bn = sprite.to_bn_bytes().unwrap();
		assert_eq!(SpriteDocument::from_bn_bytes(&bn).unwrap(), sprite);

		assert!(sprite.convert_bn_to_sf().unwrap());
		assert!(sprite.to_sf_bytes().is_ok());
	}
}
