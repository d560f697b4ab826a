//! File based tests for `bnsprite-rs`

use std::fs;

use anyhow::Result;
use bnsprite_rs::prelude::*;
use tempfile::TempDir;

mod resources;

/// One animation, one tileset of two tiles, one group of two 16 colour palettes.
fn sample_sprite() -> Result<SpriteDocument> {
	let mut sprite = SpriteDocument::new();
	sprite.push_tileset((0..2 * TILE_SIZE as u32).map(|i| i as u8).collect())?;
	let colors: Vec<u8> = (0..2 * COLORS_16 as u16).flat_map(|i| (i * 0x21).to_le_bytes()).collect();
	sprite.import_palette_group_bytes(&colors, COLORS_16, PaletteImport::NewGroup)?;
	sprite.new_animation()?;

	// SF has no sub animations and reads every frame back as one looping step
	let mut frame = sprite.frame(0, 0)?.clone();
	frame.sub_animations[0].looping = true;
	sprite.replace_frame(0, 0, frame)?;
	Ok(sprite)
}

#[test]
fn test_save_and_open_dispatch_on_extension() -> Result<()> {
	let dir = TempDir::new()?;
	let sprite = sample_sprite()?;

	let bn_path = dir.path().join("hero.bnsa");
	let sf_path = dir.path().join("hero.sfsa");
	sprite.save(&bn_path)?;
	sprite.save(&sf_path)?;

	assert_eq!(fs::read(&bn_path)?, sprite.to_bn_bytes()?);
	assert_eq!(fs::read(&sf_path)?, sprite.to_sf_bytes()?);
	assert_eq!(SpriteDocument::open(&bn_path)?, sprite);
	assert_eq!(SpriteDocument::open(&sf_path)?, sprite);
	Ok(())
}

#[test]
fn test_unknown_extension_is_bn() -> Result<()> {
	let dir = TempDir::new()?;
	let sprite = sample_sprite()?;
	let path = dir.path().join("hero.dat");

	sprite.save(&path)?;

	assert_eq!(fs::read(&path)?, sprite.to_bn_bytes()?);
	assert_eq!(SpriteDocument::open(&path)?, sprite);
	Ok(())
}

#[test]
fn test_failed_validation_creates_no_file() -> Result<()> {
	let dir = TempDir::new()?;
	let path = dir.path().join("empty.bnsa");

	let result = SpriteDocument::new().save(&path);

	assert!(matches!(result, Err(SpriteError::EmptyDocument)));
	assert!(!path.exists());
	Ok(())
}

#[test]
fn test_sf_save_requires_conversion() -> Result<()> {
	let dir = TempDir::new()?;
	let mut sprite = sample_sprite()?;
	sprite.import_palette_group_bytes(&[0; 0x20], COLORS_16, PaletteImport::NewGroup)?;
	sprite.duplicate_animation(0)?;
	let mut frame = sprite.frame(1, 0)?.clone();
	frame.palette_group_id = 1;
	sprite.replace_frame(1, 0, frame)?;

	let path = dir.path().join("hero.sfsa");
	assert!(matches!(sprite.save(&path), Err(SpriteError::InvalidData { .. })));
	assert!(!path.exists());

	assert!(sprite.convert_bn_to_sf()?);
	sprite.save(&path)?;

	let reopened = SpriteDocument::open(&path)?;
	assert_eq!(reopened.palette_groups().len(), 1);
	assert_eq!(reopened.palette_group(0)?.palettes.len(), 3);
	assert_eq!(reopened.frame(1, 0)?.objects[0].palette_index, 2);
	Ok(())
}

#[test]
fn test_bn_to_sf_to_bn_keeps_geometry() -> Result<()> {
	let dir = TempDir::new()?;
	let mut sprite = sample_sprite()?;
	let mut frame = sprite.frame(0, 0)?.clone();
	frame.objects[0].sub_objects[0].start_tile = 0x102;
	frame.objects[0].sub_objects[0].h_flip = true;
	frame.objects[0].sub_objects[0].size = ObjectSize::S16x8;
	frame.delay = 7;
	sprite.replace_frame(0, 0, frame.clone())?;

	let sf_path = dir.path().join("hero.sfsa");
	sprite.save(&sf_path)?;
	let converted = SpriteDocument::open(&sf_path)?;

	let back = converted.frame(0, 0)?;
	assert_eq!(back.delay, 7);
	assert_eq!(back.objects[0].sub_objects, frame.objects[0].sub_objects);
	assert_eq!(converted.tilesets(), sprite.tilesets());
	Ok(())
}

#[test]
fn test_open_missing_file_is_io_error() {
	let dir = TempDir::new().unwrap();
	let result = SpriteDocument::open(dir.path().join("missing.bnsa"));
	assert!(matches!(result, Err(SpriteError::Io(_))));
}

#[test]
fn test_strict_config_from_path() -> Result<()> {
	let dir = TempDir::new()?;
	let sprite = sample_sprite()?;
	let path = dir.path().join("headerless.bnsa");
	fs::write(&path, &sprite.to_bn_bytes()?[4..])?;

	assert_eq!(SpriteDocument::open_bn(&path)?, sprite);
	assert!(matches!(
		SpriteDocument::open_bn_with_config(&path, &BnParseConfig::strict()),
		Err(SpriteError::MalformedEnumeration { .. })
	));
	Ok(())
}
