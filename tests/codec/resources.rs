//! Tileset and palette dumps, and merging files from disk.

use std::fs;

use anyhow::Result;
use bnsprite_rs::prelude::*;
use tempfile::TempDir;

use crate::sample_sprite;

#[test]
fn test_tileset_export_import() -> Result<()> {
	let dir = TempDir::new()?;
	let mut sprite = sample_sprite()?;
	let dump = dir.path().join("tiles.bin");

	sprite.export_tileset(0, &dump)?;
	assert_eq!(fs::read(&dump)?, sprite.tileset(0)?.data);

	fs::write(&dump, vec![0x11; 3 * TILE_SIZE])?;
	sprite.import_tileset(0, &dump)?;
	assert_eq!(sprite.tileset(0)?.tile_count(), 3);
	assert!(sprite.tileset_pixels(0)?.iter().all(|&pixel| pixel == 1));

	let path = dir.path().join("patched.bnsa");
	sprite.save(&path)?;
	assert_eq!(SpriteDocument::open(&path)?.tileset(0)?.data, vec![0x11; 3 * TILE_SIZE]);
	Ok(())
}

#[test]
fn test_partial_tile_dump_is_rejected() -> Result<()> {
	let dir = TempDir::new()?;
	let mut sprite = sample_sprite()?;
	let dump = dir.path().join("tiles.bin");
	fs::write(&dump, [0u8; TILE_SIZE + 1])?;

	let result = sprite.import_tileset(0, &dump);

	assert!(matches!(result, Err(SpriteError::InvalidResourceSize { size: 33, .. })));
	assert_eq!(sprite.tileset(0)?.tile_count(), 2);
	Ok(())
}

#[test]
fn test_palette_export_import_modes() -> Result<()> {
	let dir = TempDir::new()?;
	let mut sprite = sample_sprite()?;
	let dump = dir.path().join("group.pal");

	sprite.export_palette_group(0, &dump)?;
	assert_eq!(fs::read(&dump)?.len(), 2 * COLORS_16 * 2);

	assert_eq!(sprite.import_palette_group(&dump, COLORS_16, PaletteImport::Append(0))?, 0);
	assert_eq!(sprite.palette_group(0)?.palettes.len(), 4);

	assert_eq!(sprite.import_palette_group(&dump, COLORS_16, PaletteImport::NewGroup)?, 1);
	assert_eq!(sprite.palette_groups().len(), 2);

	let path = dir.path().join("palettes.bnsa");
	sprite.save(&path)?;
	let reopened = SpriteDocument::open(&path)?;
	assert_eq!(reopened.palette_group(0)?.palettes.len(), 4);
	Ok(())
}

#[test]
fn test_replace_palettes_clamps_indices() -> Result<()> {
	let dir = TempDir::new()?;
	let mut sprite = sample_sprite()?;
	let mut frame = sprite.frame(0, 0)?.clone();
	frame.objects[0].palette_index = 1;
	sprite.replace_frame(0, 0, frame)?;

	let dump = dir.path().join("single.pal");
	fs::write(&dump, [0u8; COLORS_16 * 2])?;
	sprite.import_palette_group(&dump, COLORS_16, PaletteImport::Replace(0))?;

	assert_eq!(sprite.palette_group(0)?.palettes.len(), 1);
	assert_eq!(sprite.frame(0, 0)?.objects[0].palette_index, 0);
	Ok(())
}

#[test]
fn test_merge_files() -> Result<()> {
	let dir = TempDir::new()?;
	let base = sample_sprite()?;
	let mut other = sample_sprite()?;
	other.import_tileset_bytes(0, vec![0xFF; TILE_SIZE])?;

	let base_path = dir.path().join("base.bnsa");
	let other_path = dir.path().join("other.sfsa");
	base.save(&base_path)?;
	other.save(&other_path)?;

	let mut merged = SpriteDocument::open(&base_path)?;
	merged.merge(&SpriteDocument::open(&other_path)?)?;

	assert_eq!(merged.animation_count(), 2);
	assert_eq!(merged.tilesets().len(), 2);
	assert_eq!(merged.palette_groups().len(), 2);
	let frame = merged.frame(1, 0)?;
	assert_eq!((frame.tileset_id, frame.palette_group_id), (1, 1));

	let path = dir.path().join("merged.bnsa");
	merged.save(&path)?;
	assert_eq!(SpriteDocument::open(&path)?, merged);
	Ok(())
}
