//! BN/SF sprite CLI utility
//!
//! Inspect, convert and edit sprite animation binaries.
//!
//! # Features
//!
//! - **info**: Print animations, tilesets and palette groups (optionally as JSON)
//! - **convert**: Convert between BN and SF, chosen by the output extension
//! - **verify**: Check that decoding and re-encoding reproduces the file byte for byte
//! - **export-tileset** / **import-tileset**: Raw 4bpp tile dumps
//! - **export-palette** / **import-palette**: Raw BGR555 palette dumps
//! - **merge**: Append the animations of one sprite to another
//!
//! # Usage
//!
//! ```bash
//! # Summary of a sprite
//! cargo run --example sprite_utils info hero.bnsa
//! cargo run --example sprite_utils info hero.bnsa --json
//!
//! # BN to SF (palette groups are merged automatically)
//! cargo run --example sprite_utils convert hero.bnsa hero.sfsa
//!
//! # Round-trip check, rejecting files without a metadata header
//! cargo run --example sprite_utils --strict verify hero.bnsa
//!
//! # Replace tileset 2
//! cargo run --example sprite_utils export-tileset hero.bnsa 2 tiles.bin
//! cargo run --example sprite_utils import-tileset hero.bnsa 2 tiles.bin -o patched.bnsa
//!
//! # Add palettes to group 0
//! cargo run --example sprite_utils import-palette hero.bnsa extra.pal --mode append --group 0
//! ```

use std::{
	fs,
	io::Cursor,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use bnsprite_rs::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "sprite_utils")]
#[command(author = "bnsprite-rs project")]
#[command(version)]
#[command(about = "BN/SF sprite utility - inspect, convert, verify and edit sprite files", long_about = None)]
struct Cli {
	/// Reject BN files without a metadata header instead of guessing
	#[arg(long, global = true)]
	strict: bool,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print a summary of a sprite file
	Info {
		/// Input sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Print the summary as JSON
		#[arg(long)]
		json: bool,
	},

	/// Convert a sprite to the format of the output extension
	Convert {
		/// Input sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Output sprite file (`.sfsa`, `.sfsprite` and `.bin` are written as SF)
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,
	},

	/// Verify that decoding and re-encoding reproduces the file exactly
	Verify {
		/// Input sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Write the re-encoded file next to the input for debugging
		#[arg(short, long)]
		save_intermediate: bool,
	},

	/// Write a tileset as a raw tile dump
	ExportTileset {
		/// Input sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Tileset ID
		#[arg(value_name = "ID")]
		id: usize,

		/// Output tile dump
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,
	},

	/// Replace a tileset with a raw tile dump
	ImportTileset {
		/// Input sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Tileset ID
		#[arg(value_name = "ID")]
		id: usize,

		/// Tile dump, a multiple of 32 bytes
		#[arg(value_name = "TILES")]
		tiles: PathBuf,

		/// Output sprite file (defaults to overwriting the input)
		#[arg(short, long, value_name = "OUTPUT")]
		output: Option<PathBuf>,
	},

	/// Write a palette group as a raw colour dump
	ExportPalette {
		/// Input sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Palette group ID
		#[arg(value_name = "ID")]
		id: usize,

		/// Output colour dump
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,
	},

	/// Import palettes from a raw colour dump
	ImportPalette {
		/// Input sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Colour dump
		#[arg(value_name = "PALETTE")]
		palette: PathBuf,

		/// What to do with the imported palettes
		#[arg(short, long, value_enum, default_value_t = ImportMode::New)]
		mode: ImportMode,

		/// Target group for `append` and `replace`
		#[arg(short, long, default_value_t = 0)]
		group: usize,

		/// Colours per palette (16 or 256)
		#[arg(short, long, default_value_t = COLORS_16)]
		colors: usize,

		/// Output sprite file (defaults to overwriting the input)
		#[arg(short, long, value_name = "OUTPUT")]
		output: Option<PathBuf>,
	},

	/// Append the animations and resources of another sprite
	Merge {
		/// Base sprite file
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Sprite whose animations are appended
		#[arg(value_name = "OTHER")]
		other: PathBuf,

		/// Output sprite file
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum ImportMode {
	/// Add the palettes to the end of a group
	Append,
	/// Replace every palette of a group
	Replace,
	/// Create a new group
	New,
}

/// Sprite summary for `info --json`
#[derive(Debug, Serialize)]
struct SpriteInfo {
	/// Detected format
	format: Format,
	/// Per-animation summary
	animations: Vec<AnimationInfo>,
	/// Tile count of every tileset
	tilesets: Vec<usize>,
	/// Palette count of every palette group
	palette_groups: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct AnimationInfo {
	frames: usize,
	looping: bool,
	/// Sum of frame delays in game frames
	duration: u32,
}

impl SpriteInfo {
	fn new(format: Format, sprite: &SpriteDocument) -> Self {
		Self {
			format,
			animations: sprite
				.animations()
				.iter()
				.map(|animation| AnimationInfo {
					frames: animation.frames.len(),
					looping: animation.looping,
					duration: animation.frames.iter().map(|frame| u32::from(frame.delay)).sum(),
				})
				.collect(),
			tilesets: sprite.tilesets().iter().map(Tileset::tile_count).collect(),
			palette_groups: sprite.palette_groups().iter().map(|group| group.palettes.len()).collect(),
		}
	}
}

fn main() -> Result<()> {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let config = if cli.strict {
		BnParseConfig::strict()
	} else {
		BnParseConfig::default()
	};

	match cli.command {
		Commands::Info {
			input,
			json,
		} => cmd_info(&input, &config, json),
		Commands::Convert {
			input,
			output,
		} => cmd_convert(&input, &output, &config),
		Commands::Verify {
			input,
			save_intermediate,
		} => cmd_verify(&input, &config, save_intermediate),
		Commands::ExportTileset {
			input,
			id,
			output,
		} => {
			let sprite = open_sprite(&input, &config)?;
			sprite.export_tileset(id, &output)?;
			info!("✓ Tileset {id} written to {}", output.display());
			Ok(())
		}
		Commands::ImportTileset {
			input,
			id,
			tiles,
			output,
		} => {
			let mut sprite = open_sprite(&input, &config)?;
			sprite
				.import_tileset(id, &tiles)
				.with_context(|| format!("Failed to import {}", tiles.display()))?;
			save_sprite(&mut sprite, output.as_deref().unwrap_or(&input))
		}
		Commands::ExportPalette {
			input,
			id,
			output,
		} => {
			let sprite = open_sprite(&input, &config)?;
			sprite.export_palette_group(id, &output)?;
			info!("✓ Palette group {id} written to {}", output.display());
			Ok(())
		}
		Commands::ImportPalette {
			input,
			palette,
			mode,
			group,
			colors,
			output,
		} => {
			let mut sprite = open_sprite(&input, &config)?;
			let mode = match mode {
				ImportMode::Append => PaletteImport::Append(group),
				ImportMode::Replace => PaletteImport::Replace(group),
				ImportMode::New => PaletteImport::NewGroup,
			};
			let id = sprite
				.import_palette_group(&palette, colors, mode)
				.with_context(|| format!("Failed to import {}", palette.display()))?;
			info!("Palette group {id} now holds {} palettes", sprite.palette_group(id)?.palettes.len());
			save_sprite(&mut sprite, output.as_deref().unwrap_or(&input))
		}
		Commands::Merge {
			input,
			other,
			output,
		} => {
			let mut sprite = open_sprite(&input, &config)?;
			let other = open_sprite(&other, &config)?;
			sprite.merge(&other)?;
			info!("Merged sprite holds {} animations", sprite.animation_count());
			save_sprite(&mut sprite, &output)
		}
	}
}

/// Opens a sprite by extension, unknown extensions as BN.
fn open_sprite(path: &Path, config: &BnParseConfig) -> Result<SpriteDocument> {
	let sprite = match Format::from_path(path) {
		Some(Format::Sf) => SpriteDocument::open_sf(path),
		_ => SpriteDocument::open_bn_with_config(path, config),
	};
	sprite.with_context(|| format!("Failed to open {}", path.display()))
}

/// Saves by extension, converting palette groups first when writing SF.
fn save_sprite(sprite: &mut SpriteDocument, path: &Path) -> Result<()> {
	if Format::from_path(path) == Some(Format::Sf) && sprite.convert_bn_to_sf()? {
		warn!("Palette groups were merged into one for SF output");
	}
	sprite.save(path).with_context(|| format!("Failed to write {}", path.display()))?;
	info!("✓ Saved {}", path.display());
	Ok(())
}

fn cmd_info(input: &Path, config: &BnParseConfig, json: bool) -> Result<()> {
	let sprite = open_sprite(input, config)?;
	let info = SpriteInfo::new(Format::from_path(input).unwrap_or(Format::Bn), &sprite);

	if json {
		println!("{}", serde_json::to_string_pretty(&info)?);
		return Ok(());
	}

	println!("File: {} ({})", input.display(), info.format);
	println!(
		"Animations: {} | Frames: {} | Tilesets: {} | Palette groups: {}",
		sprite.animation_count(),
		sprite.frame_count(),
		info.tilesets.len(),
		info.palette_groups.len()
	);
	for (index, animation) in info.animations.iter().enumerate() {
		println!(
			"  [{index:3}] {:3} frames, {:5} ticks{}",
			animation.frames,
			animation.duration,
			if animation.looping { ", loop" } else { "" }
		);
	}
	for (id, tiles) in info.tilesets.iter().enumerate() {
		println!("  Tileset {id}: {tiles} tiles");
	}
	for (id, palettes) in info.palette_groups.iter().enumerate() {
		println!("  Palette group {id}: {palettes} palettes");
	}
	Ok(())
}

fn cmd_convert(input: &Path, output: &Path, config: &BnParseConfig) -> Result<()> {
	let mut sprite = open_sprite(input, config)?;
	info!(
		"Loaded {} animations, {} tilesets, {} palette groups",
		sprite.animation_count(),
		sprite.tilesets().len(),
		sprite.palette_groups().len()
	);
	save_sprite(&mut sprite, output)
}

fn cmd_verify(input: &Path, config: &BnParseConfig, save_intermediate: bool) -> Result<()> {
	let format = Format::from_path(input).unwrap_or(Format::Bn);
	let original = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

	let sprite = match format {
		Format::Bn => SpriteDocument::from_bn_reader(Cursor::new(&original), config)?,
		Format::Sf => SpriteDocument::from_sf_bytes(&original)?,
	};
	let encoded = match format {
		Format::Bn => sprite.to_bn_bytes()?,
		Format::Sf => sprite.to_sf_bytes()?,
	};

	if save_intermediate {
		let mut path = input.as_os_str().to_owned();
		path.push(".roundtrip");
		fs::write(&path, &encoded)?;
		info!("Re-encoded file written to {}", PathBuf::from(path).display());
	}

	if encoded == original {
		info!("✓ {} round-trips byte for byte ({} bytes)", input.display(), original.len());
		return Ok(());
	}

	let mismatch = original
		.iter()
		.zip(&encoded)
		.position(|(a, b)| a != b)
		.unwrap_or_else(|| original.len().min(encoded.len()));
	let row = mismatch & !0x0F;
	let excerpt = |data: &[u8]| hex::encode(&data[row.min(data.len())..(row + 0x10).min(data.len())]);

	println!("Sizes: original {} bytes, re-encoded {} bytes", original.len(), encoded.len());
	println!("First difference at 0x{mismatch:08X}");
	println!("  original   0x{row:08X}: {}", excerpt(&original));
	println!("  re-encoded 0x{row:08X}: {}", excerpt(&encoded));
	bail!("{} does not round-trip", input.display());
}
