//! Parse configuration for BN sprite decoding.

/// Configuration for decoding BN sprites.
///
/// # Presets
///
/// - `default()`: guess the animation count when metadata is missing, no
///   practical cap on palettes per group
/// - `lenient()`: same as the default
/// - `strict()`: require the metadata header, at most 256 palettes per group
///
/// # Examples
///
/// ```
/// use bnsprite_types::file::bn::ParseConfig;
///
/// let config = ParseConfig::strict();
/// assert!(config.require_metadata);
///
/// let config = ParseConfig::new(false, 16);
/// assert_eq!(config.max_palettes_per_group, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
	/// Reject files without the `?? 00 01 NN` header instead of guessing the animation count
	pub require_metadata: bool,
	/// Stop scanning a palette group after this many palettes
	pub max_palettes_per_group: usize,
}

impl Default for ParseConfig {
	fn default() -> Self {
		Self {
			require_metadata: false,
			max_palettes_per_group: 0xFFFF,
		}
	}
}

impl ParseConfig {
	/// Create a new parse configuration.
	///
	/// # Arguments
	/// * `require_metadata` - Fail on files without the metadata header
	/// * `max_palettes_per_group` - Palette scan cap
	pub fn new(require_metadata: bool, max_palettes_per_group: usize) -> Self {
		Self {
			require_metadata,
			max_palettes_per_group,
		}
	}

	/// Create a lenient configuration that accepts raw memory dumps.
	pub fn lenient() -> Self {
		Self::default()
	}

	/// Create a strict configuration for files written by an encoder.
	/// - `require_metadata`: true
	/// - `max_palettes_per_group`: 256
	pub fn strict() -> Self {
		Self {
			require_metadata: true,
			max_palettes_per_group: 0x100,
		}
	}
}
