//! On-disk sprite layouts and their conventional file extensions.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::file::FileType;

/// Supported sprite container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
	/// BN sprite: nested pointer tables with per-frame resources
	Bn,
	/// SF sprite: five flat sections with deduplicated sprite templates
	Sf,
}

impl Format {
	/// Extensions used for BN sprites.
	pub const BN_EXTENSIONS: &'static [&'static str] = &["bnsa", "bnsprite", "dmp"];

	/// Extensions used for SF sprites.
	pub const SF_EXTENSIONS: &'static [&'static str] = &["sfsa", "sfsprite", "bin"];

	/// Extensions conventionally associated with this format, without the dot.
	pub const fn extensions(self) -> &'static [&'static str] {
		match self {
			Format::Bn => Self::BN_EXTENSIONS,
			Format::Sf => Self::SF_EXTENSIONS,
		}
	}

	/// Guesses the format from a path's extension (case-insensitive).
	///
	/// # Examples
	///
	/// ```
	/// use bnsprite_types::file::sprite::Format;
	///
	/// assert_eq!(Format::from_path("hero.BNSA"), Some(Format::Bn));
	/// assert_eq!(Format::from_path("dump/sprite.bin"), Some(Format::Sf));
	/// assert_eq!(Format::from_path("notes.txt"), None);
	/// ```
	pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
		let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
		[Format::Bn, Format::Sf]
			.into_iter()
			.find(|format| format.extensions().contains(&extension.as_str()))
	}

	/// Error tag for this format.
	pub const fn file_type(self) -> FileType {
		match self {
			Format::Bn => FileType::Bn,
			Format::Sf => FileType::Sf,
		}
	}
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Format::Bn => write!(f, "BN"),
			Format::Sf => write!(f, "SF"),
		}
	}
}
