#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `bnsprite-rs` reads, edits and writes the BN and SF sprite animation binaries
//! of GBA-era fighting games.
//!
//! ```no_run
//! use bnsprite_rs::prelude::*;
//!
//! # fn main() -> Result<(), SpriteError> {
//! let sprite = SpriteDocument::open("hero.bnsa")?;
//! println!("{} animations", sprite.animation_count());
//! # Ok(())
//! # }
//! ```
//!
pub use bnsprite_internal::*;
