//! Source-address interning for shared tilesets and palette groups.
//!
//! Frames in a BN sprite point at their tileset and palette group. Frames that use
//! the exact same address share one resource ID; identical bytes at different
//! addresses stay separate resources so a decoded file re-encodes byte for byte.

/// Insertion-ordered address to ID map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AddressInterner {
	addresses: Vec<u64>,
}

impl AddressInterner {
	fn intern(&mut self, address: u64) -> usize {
		if let Some(id) = self.addresses.iter().position(|&known| known == address) {
			return id;
		}
		self.addresses.push(address);
		self.addresses.len() - 1
	}
}

/// Assigns dense resource IDs in first-encounter order during decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRegistry {
	tilesets: AddressInterner,
	palette_groups: AddressInterner,
}

impl ResourceRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the tileset ID for `address`, allocating the next one if unseen.
	pub fn intern_tileset(&mut self, address: u64) -> usize {
		self.tilesets.intern(address)
	}

	/// Returns the palette group ID for `address`, allocating the next one if unseen.
	pub fn intern_palette_group(&mut self, address: u64) -> usize {
		self.palette_groups.intern(address)
	}

	/// Tileset addresses indexed by ID.
	pub fn tileset_addresses(&self) -> &[u64] {
		&self.tilesets.addresses
	}

	/// Palette group addresses indexed by ID.
	pub fn palette_group_addresses(&self) -> &[u64] {
		&self.palette_groups.addresses
	}

	/// First palette group address strictly greater than `address`.
	pub fn next_palette_group_address(&self, address: u64) -> Option<u64> {
		self.palette_groups.addresses.iter().copied().filter(|&other| other > address).min()
	}
}
