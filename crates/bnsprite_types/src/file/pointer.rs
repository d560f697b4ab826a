//! Reading and validating tables of relative offsets.
//!
//! Every table is validated against its own bounds: a resolved address must lie
//! at or after the first byte following the table that was just read, and far
//! enough before the end of the file to hold the smallest possible record.

use std::io::{Read, Seek};

use super::cursor::ByteCursor;
use super::error::{FileType, Limit, PointerKind, SpriteError};

/// Size of one table entry in bytes.
pub const POINTER_SIZE: u64 = 4;

/// Resolves relative pointers for one file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerResolver {
	file_type: FileType,
}

impl PointerResolver {
	/// Creates a resolver that tags errors with `file_type`.
	pub const fn new(file_type: FileType) -> Self {
		Self {
			file_type,
		}
	}

	fn malformed(&self, kind: PointerKind, offset: u64) -> SpriteError {
		SpriteError::MalformedPointer {
			file_type: self.file_type,
			kind,
			offset,
		}
	}

	/// Reads `count` consecutive pointers starting at the cursor.
	///
	/// Each raw value is offset by `relative_to`. A resolved address is rejected
	/// when it points before the end of the table, or when fewer than `min_size`
	/// bytes remain after it.
	pub fn read_table<R: Read + Seek>(
		&self,
		cursor: &mut ByteCursor<R>,
		kind: PointerKind,
		count: usize,
		relative_to: u64,
		min_size: u64,
	) -> Result<Vec<u64>, SpriteError> {
		let table_end = cursor.tell()? + count as u64 * POINTER_SIZE;
		let file_size = cursor.file_size();

		let mut pointers = Vec::with_capacity(count);
		for _ in 0..count {
			let pointer = u64::from(cursor.read_u32()?) + relative_to;
			if pointer < table_end || pointer + min_size > file_size {
				return Err(self.malformed(kind, cursor.tell()? - POINTER_SIZE));
			}
			pointers.push(pointer);
		}

		Ok(pointers)
	}

	/// Reads a single pointer field that must point strictly after itself.
	pub fn read_field<R: Read + Seek>(
		&self,
		cursor: &mut ByteCursor<R>,
		kind: PointerKind,
		relative_to: u64,
	) -> Result<u64, SpriteError> {
		let field = cursor.tell()?;
		let pointer = u64::from(cursor.read_u32()?) + relative_to;
		if pointer <= field || pointer >= cursor.file_size() {
			return Err(self.malformed(kind, field));
		}
		Ok(pointer)
	}

	/// Infers the entry count of a densely packed table at `table`.
	///
	/// The first entry is the table's own byte length, so the count is that value
	/// divided by four. The cursor is left at `table`.
	pub fn read_table_count<R: Read + Seek>(
		&self,
		cursor: &mut ByteCursor<R>,
		kind: PointerKind,
		table: u64,
		limit: Limit,
	) -> Result<usize, SpriteError> {
		cursor.seek(table)?;
		let count = (cursor.read_u32()? / POINTER_SIZE as u32) as usize;
		if count == 0 {
			return Err(self.malformed(kind, table));
		}
		SpriteError::check_limit(limit, count)?;

		cursor.seek(table)?;
		Ok(count)
	}
}
