//! Positioned little-endian reader/writer over any seekable stream.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Sequential cursor with absolute seeking.
///
/// Reads past the end of the underlying data fail with
/// [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct ByteCursor<T> {
	inner: T,
	file_size: u64,
}

impl<T: Seek> ByteCursor<T> {
	/// Wraps a stream, recording its current length and rewinding to the start.
	pub fn new(mut inner: T) -> io::Result<Self> {
		let file_size = inner.seek(SeekFrom::End(0))?;
		inner.seek(SeekFrom::Start(0))?;
		Ok(Self {
			inner,
			file_size,
		})
	}

	/// Length of the stream when the cursor was created.
	pub fn file_size(&self) -> u64 {
		self.file_size
	}

	/// Current absolute position.
	pub fn tell(&mut self) -> io::Result<u64> {
		self.inner.stream_position()
	}

	/// Moves to an absolute position.
	pub fn seek(&mut self, position: u64) -> io::Result<()> {
		self.inner.seek(SeekFrom::Start(position))?;
		Ok(())
	}

	/// Moves relative to the current position.
	pub fn skip(&mut self, count: i64) -> io::Result<()> {
		self.inner.seek(SeekFrom::Current(count))?;
		Ok(())
	}

	/// `true` while the position is before the recorded end of the stream.
	pub fn has_remaining(&mut self) -> io::Result<bool> {
		Ok(self.tell()? < self.file_size)
	}

	/// Returns the wrapped stream.
	pub fn into_inner(self) -> T {
		self.inner
	}
}

impl<T: Read + Seek> ByteCursor<T> {
	/// Reads one byte.
	pub fn read_u8(&mut self) -> io::Result<u8> {
		self.inner.read_u8()
	}

	/// Reads one signed byte.
	pub fn read_i8(&mut self) -> io::Result<i8> {
		self.inner.read_i8()
	}

	/// Reads a little-endian `u16`.
	pub fn read_u16(&mut self) -> io::Result<u16> {
		self.inner.read_u16::<LittleEndian>()
	}

	/// Reads a little-endian `u32`.
	pub fn read_u32(&mut self) -> io::Result<u32> {
		self.inner.read_u32::<LittleEndian>()
	}

	/// Reads exactly `count` bytes.
	pub fn read_bytes(&mut self, count: usize) -> io::Result<Vec<u8>> {
		let mut buffer = vec![0u8; count];
		self.inner.read_exact(&mut buffer)?;
		Ok(buffer)
	}
}

impl<T: Write + Seek> ByteCursor<T> {
	/// Writes one byte.
	pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
		self.inner.write_u8(value)
	}

	/// Writes one signed byte.
	pub fn write_i8(&mut self, value: i8) -> io::Result<()> {
		self.inner.write_i8(value)
	}

	/// Writes a little-endian `u16`.
	pub fn write_u16(&mut self, value: u16) -> io::Result<()> {
		self.inner.write_u16::<LittleEndian>(value)
	}

	/// Writes a little-endian `u32`.
	pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
		self.inner.write_u32::<LittleEndian>(value)
	}

	/// Writes a byte slice as-is.
	pub fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
		self.inner.write_all(data)
	}

	/// Writes zero bytes until the position is a multiple of `alignment`.
	///
	/// With `pad_extra` one zero byte is written first, so at least one byte
	/// of padding is always emitted.
	pub fn pad_to_alignment(&mut self, alignment: u64, pad_extra: bool) -> io::Result<()> {
		if pad_extra {
			self.write_u8(0)?;
		}
		while self.tell()? % alignment != 0 {
			self.write_u8(0)?;
		}
		Ok(())
	}

	/// Flushes the wrapped writer.
	pub fn flush(&mut self) -> io::Result<()> {
		self.inner.flush()
	}
}
