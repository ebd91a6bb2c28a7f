use crate::gff::{Endianness, GffError, Result};

/// Bounded read cursor over an immutable byte slice.
#[derive(Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Create a cursor at an absolute position.
	pub fn at(bytes: &'a [u8], pos: usize) -> Result<Self> {
		let mut cursor = Self::new(bytes);
		cursor.seek(pos)?;
		Ok(cursor)
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return total length of the underlying slice.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether the underlying slice is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Move to an absolute position; the end of the slice is a valid target.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.bytes.len() {
			return Err(GffError::SeekOutOfRange { pos, len: self.bytes.len() });
		}
		self.pos = pos;
		Ok(())
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(GffError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		self.read_array()
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read one signed byte.
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(i8::from_ne_bytes(self.read_array()?))
	}

	/// Read a `u16` using the selected endianness.
	pub fn read_u16(&mut self, endianness: Endianness) -> Result<u16> {
		let buf = self.read_array()?;
		Ok(match endianness {
			Endianness::Little => u16::from_le_bytes(buf),
			Endianness::Big => u16::from_be_bytes(buf),
		})
	}

	/// Read an `i16` using the selected endianness.
	pub fn read_i16(&mut self, endianness: Endianness) -> Result<i16> {
		Ok(self.read_u16(endianness)? as i16)
	}

	/// Read a `u32` using the selected endianness.
	pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32> {
		let buf = self.read_array()?;
		Ok(match endianness {
			Endianness::Little => u32::from_le_bytes(buf),
			Endianness::Big => u32::from_be_bytes(buf),
		})
	}

	/// Read an `i32` using the selected endianness.
	pub fn read_i32(&mut self, endianness: Endianness) -> Result<i32> {
		Ok(self.read_u32(endianness)? as i32)
	}

	/// Read a `u64` using the selected endianness.
	pub fn read_u64(&mut self, endianness: Endianness) -> Result<u64> {
		let buf = self.read_array()?;
		Ok(match endianness {
			Endianness::Little => u64::from_le_bytes(buf),
			Endianness::Big => u64::from_be_bytes(buf),
		})
	}

	/// Read an `i64` using the selected endianness.
	pub fn read_i64(&mut self, endianness: Endianness) -> Result<i64> {
		Ok(self.read_u64(endianness)? as i64)
	}

	/// Read an IEEE-754 `f32` using the selected endianness.
	pub fn read_f32(&mut self, endianness: Endianness) -> Result<f32> {
		Ok(f32::from_bits(self.read_u32(endianness)?))
	}

	/// Read an IEEE-754 `f64` using the selected endianness.
	pub fn read_f64(&mut self, endianness: Endianness) -> Result<f64> {
		Ok(f64::from_bits(self.read_u64(endianness)?))
	}

	/// Read a zero-terminated byte string without the terminator.
	pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8]> {
		let start = self.pos;
		let rem = &self.bytes[self.pos..];
		let Some(rel_end) = rem.iter().position(|byte| *byte == 0) else {
			return Err(GffError::UnexpectedEof {
				at: self.pos,
				need: rem.len() + 1,
				rem: self.remaining(),
			});
		};

		let end = start + rel_end;
		self.pos = end + 1;
		Ok(&self.bytes[start..end])
	}

	/// Read `units` UTF-16 code units and decode them, stopping at the first NUL.
	pub fn read_utf16(&mut self, units: usize, endianness: Endianness) -> Result<String> {
		let need = units.checked_mul(2).ok_or(GffError::UnexpectedEof {
			at: self.pos,
			need: usize::MAX,
			rem: self.remaining(),
		})?;
		let raw = self.read_exact(need)?;
		let mut out = Vec::with_capacity(units);
		for pair in raw.chunks_exact(2) {
			let unit = match endianness {
				Endianness::Little => u16::from_le_bytes([pair[0], pair[1]]),
				Endianness::Big => u16::from_be_bytes([pair[0], pair[1]]),
			};
			if unit == 0 {
				break;
			}
			out.push(unit);
		}
		Ok(String::from_utf16_lossy(&out))
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut out = [0_u8; N];
		out.copy_from_slice(raw);
		Ok(out)
	}
}

/// Growable write buffer with an explicit write position.
///
/// Writes land at the current position and overwrite existing bytes. The buffer only grows
/// through writes that run past its end or through [`Writer::grow_to`]; seeking is restricted
/// to already allocated bytes so scattered writes never silently extend the output.
#[derive(Debug, Default)]
pub struct Writer {
	buf: Vec<u8>,
	pos: usize,
}

impl Writer {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return current buffer length.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// Whether nothing has been written yet.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Move to an absolute position inside the buffer.
	pub fn seek(&mut self, pos: usize) -> Result<()> {
		if pos > self.buf.len() {
			return Err(GffError::SeekOutOfRange { pos, len: self.buf.len() });
		}
		self.pos = pos;
		Ok(())
	}

	/// Zero-extend the buffer to at least `len` bytes.
	pub fn grow_to(&mut self, len: usize) {
		if len > self.buf.len() {
			self.buf.resize(len, 0);
		}
	}

	/// Write raw bytes at the current position.
	pub fn write_bytes(&mut self, bytes: &[u8]) {
		let end = self.pos + bytes.len();
		self.grow_to(end);
		self.buf[self.pos..end].copy_from_slice(bytes);
		self.pos = end;
	}

	/// Write one byte.
	pub fn write_u8(&mut self, value: u8) {
		self.write_bytes(&[value]);
	}

	/// Write one signed byte.
	pub fn write_i8(&mut self, value: i8) {
		self.write_bytes(&value.to_ne_bytes());
	}

	/// Write a `u16` using the selected endianness.
	pub fn write_u16(&mut self, value: u16, endianness: Endianness) {
		match endianness {
			Endianness::Little => self.write_bytes(&value.to_le_bytes()),
			Endianness::Big => self.write_bytes(&value.to_be_bytes()),
		}
	}

	/// Write an `i16` using the selected endianness.
	pub fn write_i16(&mut self, value: i16, endianness: Endianness) {
		self.write_u16(value as u16, endianness);
	}

	/// Write a `u32` using the selected endianness.
	pub fn write_u32(&mut self, value: u32, endianness: Endianness) {
		match endianness {
			Endianness::Little => self.write_bytes(&value.to_le_bytes()),
			Endianness::Big => self.write_bytes(&value.to_be_bytes()),
		}
	}

	/// Write an `i32` using the selected endianness.
	pub fn write_i32(&mut self, value: i32, endianness: Endianness) {
		self.write_u32(value as u32, endianness);
	}

	/// Write a `u64` using the selected endianness.
	pub fn write_u64(&mut self, value: u64, endianness: Endianness) {
		match endianness {
			Endianness::Little => self.write_bytes(&value.to_le_bytes()),
			Endianness::Big => self.write_bytes(&value.to_be_bytes()),
		}
	}

	/// Write an `i64` using the selected endianness.
	pub fn write_i64(&mut self, value: i64, endianness: Endianness) {
		self.write_u64(value as u64, endianness);
	}

	/// Write an IEEE-754 `f32` using the selected endianness.
	pub fn write_f32(&mut self, value: f32, endianness: Endianness) {
		self.write_u32(value.to_bits(), endianness);
	}

	/// Write an IEEE-754 `f64` using the selected endianness.
	pub fn write_f64(&mut self, value: f64, endianness: Endianness) {
		self.write_u64(value.to_bits(), endianness);
	}

	/// Write a string followed by a zero terminator.
	pub fn write_cstring(&mut self, value: &str) {
		self.write_bytes(value.as_bytes());
		self.write_u8(0);
	}

	/// Write UTF-16 code units (no terminator).
	pub fn write_utf16(&mut self, units: &[u16], endianness: Endianness) {
		for unit in units {
			self.write_u16(*unit, endianness);
		}
	}

	/// Borrow the bytes written so far.
	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	/// Consume the writer and return its buffer.
	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}
}
