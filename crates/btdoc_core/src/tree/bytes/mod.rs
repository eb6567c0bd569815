use crate::tree::{DecodeError, Result};

/// Byte order applied to the integer-family field payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
	/// Little-endian.
	Little,
	/// Big-endian, as written by the legacy serializer.
	Big,
}

impl ByteOrder {
	/// Return stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}
}

/// Simple bounded cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Create a cursor positioned at `pos`.
	pub fn at(bytes: &'a [u8], pos: usize) -> Result<Self> {
		if pos > bytes.len() {
			return Err(DecodeError::UnexpectedEof {
				at: pos,
				need: 0,
				rem: 0,
			});
		}
		Ok(Self { bytes, pos })
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(DecodeError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let raw = self.read_exact(N)?;
		let mut buf = [0_u8; N];
		buf.copy_from_slice(raw);
		Ok(buf)
	}

	/// Read one byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.read_array::<1>()?[0])
	}

	/// Read an `i32` using the selected byte order.
	pub fn read_i32(&mut self, order: ByteOrder) -> Result<i32> {
		let buf = self.read_array::<4>()?;
		Ok(match order {
			ByteOrder::Little => i32::from_le_bytes(buf),
			ByteOrder::Big => i32::from_be_bytes(buf),
		})
	}

	/// Read a little-endian `i32`.
	pub fn read_i32_le(&mut self) -> Result<i32> {
		self.read_i32(ByteOrder::Little)
	}

	/// Read a `u32` using the selected byte order.
	pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32> {
		let buf = self.read_array::<4>()?;
		Ok(match order {
			ByteOrder::Little => u32::from_le_bytes(buf),
			ByteOrder::Big => u32::from_be_bytes(buf),
		})
	}

	/// Read an `i64` using the selected byte order.
	pub fn read_i64(&mut self, order: ByteOrder) -> Result<i64> {
		let buf = self.read_array::<8>()?;
		Ok(match order {
			ByteOrder::Little => i64::from_le_bytes(buf),
			ByteOrder::Big => i64::from_be_bytes(buf),
		})
	}

	/// Read an `f32` using the selected byte order.
	pub fn read_f32(&mut self, order: ByteOrder) -> Result<f32> {
		Ok(f32::from_bits(self.read_u32(order)?))
	}

	/// Read a little-endian `f32`.
	pub fn read_f32_le(&mut self) -> Result<f32> {
		self.read_f32(ByteOrder::Little)
	}

	/// Read an `f64` using the selected byte order.
	pub fn read_f64(&mut self, order: ByteOrder) -> Result<f64> {
		let buf = self.read_array::<8>()?;
		Ok(match order {
			ByteOrder::Little => f64::from_le_bytes(buf),
			ByteOrder::Big => f64::from_be_bytes(buf),
		})
	}

	/// Read a 7-bit variable-length unsigned prefix, at most five bytes.
	pub fn read_7bit_len(&mut self) -> Result<u64> {
		let at = self.pos;
		let mut value = 0_u64;
		for shift in (0..35).step_by(7) {
			let byte = self.read_u8()?;
			value |= u64::from(byte & 0x7f) << shift;
			if byte & 0x80 == 0 {
				return Ok(value);
			}
		}
		Err(DecodeError::BadStringLength {
			at,
			len: value,
			rem: self.remaining(),
		})
	}

	/// Read a 7-bit length-prefixed UTF-8 string.
	pub fn read_prefixed_string(&mut self) -> Result<String> {
		let at = self.pos;
		let len = self.read_7bit_len()?;
		let len_usize = usize::try_from(len).map_err(|_| DecodeError::BadStringLength { at, len, rem: self.remaining() })?;
		if len_usize > self.remaining() {
			return Err(DecodeError::BadStringLength {
				at,
				len,
				rem: self.remaining(),
			});
		}
		let start = self.pos;
		let raw = self.read_exact(len_usize)?;
		String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { at: start })
	}
}

/// Append-only byte writer mirroring [`Cursor`] reads.
#[derive(Debug, Default)]
pub struct ByteWriter {
	out: Vec<u8>,
}

impl ByteWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Return written byte count.
	pub fn len(&self) -> usize {
		self.out.len()
	}

	/// Return whether nothing was written.
	pub fn is_empty(&self) -> bool {
		self.out.is_empty()
	}

	/// Consume the writer and return its bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.out
	}

	/// Append raw bytes.
	pub fn put_bytes(&mut self, bytes: &[u8]) {
		self.out.extend_from_slice(bytes);
	}

	/// Append one byte.
	pub fn put_u8(&mut self, value: u8) {
		self.out.push(value);
	}

	/// Append an `i32` in the selected byte order.
	pub fn put_i32(&mut self, value: i32, order: ByteOrder) {
		match order {
			ByteOrder::Little => self.put_bytes(&value.to_le_bytes()),
			ByteOrder::Big => self.put_bytes(&value.to_be_bytes()),
		}
	}

	/// Append a little-endian `i32`.
	pub fn put_i32_le(&mut self, value: i32) {
		self.put_i32(value, ByteOrder::Little);
	}

	/// Append a `u32` in the selected byte order.
	pub fn put_u32(&mut self, value: u32, order: ByteOrder) {
		match order {
			ByteOrder::Little => self.put_bytes(&value.to_le_bytes()),
			ByteOrder::Big => self.put_bytes(&value.to_be_bytes()),
		}
	}

	/// Append an `i64` in the selected byte order.
	pub fn put_i64(&mut self, value: i64, order: ByteOrder) {
		match order {
			ByteOrder::Little => self.put_bytes(&value.to_le_bytes()),
			ByteOrder::Big => self.put_bytes(&value.to_be_bytes()),
		}
	}

	/// Append an `f32` in the selected byte order.
	pub fn put_f32(&mut self, value: f32, order: ByteOrder) {
		self.put_u32(value.to_bits(), order);
	}

	/// Append a little-endian `f32`.
	pub fn put_f32_le(&mut self, value: f32) {
		self.put_f32(value, ByteOrder::Little);
	}

	/// Append an `f64` in the selected byte order.
	pub fn put_f64(&mut self, value: f64, order: ByteOrder) {
		match order {
			ByteOrder::Little => self.put_bytes(&value.to_le_bytes()),
			ByteOrder::Big => self.put_bytes(&value.to_be_bytes()),
		}
	}

	/// Append a 7-bit variable-length unsigned prefix.
	pub fn put_7bit_len(&mut self, mut value: u64) {
		while value >= 0x80 {
			self.put_u8((value as u8) | 0x80);
			value >>= 7;
		}
		self.put_u8(value as u8);
	}

	/// Append a 7-bit length-prefixed UTF-8 string.
	pub fn put_prefixed_string(&mut self, value: &str) {
		self.put_7bit_len(value.len() as u64);
		self.put_bytes(value.as_bytes());
	}
}

#[cfg(test)]
mod tests;
