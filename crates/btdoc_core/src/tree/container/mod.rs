use std::fs;
use std::path::Path;

use tracing::debug;

use crate::tree::compression::{decode_bytes, encode_bytes};
use crate::tree::{ByteWriter, Compression, Cursor, DecodeError, FieldLayout, Result, TaskData};

/// Behavior container: name, description, and the serialized task data.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorFile {
	/// Behavior name.
	pub name: String,
	/// Behavior description.
	pub description: String,
	/// Serialized document.
	pub task_data: TaskData,
	/// Compression the file was read with.
	pub compression: Compression,
}

impl BehaviorFile {
	/// Wrap task data with empty name and description.
	pub fn new(task_data: TaskData) -> Self {
		Self {
			name: String::new(),
			description: String::new(),
			task_data,
			compression: Compression::None,
		}
	}

	/// Read and parse a container file, decompressing zstd frames.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		let (compression, bytes) = decode_bytes(raw)?;
		let mut file = Self::parse(&bytes)?;
		file.compression = compression;
		Ok(file)
	}

	/// Parse uncompressed container bytes.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let mut cur = Cursor::new(bytes);
		let name = cur.read_prefixed_string()?;
		let description = cur.read_prefixed_string()?;

		let types = read_list(&mut cur, Cursor::read_prefixed_string)?;
		let parent_index = read_list(&mut cur, Cursor::read_i32_le)?;
		let start_index = read_list(&mut cur, Cursor::read_i32_le)?;
		let variable_start_index = read_list(&mut cur, Cursor::read_i32_le)?;
		let json = cur.read_prefixed_string()?;

		let type_names = read_list(&mut cur, Cursor::read_prefixed_string)?;
		let name_hashes = read_list(&mut cur, Cursor::read_i32_le)?;
		let row_start_index = read_list(&mut cur, Cursor::read_i32_le)?;
		let data_position = read_list(&mut cur, Cursor::read_i32_le)?;
		let byte_data = read_blob(&mut cur)?;
		let byte_array = read_blob(&mut cur)?;
		let version = cur.read_prefixed_string()?;

		let pairs = read_count(&mut cur)?;
		let mut index_keys = Vec::with_capacity(pairs);
		let mut index_values = Vec::with_capacity(pairs);
		for _ in 0..pairs {
			index_keys.push(cur.read_prefixed_string()?);
			index_values.push(cur.read_i32_le()?);
		}

		if cur.remaining() > 0 {
			debug!(trailing = cur.remaining(), "container has trailing bytes");
		}

		let bytes = if byte_data.is_empty() { byte_array } else { byte_data };
		Ok(Self {
			name,
			description,
			task_data: TaskData {
				types,
				parent_index,
				start_index,
				variable_start_index,
				json,
				layout: FieldLayout {
					type_names,
					name_hashes,
					start_index: row_start_index,
					data_position,
					bytes,
					index_keys,
					index_values,
					objects: Vec::new(),
				},
				version,
			},
			compression: Compression::None,
		})
	}

	/// Serialize to uncompressed container bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		let data = &self.task_data;
		let layout = &data.layout;
		let mut out = ByteWriter::new();
		out.put_prefixed_string(&self.name);
		out.put_prefixed_string(&self.description);

		write_len(&mut out, data.types.len());
		for item in &data.types {
			out.put_prefixed_string(item);
		}
		write_ints(&mut out, &data.parent_index);
		write_ints(&mut out, &data.start_index);
		write_ints(&mut out, &data.variable_start_index);
		out.put_prefixed_string(&data.json);

		write_len(&mut out, layout.type_names.len());
		for item in &layout.type_names {
			out.put_prefixed_string(item);
		}
		write_ints(&mut out, &layout.name_hashes);
		write_ints(&mut out, &layout.start_index);
		write_ints(&mut out, &layout.data_position);
		for _ in 0..2 {
			write_len(&mut out, layout.bytes.len());
			out.put_bytes(&layout.bytes);
		}
		out.put_prefixed_string(&data.version);

		write_len(&mut out, layout.index_keys.len());
		for (key, value) in layout.index_keys.iter().zip(&layout.index_values) {
			out.put_prefixed_string(key);
			out.put_i32_le(*value);
		}
		out.into_bytes()
	}

	/// Write the container to `path` using `compression`.
	pub fn save(&self, path: impl AsRef<Path>, compression: Compression) -> Result<()> {
		let bytes = encode_bytes(self.to_bytes(), compression)?;
		fs::write(path, bytes)?;
		Ok(())
	}
}

fn read_count(cur: &mut Cursor<'_>) -> Result<usize> {
	let at = cur.pos();
	let count = cur.read_i32_le()?;
	let count = usize::try_from(count).map_err(|_| DecodeError::NegativeCount { count: i64::from(count), at })?;
	if count > cur.remaining() {
		return Err(DecodeError::UnexpectedEof {
			at,
			need: count,
			rem: cur.remaining(),
		});
	}
	Ok(count)
}

fn read_list<'a, T>(cur: &mut Cursor<'a>, read: impl Fn(&mut Cursor<'a>) -> Result<T>) -> Result<Vec<T>> {
	let count = read_count(cur)?;
	let mut out = Vec::with_capacity(count);
	for _ in 0..count {
		out.push(read(cur)?);
	}
	Ok(out)
}

fn read_blob(cur: &mut Cursor<'_>) -> Result<Vec<u8>> {
	let count = read_count(cur)?;
	Ok(cur.read_exact(count)?.to_vec())
}

fn write_len(out: &mut ByteWriter, len: usize) {
	out.put_i32_le(i32::try_from(len).unwrap_or(i32::MAX));
}

fn write_ints(out: &mut ByteWriter, values: &[i32]) {
	write_len(out, values.len());
	for value in values {
		out.put_i32_le(*value);
	}
}

#[cfg(test)]
mod tests;
