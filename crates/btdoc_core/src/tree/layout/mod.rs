use std::ops::Range;

use crate::tree::{DecodeError, Result};

/// Host-environment object referenced by index from field payloads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostObject {
	/// Position in the document's object table.
	pub index: usize,
	/// Display name recorded for the object.
	pub name: String,
}

/// Parallel tables locating every serialized field value inside one byte blob.
///
/// Rows are indexed by entity start indices; each row names a data slot, and
/// each data slot names a byte offset. A slot's payload runs until the next
/// slot's offset or the end of the blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldLayout {
	/// Legacy per-row key strings.
	pub type_names: Vec<String>,
	/// Current-format per-row key hashes.
	pub name_hashes: Vec<i32>,
	/// Row to data slot table.
	pub start_index: Vec<i32>,
	/// Data slot to byte offset table.
	pub data_position: Vec<i32>,
	/// Serialized field payloads.
	pub bytes: Vec<u8>,
	/// Index map keys, parallel to `index_values`.
	pub index_keys: Vec<String>,
	/// Index map data slots, parallel to `index_keys`.
	pub index_values: Vec<i32>,
	/// Host object table.
	pub objects: Vec<HostObject>,
}

impl FieldLayout {
	/// Number of field rows.
	pub fn row_count(&self) -> usize {
		self.start_index.len()
	}

	/// Number of data slots.
	pub fn slot_count(&self) -> usize {
		self.data_position.len()
	}

	/// Whether rows are keyed by legacy type-name strings.
	pub fn is_name_keyed(&self) -> bool {
		!self.type_names.is_empty()
	}

	/// Resolve a row to its data slot.
	pub fn slot_of_row(&self, row: usize) -> Result<usize> {
		let raw = *self.start_index.get(row).ok_or(DecodeError::LayoutIndexOutOfRange {
			table: "start_index",
			idx: row as i64,
			len: self.start_index.len(),
		})?;
		self.check_slot(raw)
	}

	/// Validate a stored data slot number.
	pub fn check_slot(&self, raw: i32) -> Result<usize> {
		usize::try_from(raw)
			.ok()
			.filter(|slot| *slot < self.data_position.len())
			.ok_or(DecodeError::LayoutIndexOutOfRange {
				table: "data_position",
				idx: i64::from(raw),
				len: self.data_position.len(),
			})
	}

	/// Byte offset where a data slot's payload begins.
	pub fn offset_of_slot(&self, slot: usize) -> Result<usize> {
		let raw = *self.data_position.get(slot).ok_or(DecodeError::LayoutIndexOutOfRange {
			table: "data_position",
			idx: slot as i64,
			len: self.data_position.len(),
		})?;
		usize::try_from(raw)
			.ok()
			.filter(|offset| *offset <= self.bytes.len())
			.ok_or(DecodeError::LayoutIndexOutOfRange {
				table: "bytes",
				idx: i64::from(raw),
				len: self.bytes.len(),
			})
	}

	/// Payload size of a data slot.
	pub fn field_size(&self, slot: usize) -> Result<usize> {
		let start = self.offset_of_slot(slot)?;
		let end = if slot + 1 < self.data_position.len() { self.offset_of_slot(slot + 1)? } else { self.bytes.len() };
		end.checked_sub(start).ok_or(DecodeError::NegativeFieldSize {
			slot,
			size: end as i64 - start as i64,
		})
	}

	/// Payload bytes of a data slot.
	pub fn payload(&self, slot: usize) -> Result<&[u8]> {
		let start = self.offset_of_slot(slot)?;
		let size = self.field_size(slot)?;
		Ok(&self.bytes[start..start + size])
	}
}

/// Node-and-variable document payload as stored by the behavior container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskData {
	/// Stored node type names, one per node.
	pub types: Vec<String>,
	/// Stored parent positions, one per node.
	pub parent_index: Vec<i32>,
	/// First field row of each node.
	pub start_index: Vec<i32>,
	/// First field row of each document-level variable.
	pub variable_start_index: Vec<i32>,
	/// Text serialization kept alongside the binary layout.
	pub json: String,
	/// Field rows and byte blob.
	pub layout: FieldLayout,
	/// Writer version tag.
	pub version: String,
}

impl TaskData {
	/// Field rows belonging to node `index`.
	pub fn node_rows(&self, index: usize) -> Result<Range<usize>> {
		entity_rows(&self.start_index, index, self.layout.row_count(), self.layout.row_count())
	}

	/// Field rows belonging to document-level variable `index`.
	///
	/// The last variable ends where the first node begins.
	pub fn variable_rows(&self, index: usize) -> Result<Range<usize>> {
		let rows = self.layout.row_count();
		let tail = match self.start_index.first() {
			Some(first) => usize::try_from(*first).map_err(|_| DecodeError::InvalidRowRange {
				start: i64::from(*first),
				end: i64::from(*first),
				rows,
			})?,
			None => rows,
		};
		entity_rows(&self.variable_start_index, index, tail, rows)
	}
}

/// Global-variable payload: variables only, no nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableData {
	/// First field row of each variable.
	pub variable_start_index: Vec<i32>,
	/// Field rows and byte blob.
	pub layout: FieldLayout,
	/// Writer version tag.
	pub version: String,
}

impl VariableData {
	/// Field rows belonging to variable `index`.
	pub fn variable_rows(&self, index: usize) -> Result<Range<usize>> {
		entity_rows(&self.variable_start_index, index, self.layout.row_count(), self.layout.row_count())
	}
}

impl From<TaskData> for VariableData {
	fn from(data: TaskData) -> Self {
		Self {
			variable_start_index: data.variable_start_index,
			layout: data.layout,
			version: data.version,
		}
	}
}

impl From<VariableData> for TaskData {
	fn from(data: VariableData) -> Self {
		Self {
			variable_start_index: data.variable_start_index,
			layout: data.layout,
			version: data.version,
			..Self::default()
		}
	}
}

fn entity_rows(starts: &[i32], index: usize, tail: usize, rows: usize) -> Result<Range<usize>> {
	let Some(start) = starts.get(index) else {
		return Err(DecodeError::LayoutIndexOutOfRange {
			table: "entity start",
			idx: index as i64,
			len: starts.len(),
		});
	};
	let end = match starts.get(index + 1) {
		Some(next) => i64::from(*next),
		None => tail as i64,
	};
	let start = i64::from(*start);
	if start < 0 || end < start || end > rows as i64 {
		return Err(DecodeError::InvalidRowRange { start, end, rows });
	}
	Ok(start as usize..end as usize)
}

#[cfg(test)]
mod tests;
