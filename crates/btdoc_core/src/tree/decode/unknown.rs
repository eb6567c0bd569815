use std::ops::Range;

use crate::tree::{DecodeError, NodeMeta, Result, TaskData, UnknownPayload};

/// Comment written on placeholders by the current decoder.
pub const CURRENT_UNKNOWN_COMMENT: &str = "Unknown Task. Right click and Replace to locate new task.";
/// Note prefixed to placeholder comments by the legacy decoder.
pub const LEGACY_UNKNOWN_COMMENT: &str = "Loaded from an unknown type. Was a task renamed or deleted?";

const UNKNOWN_PREFIX: &str = "Unknown ";

/// Copy node `index`'s rows, rebased to start at zero.
pub(super) fn capture(data: &TaskData, index: usize, rows: Range<usize>) -> Result<UnknownPayload> {
	let layout = &data.layout;
	let slots = rows.clone().map(|row| layout.slot_of_row(row)).collect::<Result<Vec<_>>>()?;
	let (Some(first), Some(last)) = (slots.iter().min().copied(), slots.iter().max().copied()) else {
		return Ok(UnknownPayload {
			objects: layout.objects.clone(),
			..UnknownPayload::default()
		});
	};

	let base = layout.offset_of_slot(first)?;
	let next_row = data.start_index.get(index + 1).and_then(|row| usize::try_from(*row).ok()).filter(|row| *row < layout.row_count());
	let end = match next_row {
		Some(row) => layout.offset_of_slot(layout.slot_of_row(row)?)?,
		None => layout.bytes.len(),
	};
	if end < base {
		return Err(DecodeError::NegativeFieldSize {
			slot: first,
			size: end as i64 - base as i64,
		});
	}

	let mut data_position = Vec::with_capacity(last - first + 1);
	for slot in first..=last {
		let offset = layout.offset_of_slot(slot)?;
		let rebased = offset.checked_sub(base).ok_or(DecodeError::NegativeFieldSize {
			slot,
			size: offset as i64 - base as i64,
		})?;
		data_position.push(rebased as i32);
	}

	let index_entries = layout
		.index_keys
		.iter()
		.zip(&layout.index_values)
		.filter(|(_, value)| usize::try_from(**value).is_ok_and(|slot| (first..=last).contains(&slot)))
		.map(|(key, value)| (key.clone(), *value - first as i32))
		.collect();

	Ok(UnknownPayload {
		type_names: rows.clone().filter_map(|row| layout.type_names.get(row).cloned()).collect(),
		name_hashes: rows.filter_map(|row| layout.name_hashes.get(row).copied()).collect(),
		start_index: slots.iter().map(|slot| (slot - first) as i32).collect(),
		data_position,
		bytes: layout.bytes[base..end].to_vec(),
		index_entries,
		objects: layout.objects.clone(),
	})
}

/// Flag a placeholder's display name and comment.
pub(super) fn mark(friendly_name: &mut String, meta: Option<&mut NodeMeta>, replace_comment: bool) {
	if !friendly_name.contains(UNKNOWN_PREFIX) {
		friendly_name.insert_str(0, UNKNOWN_PREFIX);
	}
	let Some(meta) = meta else {
		return;
	};
	if replace_comment {
		meta.comment = CURRENT_UNKNOWN_COMMENT.to_owned();
	} else if !meta.comment.contains(LEGACY_UNKNOWN_COMMENT) {
		meta.comment = if meta.comment.is_empty() {
			LEGACY_UNKNOWN_COMMENT.to_owned()
		} else {
			format!("{LEGACY_UNKNOWN_COMMENT}\0{}", meta.comment)
		};
	}
}
