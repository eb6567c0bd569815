use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

use tracing::trace;

use crate::tree::{FieldLayout, Result};

/// Document-wide textual key to data slot map.
///
/// Writers reuse one key for sibling variable fields of an entity, so every
/// slot recorded for a key is kept in stored order.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
	slots: HashMap<String, Vec<usize>>,
}

impl IndexMap {
	/// Build from the layout's parallel key/value lists.
	pub fn build(layout: &FieldLayout) -> Result<Self> {
		let mut slots: HashMap<String, Vec<usize>> = HashMap::with_capacity(layout.index_keys.len());
		for (key, raw) in layout.index_keys.iter().zip(&layout.index_values) {
			let slot = layout.check_slot(*raw)?;
			slots.entry(key.clone()).or_default().push(slot);
		}
		Ok(Self { slots })
	}

	/// Look up a composed key; later duplicates win.
	pub fn get(&self, key: &str) -> Option<usize> {
		self.candidates(key).last().copied()
	}

	/// Every slot recorded for a composed key.
	pub fn candidates(&self, key: &str) -> &[usize] {
		self.slots.get(key).map(Vec::as_slice).unwrap_or_default()
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether the document carried no index map.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}

/// Per-entity row key to data slot map over one entity's row range.
#[derive(Debug, Clone)]
pub struct EntityIndex<K> {
	slots: HashMap<K, usize>,
	span: Range<usize>,
}

impl<K> Default for EntityIndex<K> {
	fn default() -> Self {
		Self {
			slots: HashMap::new(),
			span: 0..0,
		}
	}
}

impl<K: Hash + Eq> EntityIndex<K> {
	fn build(layout: &FieldLayout, rows: Range<usize>, key_of: impl Fn(usize) -> Option<K>) -> Result<Self> {
		let mut slots = HashMap::with_capacity(rows.len());
		let mut span: Option<Range<usize>> = None;
		for row in rows {
			let slot = layout.slot_of_row(row)?;
			span = Some(match span {
				Some(span) => span.start.min(slot)..span.end.max(slot + 1),
				None => slot..slot + 1,
			});
			let Some(key) = key_of(row) else {
				trace!(row, "row has no key");
				continue;
			};
			slots.entry(key).or_insert(slot);
		}
		Ok(Self {
			slots,
			span: span.unwrap_or(0..0),
		})
	}

	/// Look up a row key.
	pub fn get<Q>(&self, key: &Q) -> Option<usize>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.slots.get(key).copied()
	}

	/// Whether `slot` falls inside this entity's data slots.
	pub fn contains_slot(&self, slot: usize) -> bool {
		self.span.contains(&slot)
	}

	/// Data slots covered by this entity.
	pub fn span(&self) -> Range<usize> {
		self.span.clone()
	}
}

impl EntityIndex<i32> {
	/// Index rows by their stored name hash.
	pub fn by_hash(layout: &FieldLayout, rows: Range<usize>) -> Result<Self> {
		Self::build(layout, rows, |row| layout.name_hashes.get(row).copied())
	}
}

impl EntityIndex<String> {
	/// Index rows by their stored legacy type-name key.
	pub fn by_type_name(layout: &FieldLayout, rows: Range<usize>) -> Result<Self> {
		Self::build(layout, rows, |row| layout.type_names.get(row).cloned())
	}
}
