use std::ops::Range;

use crate::tree::hash::{element_hash, field_hash};
use crate::tree::{ByteOrder, DecodeError, EntityIndex, FieldLayout, IndexMap, Result, UnknownPayload};

/// How one on-disk format composes field keys and finds their data slots.
///
/// Decoders call [`KeyScheme::begin_entity`] before each node or variable
/// and then [`KeyScheme::lookup`]; encoders only compose and record keys, so
/// both sides agree on key text by construction.
pub(crate) trait KeyScheme {
	/// Naming context threaded through nested fields.
	type Scope: Clone;
	/// Composed key for one field row.
	type Key;

	/// Decoder label used in diagnostics.
	const DECODER: &'static str;
	/// Byte order of the integer-family payloads.
	const ORDER: ByteOrder;
	/// Whether missing variable fields start from the live value.
	const SEEDS_LIVE_VARIABLES: bool;
	/// Whether unresolved node types may be rejected.
	const REJECTS_UNKNOWN_TYPES: bool;
	/// Whether placeholder comments are overwritten rather than prefixed.
	const REPLACES_UNKNOWN_COMMENT: bool;

	/// Scope of node `index`'s own fields.
	fn node_scope(&self, index: usize) -> Self::Scope;
	/// Scope of a document-level or global variable's fields.
	fn variable_scope(&self) -> Self::Scope;

	/// Compose the key of `field` declared as `type_key` inside `scope`.
	fn compose(&self, scope: &Self::Scope, type_key: &str, field: &str) -> (Self::Key, Self::Scope);
	/// Scope and field name of element `index` of a collection field.
	fn element(&self, field: &Self::Scope, outer: &Self::Scope, index: usize) -> (Self::Scope, String);
	/// Scope of a nested object's fields.
	fn nested(&self, field: &Self::Scope, outer: &Self::Scope) -> Self::Scope;
	/// Scope of a field-held shared variable's fields.
	fn variable(&self, field: &Self::Scope, outer: &Self::Scope) -> Self::Scope;

	/// Index one entity's rows for lookups.
	fn begin_entity(&mut self, layout: &FieldLayout, rows: Range<usize>) -> Result<()>;
	/// Data slot of a composed key in the current entity.
	fn lookup(&self, key: &Self::Key) -> Option<usize>;
	/// Append a row key to a layout under construction.
	fn record(&self, key: Self::Key, slot: usize, layout: &mut FieldLayout, with_index_map: bool);
	/// Append the row keys of captured placeholder rows, rebasing index map slots.
	fn adopt(&self, payload: &UnknownPayload, slot_base: i32, layout: &mut FieldLayout, with_index_map: bool) -> Result<()>;
}

/// Scope of the hash-keyed format: textual prefix plus accumulated hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HashScope {
	pub(crate) prefix: String,
	pub(crate) hash: i32,
}

/// Key of the hash-keyed format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HashKey {
	pub(crate) text: String,
	pub(crate) hash: i32,
}

/// Hash-keyed scheme with an optional document-wide index map.
pub(crate) struct CurrentKeys {
	index_map: IndexMap,
	per_element_hash: bool,
	entity: EntityIndex<i32>,
}

impl CurrentKeys {
	pub(crate) fn new(index_map: IndexMap, per_element_hash: bool) -> Self {
		Self {
			index_map,
			per_element_hash,
			entity: EntityIndex::default(),
		}
	}
}

impl KeyScheme for CurrentKeys {
	type Scope = HashScope;
	type Key = HashKey;

	const DECODER: &'static str = "current";
	const ORDER: ByteOrder = ByteOrder::Little;
	const SEEDS_LIVE_VARIABLES: bool = true;
	const REJECTS_UNKNOWN_TYPES: bool = true;
	const REPLACES_UNKNOWN_COMMENT: bool = true;

	fn node_scope(&self, index: usize) -> HashScope {
		HashScope {
			prefix: format!("task_{index}"),
			hash: 0,
		}
	}

	fn variable_scope(&self) -> HashScope {
		HashScope {
			prefix: "shared".to_owned(),
			hash: 0,
		}
	}

	fn compose(&self, scope: &HashScope, type_key: &str, field: &str) -> (HashKey, HashScope) {
		let hash = field_hash(scope.hash, type_key, field);
		let key = HashKey {
			text: format!("{}_{}_{}", scope.prefix, type_key, field),
			hash,
		};
		(key, HashScope { prefix: scope.prefix.clone(), hash })
	}

	fn element(&self, field: &HashScope, outer: &HashScope, index: usize) -> (HashScope, String) {
		let scope = HashScope {
			prefix: format!("{}_{}", outer.prefix, index),
			hash: element_hash(field.hash, index, self.per_element_hash),
		};
		(scope, index.to_string())
	}

	fn nested(&self, field: &HashScope, outer: &HashScope) -> HashScope {
		HashScope {
			prefix: outer.prefix.clone(),
			hash: field.hash,
		}
	}

	fn variable(&self, field: &HashScope, outer: &HashScope) -> HashScope {
		HashScope {
			prefix: format!("{}_shared", outer.prefix),
			hash: field.hash,
		}
	}

	fn begin_entity(&mut self, layout: &FieldLayout, rows: Range<usize>) -> Result<()> {
		self.entity = EntityIndex::by_hash(layout, rows)?;
		Ok(())
	}

	fn lookup(&self, key: &HashKey) -> Option<usize> {
		if self.index_map.is_empty() {
			return self.entity.get(&key.hash);
		}
		let candidates = self.index_map.candidates(&key.text);
		if candidates.is_empty() {
			return None;
		}
		let inside = candidates.iter().copied().filter(|slot| self.entity.contains_slot(*slot)).collect::<Vec<_>>();
		match inside.as_slice() {
			[] => self.entity.get(&key.hash),
			[slot] => Some(*slot),
			[.., last] => self.entity.get(&key.hash).filter(|slot| inside.contains(slot)).or(Some(*last)),
		}
	}

	fn record(&self, key: HashKey, slot: usize, layout: &mut FieldLayout, with_index_map: bool) {
		layout.name_hashes.push(key.hash);
		if with_index_map {
			layout.index_keys.push(key.text);
			layout.index_values.push(slot as i32);
		}
	}

	fn adopt(&self, payload: &UnknownPayload, slot_base: i32, layout: &mut FieldLayout, with_index_map: bool) -> Result<()> {
		if payload.name_hashes.len() != payload.row_count() {
			return Err(DecodeError::Unencodable {
				what: "name-keyed placeholder rows in a hash-keyed layout".to_owned(),
			});
		}
		layout.name_hashes.extend_from_slice(&payload.name_hashes);
		if with_index_map {
			for (key, slot) in &payload.index_entries {
				layout.index_keys.push(key.clone());
				layout.index_values.push(slot + slot_base);
			}
		}
		Ok(())
	}
}

/// Name-keyed scheme of pre-1.5 writers.
#[derive(Default)]
pub(crate) struct LegacyKeys {
	entity: EntityIndex<String>,
}

impl LegacyKeys {
	pub(crate) fn new() -> Self {
		Self::default()
	}
}

impl KeyScheme for LegacyKeys {
	type Scope = String;
	type Key = String;

	const DECODER: &'static str = "legacy";
	const ORDER: ByteOrder = ByteOrder::Big;
	const SEEDS_LIVE_VARIABLES: bool = false;
	const REJECTS_UNKNOWN_TYPES: bool = false;
	const REPLACES_UNKNOWN_COMMENT: bool = false;

	fn node_scope(&self, _index: usize) -> String {
		String::new()
	}

	fn variable_scope(&self) -> String {
		String::new()
	}

	fn compose(&self, scope: &String, type_key: &str, field: &str) -> (String, String) {
		let complete = format!("{type_key}{scope}{field}");
		(complete.clone(), complete)
	}

	fn element(&self, field: &String, _outer: &String, index: usize) -> (String, String) {
		(field.clone(), index.to_string())
	}

	fn nested(&self, field: &String, _outer: &String) -> String {
		field.clone()
	}

	fn variable(&self, field: &String, _outer: &String) -> String {
		field.clone()
	}

	fn begin_entity(&mut self, layout: &FieldLayout, rows: Range<usize>) -> Result<()> {
		self.entity = EntityIndex::by_type_name(layout, rows)?;
		Ok(())
	}

	fn lookup(&self, key: &String) -> Option<usize> {
		self.entity.get(key.as_str())
	}

	fn record(&self, key: String, _slot: usize, layout: &mut FieldLayout, _with_index_map: bool) {
		layout.type_names.push(key);
	}

	fn adopt(&self, payload: &UnknownPayload, _slot_base: i32, layout: &mut FieldLayout, _with_index_map: bool) -> Result<()> {
		if payload.type_names.len() != payload.row_count() {
			return Err(DecodeError::Unencodable {
				what: "hash-keyed placeholder rows in a name-keyed layout".to_owned(),
			});
		}
		layout.type_names.extend_from_slice(&payload.type_names);
		Ok(())
	}
}
