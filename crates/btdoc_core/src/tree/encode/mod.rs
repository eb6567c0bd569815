use tracing::debug;

use crate::tree::codec::{unencodable, write_scalar};
use crate::tree::keys::{CurrentKeys, KeyScheme, LegacyKeys};
use crate::tree::value::find_field;
use crate::tree::{
	ByteWriter, DecodeError, Document, FieldKind, FieldLayout, FieldSlot, FieldValue, FormatVersion, GlobalVariables, HostObject, IndexMap, Node, NodeMeta, Registry, Result, SharedVariable,
	TaskData, TypeCategory, TypeSchema, UnknownPayload, Value, VariableData,
};

/// Output switches for [`TreeEncoder`].
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
	/// Layout family and element hashing rule to write.
	pub format: FormatVersion,
	/// Also write the textual index map (current format only).
	pub index_map: bool,
}

impl Default for EncodeOptions {
	fn default() -> Self {
		Self {
			format: FormatVersion::Current { per_element_hash: true },
			index_map: true,
		}
	}
}

/// Writes documents back into field layouts the decoders accept.
pub struct TreeEncoder<'a> {
	registry: &'a Registry,
	options: EncodeOptions,
}

impl<'a> TreeEncoder<'a> {
	/// Encoder over a registry.
	pub fn new(registry: &'a Registry, options: EncodeOptions) -> Self {
		Self { registry, options }
	}

	/// Encode a tree document.
	pub fn encode_tree(&self, doc: &Document) -> Result<TaskData> {
		match self.options.format {
			FormatVersion::Legacy => self.tree_with(LegacyKeys::new(), doc),
			FormatVersion::Current { per_element_hash } => self.tree_with(CurrentKeys::new(IndexMap::default(), per_element_hash), doc),
		}
	}

	/// Encode a global variable pool.
	pub fn encode_globals(&self, globals: &GlobalVariables) -> Result<VariableData> {
		match self.options.format {
			FormatVersion::Legacy => self.globals_with(LegacyKeys::new(), globals),
			FormatVersion::Current { per_element_hash } => self.globals_with(CurrentKeys::new(IndexMap::default(), per_element_hash), globals),
		}
	}

	fn writer<K: KeyScheme>(&self, keys: K) -> RowWriter<'a, K> {
		RowWriter {
			registry: self.registry,
			keys,
			layout: FieldLayout::default(),
			index_map: self.options.index_map,
		}
	}

	fn tree_with<K: KeyScheme>(&self, keys: K, doc: &Document) -> Result<TaskData> {
		let mut writer = self.writer(keys);
		let mut data = TaskData {
			parent_index: doc.parent_indices(),
			version: self.options.format.version_tag().to_owned(),
			..TaskData::default()
		};

		let scope = writer.keys.variable_scope();
		for variable in &doc.variables {
			data.variable_start_index.push(writer.layout.row_count() as i32);
			writer.variable(&scope, variable)?;
		}
		for (index, node) in doc.nodes.iter().enumerate() {
			data.types.push(node.type_name.to_string());
			data.start_index.push(writer.layout.row_count() as i32);
			match node.unknown_payload() {
				Some(payload) => writer.splice(payload)?,
				None => writer.node(index, node)?,
			}
		}

		data.layout = writer.layout;
		debug!(format = self.options.format.as_str(), nodes = data.types.len(), rows = data.layout.row_count(), "encoded tree");
		Ok(data)
	}

	fn globals_with<K: KeyScheme>(&self, keys: K, globals: &GlobalVariables) -> Result<VariableData> {
		let mut writer = self.writer(keys);
		let mut variable_start_index = Vec::with_capacity(globals.variables.len());
		let scope = writer.keys.variable_scope();
		for variable in &globals.variables {
			variable_start_index.push(writer.layout.row_count() as i32);
			writer.variable(&scope, variable)?;
		}
		Ok(VariableData {
			variable_start_index,
			layout: writer.layout,
			version: self.options.format.version_tag().to_owned(),
		})
	}
}

struct RowWriter<'a, K: KeyScheme> {
	registry: &'a Registry,
	keys: K,
	layout: FieldLayout,
	index_map: bool,
}

impl<K: KeyScheme> RowWriter<'_, K> {
	fn note_object(&mut self, object: &HostObject) {
		let objects = &mut self.layout.objects;
		while objects.len() <= object.index {
			objects.push(HostObject {
				index: objects.len(),
				name: String::new(),
			});
		}
		objects[object.index] = object.clone();
	}

	fn row(&mut self, key: K::Key, payload: &[u8]) {
		let slot = self.layout.data_position.len();
		self.layout.data_position.push(self.layout.bytes.len() as i32);
		self.layout.bytes.extend_from_slice(payload);
		self.layout.start_index.push(slot as i32);
		self.keys.record(key, slot, &mut self.layout, self.index_map);
	}

	fn node(&mut self, index: usize, node: &Node) -> Result<()> {
		let scope = self.keys.node_scope(index);
		self.value(&FieldKind::Int, "ID", &scope, None, &Value::Int(node.id))?;
		self.value(&FieldKind::String, "FriendlyName", &scope, None, &Value::String(node.friendly_name.clone()))?;
		self.value(&FieldKind::Bool, "IsInstant", &scope, None, &Value::Bool(node.is_instant))?;
		self.value(&FieldKind::Bool, "Disabled", &scope, None, &Value::Bool(node.disabled))?;
		if let Some(meta) = &node.meta {
			self.meta(&scope, meta)?;
		}

		let schema = self
			.registry
			.resolve_task(&node.type_name)
			.ok_or_else(|| DecodeError::UnknownSchema { name: node.type_name.to_string() })?;
		self.fields(schema, &node.fields, &scope)
	}

	fn meta(&mut self, scope: &K::Scope, meta: &NodeMeta) -> Result<()> {
		self.value(&FieldKind::Vector2, "NodeDataOffset", scope, None, &Value::Vector2(meta.offset))?;
		self.value(&FieldKind::String, "NodeDataComment", scope, None, &Value::String(meta.comment.clone()))?;
		self.value(&FieldKind::Bool, "NodeDataIsBreakpoint", scope, None, &Value::Bool(meta.is_breakpoint))?;
		self.value(&FieldKind::Bool, "NodeDataCollapsed", scope, None, &Value::Bool(meta.collapsed))?;
		self.value(&FieldKind::Int, "NodeDataColorIndex", scope, None, &Value::Int(meta.color_index))?;
		if !meta.watched_fields.is_empty() {
			let names = meta.watched_fields.iter().map(|name| Value::String(name.to_string())).collect();
			self.value(&FieldKind::list(FieldKind::String), "NodeDataWatchedFields", scope, None, &Value::List(names))?;
		}
		Ok(())
	}

	fn fields(&mut self, schema: &TypeSchema, values: &[FieldValue], scope: &K::Scope) -> Result<()> {
		let registry = self.registry;
		let composite = registry.is_composite(schema);
		for slot in registry.fields(schema) {
			if !slot.visibility.is_serialized() || (composite && slot.name.as_ref() == "children") {
				continue;
			}
			if let Some(value) = find_field(values, &slot.name) {
				self.value(&slot.kind, &slot.name, scope, Some(slot), value)?;
			}
		}
		Ok(())
	}

	fn variable(&mut self, scope: &K::Scope, variable: &SharedVariable) -> Result<()> {
		let schema = self
			.registry
			.resolve_variable(&variable.type_name)
			.ok_or_else(|| DecodeError::UnknownSchema { name: variable.type_name.to_string() })?;
		self.value(&FieldKind::String, "Type", scope, None, &Value::String(variable.type_name.to_string()))?;
		self.value(&FieldKind::String, "Name", scope, None, &Value::String(variable.name.clone()))?;
		self.value(&FieldKind::Bool, "IsShared", scope, None, &Value::Bool(variable.is_shared))?;
		self.value(&FieldKind::Bool, "IsGlobal", scope, None, &Value::Bool(variable.is_global))?;
		self.value(&FieldKind::Bool, "NetworkSync", scope, None, &Value::Bool(variable.network_sync))?;
		if !variable.is_global {
			if let Some(mapping) = &variable.property_mapping {
				self.value(&FieldKind::String, "PropertyMapping", scope, None, &Value::String(mapping.clone()))?;
			}
			if let Some(owner) = &variable.property_mapping_owner {
				self.value(&FieldKind::host_object("GameObject"), "PropertyMappingOwner", scope, None, &Value::HostObject(owner.clone()))?;
			}
		}
		self.fields(schema, &variable.fields, scope)
	}

	fn value(&mut self, kind: &FieldKind, name: &str, scope: &K::Scope, slot: Option<&FieldSlot>, value: &Value) -> Result<()> {
		if value.is_null() {
			return Ok(());
		}
		let registry = self.registry;
		let type_key = kind.key_name();
		let (key, field_scope) = self.keys.compose(scope, &type_key, name);

		match (kind, value) {
			(FieldKind::Array(element) | FieldKind::List(element), Value::Array(items) | Value::List(items)) => {
				let mut out = ByteWriter::new();
				out.put_i32(i32::try_from(items.len()).map_err(|_| unencodable(kind, value))?, K::ORDER);
				self.row(key, &out.into_bytes());
				for (idx, item) in items.iter().enumerate() {
					let (element_scope, element_name) = self.keys.element(&field_scope, scope, idx);
					self.value(element, &element_name, &element_scope, slot, item)?;
				}
			}
			(FieldKind::Node(_), Value::Node(link)) => {
				let mut out = ByteWriter::new();
				out.put_i32(i32::try_from(link.node.0).map_err(|_| unencodable(kind, value))?, K::ORDER);
				self.row(key, &out.into_bytes());
			}
			(FieldKind::Node(_), Value::Object(object)) if slot.is_some_and(|slot| slot.inspect) => {
				let schema = registry
					.resolve_task(&object.type_name)
					.ok_or_else(|| DecodeError::UnknownSchema { name: object.type_name.to_string() })?;
				self.row(key, object.type_name.as_bytes());
				let nested = self.keys.nested(&field_scope, scope);
				self.fields(schema, &object.fields, &nested)?;
			}
			(FieldKind::Variable(_), Value::Variable(variable)) => {
				self.row(key, &[]);
				let variable_scope = self.keys.variable(&field_scope, scope);
				self.variable(&variable_scope, variable)?;
			}
			(FieldKind::Struct(type_name), Value::Object(object)) => {
				let schema = registry.require(type_name, TypeCategory::Plain)?;
				self.row(key, &[]);
				let nested = self.keys.nested(&field_scope, scope);
				self.fields(schema, &object.fields, &nested)?;
			}
			_ => {
				if let Value::HostObject(object) = value {
					self.note_object(object);
				}
				let mut out = ByteWriter::new();
				write_scalar(&mut out, kind, value, K::ORDER)?;
				self.row(key, &out.into_bytes());
			}
		}
		Ok(())
	}

	/// Append an unresolved node's captured rows, rebased onto this layout.
	fn splice(&mut self, payload: &UnknownPayload) -> Result<()> {
		let slot_base = self.layout.data_position.len() as i32;
		let byte_base = self.layout.bytes.len() as i32;
		self.keys.adopt(payload, slot_base, &mut self.layout, self.index_map)?;
		self.layout.start_index.extend(payload.start_index.iter().map(|slot| slot + slot_base));
		self.layout.data_position.extend(payload.data_position.iter().map(|offset| offset + byte_base));
		self.layout.bytes.extend_from_slice(&payload.bytes);
		for object in &payload.objects {
			self.note_object(object);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
