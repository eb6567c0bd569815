use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::tree::codec::FieldReader;
use crate::tree::keys::KeyScheme;
use crate::tree::value::{find_field, set_field};
use crate::tree::{
	DecodeError, FieldKind, FieldLayout, FieldSlot, FieldValue, GlobalVariables, Node, NodeId, NodeMeta, NodeShape, ObjectValue, OwnerId, PropertyMapper, Registry, Result,
	SharedVariable, TaskData, TypeCategory, TypeSchema, Value, VariableSource,
};

mod refs;
mod unknown;

pub(crate) use refs::{PendingRefs, Wiring, wire_parents};
pub use unknown::{CURRENT_UNKNOWN_COMMENT, LEGACY_UNKNOWN_COMMENT};

use refs::{FieldPath, RefOwner};

/// Runtime limits and behavior switches for document decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Reject unresolved node types in the current format instead of keeping placeholders.
	pub strict_types: bool,
	/// Decode editor presentation data for each node.
	pub include_node_meta: bool,
	/// Owner stamped on every decoded node.
	pub owner: OwnerId,
	/// Maximum nested field depth.
	pub max_depth: u32,
	/// Maximum element count of one stored collection.
	pub max_elements: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			strict_types: true,
			include_node_meta: true,
			owner: OwnerId::default(),
			max_depth: 32,
			max_elements: 1 << 20,
		}
	}
}

impl DecodeOptions {
	/// Preset for inspection tools: unresolved types become placeholders.
	pub fn for_inspect() -> Self {
		Self {
			strict_types: false,
			include_node_meta: true,
			owner: OwnerId::default(),
			max_depth: 32,
			max_elements: 1 << 20,
		}
	}
}

/// Everything a decode call reads besides the document itself.
pub struct DecodeContext<'a> {
	/// Type registry.
	pub registry: &'a Registry,
	/// Global variable pool for `IsGlobal` references.
	pub globals: Option<&'a GlobalVariables>,
	/// Hook run on freshly constructed non-global variables.
	pub property_mapper: Option<&'a dyn PropertyMapper>,
	/// Limits and switches.
	pub options: DecodeOptions,
}

impl<'a> DecodeContext<'a> {
	/// Context with default options and no global pool.
	pub fn new(registry: &'a Registry) -> Self {
		Self {
			registry,
			globals: None,
			property_mapper: None,
			options: DecodeOptions::default(),
		}
	}

	/// Attach a global variable pool.
	pub fn with_globals(mut self, globals: &'a GlobalVariables) -> Self {
		self.globals = Some(globals);
		self
	}

	/// Attach a property mapping hook.
	pub fn with_property_mapper(mut self, mapper: &'a dyn PropertyMapper) -> Self {
		self.property_mapper = Some(mapper);
		self
	}

	/// Replace the options.
	pub fn with_options(mut self, options: DecodeOptions) -> Self {
		self.options = options;
		self
	}
}

/// One decode call's working state over a single layout.
pub(crate) struct Session<'a, K: KeyScheme> {
	ctx: &'a DecodeContext<'a>,
	layout: &'a FieldLayout,
	reader: FieldReader<'a>,
	keys: K,
	nodes: Vec<Node>,
	locals: Vec<Arc<SharedVariable>>,
	pending: PendingRefs,
}

impl<'a, K: KeyScheme> Session<'a, K> {
	pub(crate) fn new(ctx: &'a DecodeContext<'a>, layout: &'a FieldLayout, keys: K) -> Self {
		Self {
			ctx,
			layout,
			reader: FieldReader::new(layout, K::ORDER),
			keys,
			nodes: Vec::new(),
			locals: Vec::new(),
			pending: PendingRefs::default(),
		}
	}

	/// Decode one document-level or global variable from its rows.
	pub(crate) fn variable(&mut self, rows: Range<usize>) -> Result<Option<Arc<SharedVariable>>> {
		self.keys.begin_entity(self.layout, rows)?;
		let scope = self.keys.variable_scope();
		self.shared_variable(&scope, false, 0)
	}

	/// Make a decoded variable visible to later `IsShared` lookups.
	pub(crate) fn push_local(&mut self, variable: Arc<SharedVariable>) {
		self.locals.push(variable);
	}

	/// Decode node `index` and append it to the arena.
	pub(crate) fn node(&mut self, data: &TaskData, index: usize) -> Result<()> {
		let registry = self.ctx.registry;
		let rows = data.node_rows(index)?;
		self.keys.begin_entity(self.layout, rows.clone())?;

		let stored_type = data.types.get(index).map(String::as_str).unwrap_or_default();
		let (schema, unknown) = match registry.resolve_task(stored_type).filter(|schema| !schema.is_abstract) {
			Some(schema) => (schema, None),
			None => {
				if K::REJECTS_UNKNOWN_TYPES && self.ctx.options.strict_types {
					return Err(DecodeError::UnknownNodeType {
						decoder: K::DECODER,
						type_name: stored_type.to_owned(),
						index,
					});
				}
				let is_parent = data.parent_index.iter().any(|parent| usize::try_from(*parent).is_ok_and(|parent| parent == index));
				let payload = unknown::capture(data, index, rows)?;
				warn!(type_name = stored_type, index, decoder = K::DECODER, "unresolved node type, keeping placeholder");
				(registry.unknown_task(is_parent)?, Some((is_parent, payload)))
			}
		};

		let id = NodeId(self.nodes.len());
		let scope = self.keys.node_scope(index);
		let stored_id = self.int(&scope, "ID")?.unwrap_or(0);
		let mut friendly_name = self.string(&scope, "FriendlyName", 0)?.unwrap_or_default();
		let is_instant = self.flag(&scope, "IsInstant", 0)?.unwrap_or(true);
		let disabled = self.flag(&scope, "Disabled", 0)?.unwrap_or(schema.disabled_by_default);
		let mut meta = if self.ctx.options.include_node_meta { Some(self.meta(schema, &scope)?) } else { None };

		let mut fields = registry.default_fields(schema);
		self.fields(schema, &mut fields, &scope, Some(&FieldPath::root(id)), 0)?;

		let shape = match unknown {
			Some((is_parent, payload)) => {
				unknown::mark(&mut friendly_name, meta.as_mut(), K::REPLACES_UNKNOWN_COMMENT);
				NodeShape::Unknown {
					is_parent,
					children: Vec::new(),
					payload: Box::new(payload),
				}
			}
			None if registry.is_composite(schema) => NodeShape::Composite { children: Vec::new() },
			None => NodeShape::Leaf,
		};

		trace!(index, type_name = stored_type, fields = fields.len(), "decoded node");
		self.nodes.push(Node {
			type_name: stored_type.into(),
			id: stored_id,
			friendly_name,
			is_instant,
			disabled,
			reference_id: index as i32,
			owner: self.ctx.options.owner,
			meta,
			fields,
			shape,
		});
		Ok(())
	}

	pub(crate) fn finish(self) -> (Vec<Node>, PendingRefs, Vec<Arc<SharedVariable>>) {
		(self.nodes, self.pending, self.locals)
	}

	fn meta(&mut self, schema: &TypeSchema, scope: &K::Scope) -> Result<NodeMeta> {
		let registry = self.ctx.registry;
		let mut meta = NodeMeta::default();
		if let Some(Value::Vector2(offset)) = self.plain(&FieldKind::Vector2, "NodeDataOffset", scope, 0)? {
			meta.offset = offset;
		}
		meta.comment = self.string(scope, "NodeDataComment", 0)?.unwrap_or_default();
		meta.is_breakpoint = self.flag(scope, "NodeDataIsBreakpoint", 0)?.unwrap_or(false);
		meta.collapsed = self.flag(scope, "NodeDataCollapsed", 0)?.unwrap_or(false);
		meta.color_index = self.int(scope, "NodeDataColorIndex")?.unwrap_or(0);
		if let Some(Value::List(items)) = self.plain(&FieldKind::list(FieldKind::String), "NodeDataWatchedFields", scope, 0)? {
			meta.watched_fields = items
				.iter()
				.filter_map(Value::as_str)
				.filter(|name| registry.field(schema, name).is_some())
				.map(Into::into)
				.collect();
		}
		Ok(meta)
	}

	fn plain(&mut self, kind: &FieldKind, name: &str, scope: &K::Scope, depth: u32) -> Result<Option<Value>> {
		self.field(kind, name, scope, None, &Value::Null, None, depth)
	}

	fn string(&mut self, scope: &K::Scope, name: &str, depth: u32) -> Result<Option<String>> {
		Ok(match self.plain(&FieldKind::String, name, scope, depth)? {
			Some(Value::String(text)) => Some(text),
			_ => None,
		})
	}

	fn flag(&mut self, scope: &K::Scope, name: &str, depth: u32) -> Result<Option<bool>> {
		Ok(match self.plain(&FieldKind::Bool, name, scope, depth)? {
			Some(Value::Bool(flag)) => Some(flag),
			_ => None,
		})
	}

	fn int(&mut self, scope: &K::Scope, name: &str) -> Result<Option<i32>> {
		Ok(match self.plain(&FieldKind::Int, name, scope, 0)? {
			Some(Value::Int(value)) => Some(value),
			_ => None,
		})
	}

	/// Decode every serialized field of `schema` into `values`.
	fn fields(&mut self, schema: &TypeSchema, values: &mut Vec<FieldValue>, scope: &K::Scope, base: Option<&FieldPath>, depth: u32) -> Result<()> {
		let registry = self.ctx.registry;
		let composite = registry.is_composite(schema);
		for slot in registry.fields(schema) {
			if !slot.visibility.is_serialized() || (composite && slot.name.as_ref() == "children") {
				continue;
			}
			let owner = base.map(|base| RefOwner::new(base.child(&slot.name), &slot.kind));
			let decoded = {
				let live = find_field(values, &slot.name).unwrap_or(&Value::Null);
				self.field(&slot.kind, &slot.name, scope, Some(slot), live, owner.as_ref(), depth)?
			};
			if let Some(value) = decoded {
				set_field(values, &slot.name, value);
			}
		}
		Ok(())
	}

	/// Decode one field; `None` leaves the current value in place.
	#[allow(clippy::too_many_arguments)]
	fn field(&mut self, kind: &FieldKind, name: &str, scope: &K::Scope, slot: Option<&FieldSlot>, live: &Value, owner: Option<&RefOwner>, depth: u32) -> Result<Option<Value>> {
		let max_depth = self.ctx.options.max_depth;
		if depth > max_depth {
			return Err(DecodeError::DecodeDepthExceeded { max_depth });
		}

		let registry = self.ctx.registry;
		let type_key = kind.key_name();
		let (key, field_scope) = self.keys.compose(scope, &type_key, name);
		let Some(data_slot) = self.keys.lookup(&key) else {
			return Ok(self.missing(kind, live));
		};

		match kind {
			FieldKind::Array(element) | FieldKind::List(element) => {
				let count = self.reader.count(data_slot, self.ctx.options.max_elements)?;
				let mut items = Vec::with_capacity(count);
				let nests_objects = match element.as_ref() {
					FieldKind::Struct(_) => true,
					FieldKind::Node(_) => slot.is_some_and(|slot| slot.inspect),
					_ => false,
				};
				for idx in 0..count {
					let (element_scope, element_name) = self.keys.element(&field_scope, scope, idx);
					let element_owner = if nests_objects { owner.map(|owner| owner.element(idx)) } else { None };
					let item_owner = element_owner.as_ref().or(owner);
					let item = self.field(element, &element_name, &element_scope, slot, &Value::Null, item_owner, depth + 1)?;
					items.push(item.unwrap_or(Value::Null));
				}
				Ok(Some(if matches!(kind, FieldKind::Array(_)) { Value::Array(items) } else { Value::List(items) }))
			}
			FieldKind::Node(_) if slot.is_some_and(|slot| slot.inspect) => {
				let Value::String(type_name) = self.reader.scalar(&FieldKind::String, data_slot)? else {
					return Ok(None);
				};
				let Some(schema) = registry.resolve_task(&type_name).filter(|schema| !schema.is_abstract) else {
					warn!(type_name = %type_name, field = name, "unresolved inline node type");
					return Ok(None);
				};
				let mut fields = registry.default_fields(schema);
				let nested = self.keys.nested(&field_scope, scope);
				self.fields(schema, &mut fields, &nested, owner.map(|owner| &owner.at), depth + 1)?;
				Ok(Some(Value::Object(ObjectValue {
					type_name: schema.name.clone(),
					fields,
				})))
			}
			FieldKind::Node(_) => {
				let id = self.reader.int(data_slot)?;
				match owner {
					Some(owner) => self.pending.push(owner, id),
					None => trace!(id, field = name, "node link outside a node field dropped"),
				}
				Ok(None)
			}
			FieldKind::Variable(_) => {
				let variable_scope = self.keys.variable(&field_scope, scope);
				Ok(self.shared_variable(&variable_scope, true, depth + 1)?.map(Value::Variable))
			}
			FieldKind::Struct(type_name) => {
				let schema = registry.require(type_name, TypeCategory::Plain)?;
				let mut fields = registry.default_fields(schema);
				let nested = self.keys.nested(&field_scope, scope);
				self.fields(schema, &mut fields, &nested, owner.map(|owner| &owner.at), depth + 1)?;
				Ok(Some(Value::Object(ObjectValue {
					type_name: schema.name.clone(),
					fields,
				})))
			}
			FieldKind::HostObject(_) => match self.reader.scalar(kind, data_slot)? {
				Value::Null => {
					warn!(field = name, "host object index outside the object table, field left at its default");
					Ok(None)
				}
				value => Ok(Some(value)),
			},
			_ => Ok(Some(self.reader.scalar(kind, data_slot)?)),
		}
	}

	/// Value for a field with no stored row.
	fn missing(&self, kind: &FieldKind, live: &Value) -> Option<Value> {
		let registry = self.ctx.registry;
		if registry.is_abstract_kind(kind) {
			return None;
		}
		let FieldKind::Variable(type_name) = kind else {
			return None;
		};
		let Some(schema) = registry.resolve_variable(type_name) else {
			warn!(type_name = %type_name, "missing field of unregistered variable type");
			return None;
		};
		let mut variable = SharedVariable::blank(registry, schema);
		if K::SEEDS_LIVE_VARIABLES
			&& let Value::Variable(current) = live
			&& let Some(value) = current.value()
		{
			variable.set_value(value.clone());
		}
		Some(Value::Variable(Arc::new(variable)))
	}

	/// Decode the shared variable rooted at `scope`.
	fn shared_variable(&mut self, scope: &K::Scope, from_field: bool, depth: u32) -> Result<Option<Arc<SharedVariable>>> {
		let registry = self.ctx.registry;
		let Some(type_name) = self.string(scope, "Type", depth)?.filter(|name| !name.is_empty()) else {
			return Ok(None);
		};
		let name = self.string(scope, "Name", depth)?.unwrap_or_default();
		let is_shared = self.flag(scope, "IsShared", depth)?.unwrap_or(false);
		let is_global = self.flag(scope, "IsGlobal", depth)?.unwrap_or(false);

		let existing = if is_shared && from_field {
			if is_global { self.ctx.globals.and_then(|globals| globals.get_variable(&name)) } else { self.locals.get_variable(&name) }
		} else {
			None
		};

		let Some(schema) = registry.resolve_variable(&type_name) else {
			warn!(type_name = %type_name, name = %name, "unresolved variable type");
			return Ok(None);
		};

		let retyped = match existing {
			Some(existing) if existing.type_name == schema.name => return Ok(Some(existing)),
			Some(existing) => {
				debug!(name = %name, stored = %type_name, pooled = %existing.type_name, "pooled variable type differs, building a new instance");
				true
			}
			None => false,
		};

		let mut variable = SharedVariable::blank(registry, schema);
		variable.name = name;
		variable.is_shared = is_shared || retyped;
		variable.is_global = is_global;
		variable.network_sync = self.flag(scope, "NetworkSync", depth)?.unwrap_or(false);
		if !is_global {
			variable.property_mapping = self.string(scope, "PropertyMapping", depth)?;
			if let Some(Value::HostObject(owner)) = self.plain(&FieldKind::host_object("GameObject"), "PropertyMappingOwner", scope, depth)? {
				variable.property_mapping_owner = Some(owner);
			}
			if let Some(mapper) = self.ctx.property_mapper {
				mapper.initialize(&mut variable, self.ctx.options.owner);
			}
		}

		let mut fields = std::mem::take(&mut variable.fields);
		self.fields(schema, &mut fields, scope, None, depth)?;
		variable.fields = fields;
		Ok(Some(Arc::new(variable)))
	}
}

#[cfg(test)]
mod tests;
