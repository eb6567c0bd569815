use std::sync::Arc;

use crate::tree::value::{find_field, set_field};
use crate::tree::{DecodeError, FieldLayout, FieldValue, HostObject, Registry, Result, SharedVariable, Value, VariableSource, Vector2};

/// Position of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Identity of the host object that owns a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OwnerId(pub u64);

/// Typed link from a field to a node, possibly in another document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeLink {
	/// Owner of the document holding the target.
	pub owner: OwnerId,
	/// Arena position of the target in that document.
	pub node: NodeId,
	/// Target's reference id, stable across re-linking.
	pub reference_id: i32,
}

/// Editor-only node presentation data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMeta {
	/// Canvas offset.
	pub offset: Vector2,
	/// Free-form comment.
	pub comment: String,
	/// Breakpoint flag.
	pub is_breakpoint: bool,
	/// Collapsed flag.
	pub collapsed: bool,
	/// Color palette index.
	pub color_index: i32,
	/// Watched field names, restricted to fields the node type declares.
	pub watched_fields: Vec<Box<str>>,
}

/// Raw field rows of a node whose type could not be resolved.
///
/// Every table is rebased so row 0, slot 0, and byte 0 are this node's first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnknownPayload {
	/// Legacy per-row keys.
	pub type_names: Vec<String>,
	/// Current-format per-row hashes.
	pub name_hashes: Vec<i32>,
	/// Row to data slot table.
	pub start_index: Vec<i32>,
	/// Data slot to byte offset table.
	pub data_position: Vec<i32>,
	/// Node bytes through the start of the next node.
	pub bytes: Vec<u8>,
	/// Index map entries whose slots fall inside this node.
	pub index_entries: Vec<(String, i32)>,
	/// Host object table of the source document.
	pub objects: Vec<HostObject>,
}

impl UnknownPayload {
	/// Standalone layout that the format indexers and decoders accept.
	pub fn to_layout(&self) -> FieldLayout {
		let (index_keys, index_values) = self.index_entries.iter().cloned().unzip();
		FieldLayout {
			type_names: self.type_names.clone(),
			name_hashes: self.name_hashes.clone(),
			start_index: self.start_index.clone(),
			data_position: self.data_position.clone(),
			bytes: self.bytes.clone(),
			index_keys,
			index_values,
			objects: self.objects.clone(),
		}
	}

	/// Number of rows captured.
	pub fn row_count(&self) -> usize {
		self.start_index.len()
	}
}

/// Structural variant of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeShape {
	/// Node without children.
	Leaf,
	/// Node with ordered children.
	Composite {
		/// Children in stored order.
		children: Vec<NodeId>,
	},
	/// Placeholder for an unresolved node type.
	Unknown {
		/// Whether another node names this one as parent.
		is_parent: bool,
		/// Children, populated only when `is_parent`.
		children: Vec<NodeId>,
		/// Captured raw rows.
		payload: Box<UnknownPayload>,
	},
}

/// Decoded tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
	/// Stored type name, kept verbatim for unresolved types.
	pub type_name: Box<str>,
	/// Stored node id.
	pub id: i32,
	/// Display name.
	pub friendly_name: String,
	/// Instant execution flag.
	pub is_instant: bool,
	/// Disabled flag.
	pub disabled: bool,
	/// Id used to re-link references across documents.
	pub reference_id: i32,
	/// Owner of the document holding this node.
	pub owner: OwnerId,
	/// Editor presentation data.
	pub meta: Option<NodeMeta>,
	/// Declared fields.
	pub fields: Vec<FieldValue>,
	/// Structural variant.
	pub shape: NodeShape,
}

impl Node {
	/// Look up a field by name.
	pub fn field(&self, name: &str) -> Option<&Value> {
		find_field(&self.fields, name)
	}

	/// Replace or append a field value.
	pub fn set_field(&mut self, name: &str, value: Value) {
		set_field(&mut self.fields, name, value);
	}

	/// Children for composite nodes and unknown parent placeholders.
	pub fn children(&self) -> &[NodeId] {
		match &self.shape {
			NodeShape::Composite { children } => children,
			NodeShape::Unknown { is_parent: true, children, .. } => children,
			_ => &[],
		}
	}

	pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
		match &mut self.shape {
			NodeShape::Composite { children } => Some(children),
			NodeShape::Unknown { is_parent: true, children, .. } => Some(children),
			_ => None,
		}
	}

	/// Whether the node type was unresolved.
	pub fn is_unknown(&self) -> bool {
		matches!(self.shape, NodeShape::Unknown { .. })
	}

	/// Captured rows of an unresolved node.
	pub fn unknown_payload(&self) -> Option<&UnknownPayload> {
		match &self.shape {
			NodeShape::Unknown { payload, .. } => Some(payload),
			_ => None,
		}
	}
}

/// Decoded behavior tree: node arena, entry, root, detached nodes, variables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
	/// Owner of this document.
	pub owner: OwnerId,
	/// Node arena in stored order.
	pub nodes: Vec<Node>,
	/// Entry node.
	pub entry: Option<NodeId>,
	/// Root node, the entry's child.
	pub root: Option<NodeId>,
	/// Parentless nodes other than the entry.
	pub detached: Vec<NodeId>,
	/// Document-level variables.
	pub variables: Vec<Arc<SharedVariable>>,
}

impl Document {
	/// Empty document.
	pub fn new(owner: OwnerId) -> Self {
		Self { owner, ..Self::default() }
	}

	/// Borrow a node.
	pub fn node(&self, id: NodeId) -> Result<&Node> {
		let len = self.nodes.len();
		self.nodes.get(id.0).ok_or(DecodeError::NodeIndexOutOfRange { index: id.0, len })
	}

	/// Mutably borrow a node.
	pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
		let len = self.nodes.len();
		self.nodes.get_mut(id.0).ok_or(DecodeError::NodeIndexOutOfRange { index: id.0, len })
	}

	/// Link to a node of this document.
	pub fn link(&self, id: NodeId) -> Result<NodeLink> {
		let node = self.node(id)?;
		Ok(NodeLink {
			owner: node.owner,
			node: id,
			reference_id: node.reference_id,
		})
	}

	/// Append a default-constructed node of a registered task type.
	///
	/// The first node appended before any entry becomes the entry; nodes appended
	/// afterwards stay detached until attached with [`Document::set_root`] or
	/// [`Document::add_child`].
	pub fn add_node(&mut self, registry: &Registry, type_name: &str) -> Result<NodeId> {
		let schema = registry
			.resolve_task(type_name)
			.ok_or_else(|| DecodeError::UnknownSchema { name: type_name.to_owned() })?;
		let id = NodeId(self.nodes.len());
		let shape = if registry.is_composite(schema) { NodeShape::Composite { children: Vec::new() } } else { NodeShape::Leaf };
		self.nodes.push(Node {
			type_name: schema.name.clone(),
			id: id.0 as i32,
			friendly_name: schema.short_name().to_owned(),
			is_instant: true,
			disabled: schema.disabled_by_default,
			reference_id: id.0 as i32,
			owner: self.owner,
			meta: None,
			fields: registry.default_fields(schema),
			shape,
		});
		if self.entry.is_none() {
			self.entry = Some(id);
		} else {
			self.detached.push(id);
		}
		Ok(id)
	}

	/// Attach a detached node as the root.
	pub fn set_root(&mut self, id: NodeId) -> Result<()> {
		self.node(id)?;
		self.detached.retain(|item| *item != id);
		self.root = Some(id);
		Ok(())
	}

	/// Attach a detached node as the last child of `parent`.
	pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
		self.node(child)?;
		let type_name = self.node(parent)?.type_name.to_string();
		let children = self.node_mut(parent)?.children_mut().ok_or(DecodeError::SchemaCategoryMismatch {
			name: type_name,
			expected: "parent task",
			found: "task",
		})?;
		children.push(child);
		self.detached.retain(|item| *item != child);
		Ok(())
	}

	/// Find a node by its stored id, searching the root subtree then each detached subtree.
	pub fn find_by_id(&self, id: i32) -> Option<NodeId> {
		self.root
			.into_iter()
			.chain(self.detached.iter().copied())
			.flat_map(|start| self.preorder(start))
			.find(|found| self.nodes.get(found.0).is_some_and(|node| node.id == id))
	}

	/// Stored parent position of every node, as the container writes it.
	pub fn parent_indices(&self) -> Vec<i32> {
		let mut parents = vec![-1; self.nodes.len()];
		if let Some(root) = self.root
			&& let Some(slot) = parents.get_mut(root.0)
		{
			*slot = 0;
		}
		for (idx, node) in self.nodes.iter().enumerate() {
			for child in node.children() {
				if let Some(slot) = parents.get_mut(child.0) {
					*slot = idx as i32;
				}
			}
		}
		parents
	}

	/// Nodes reachable from `start` in pre-order, each visited once.
	pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
		let mut seen = vec![false; self.nodes.len()];
		let mut out = Vec::new();
		let mut stack = vec![start];
		while let Some(id) = stack.pop() {
			let Some(node) = self.nodes.get(id.0) else {
				continue;
			};
			if std::mem::replace(&mut seen[id.0], true) {
				continue;
			}
			out.push(id);
			stack.extend(node.children().iter().rev().copied());
		}
		out
	}
}

impl VariableSource for Document {
	fn get_variable(&self, name: &str) -> Option<Arc<SharedVariable>> {
		self.variables.get_variable(name)
	}
}
