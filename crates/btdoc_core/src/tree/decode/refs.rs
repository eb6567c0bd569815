use std::collections::HashMap;

use tracing::{trace, warn};

use crate::tree::value::{find_field_mut, set_field};
use crate::tree::{DecodeError, FieldKind, FieldValue, Node, NodeId, NodeLink, Result, Value};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum PathSeg {
	Field(Box<str>),
	Index(usize),
}

/// Location of a field inside a node, through nested objects and collection elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FieldPath {
	pub(crate) node: NodeId,
	pub(crate) segs: Vec<PathSeg>,
}

impl FieldPath {
	pub(crate) fn root(node: NodeId) -> Self {
		Self { node, segs: Vec::new() }
	}

	pub(crate) fn child(&self, name: &str) -> Self {
		self.with(PathSeg::Field(name.into()))
	}

	pub(crate) fn child_index(&self, idx: usize) -> Self {
		self.with(PathSeg::Index(idx))
	}

	fn with(&self, seg: PathSeg) -> Self {
		let mut segs = self.segs.clone();
		segs.push(seg);
		Self { node: self.node, segs }
	}
}

/// Static shape of a field holding node links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefShape {
	Single,
	Array,
	List,
}

/// Field that receives resolved node links.
#[derive(Debug, Clone)]
pub(crate) struct RefOwner {
	pub(crate) at: FieldPath,
	pub(crate) shape: RefShape,
}

impl RefOwner {
	pub(crate) fn new(at: FieldPath, kind: &FieldKind) -> Self {
		let shape = match kind {
			FieldKind::Array(_) => RefShape::Array,
			FieldKind::List(_) => RefShape::List,
			_ => RefShape::Single,
		};
		Self { at, shape }
	}

	/// Owner for links inside element `idx` of this collection field.
	pub(crate) fn element(&self, idx: usize) -> Self {
		Self {
			at: self.at.child_index(idx),
			shape: RefShape::Single,
		}
	}
}

/// Stored node ids collected per owning field, in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct PendingRefs {
	entries: Vec<(RefOwner, Vec<i32>)>,
	positions: HashMap<FieldPath, usize>,
}

impl PendingRefs {
	pub(crate) fn push(&mut self, owner: &RefOwner, id: i32) {
		match self.positions.get(&owner.at) {
			Some(pos) => self.entries[*pos].1.push(id),
			None => {
				self.positions.insert(owner.at.clone(), self.entries.len());
				self.entries.push((owner.clone(), vec![id]));
			}
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}

	/// Assign every collected id list to its owning field.
	pub(crate) fn resolve(self, nodes: &mut [Node]) -> Result<()> {
		for (owner, ids) in self.entries {
			let links = ids.iter().map(|id| link_to(nodes, *id)).collect::<Result<Vec<_>>>()?;
			let value = match owner.shape {
				RefShape::Single => match links.first() {
					Some(link) => Value::Node(*link),
					None => continue,
				},
				RefShape::Array => Value::Array(links.into_iter().map(Value::Node).collect()),
				RefShape::List => Value::List(links.into_iter().map(Value::Node).collect()),
			};
			let len = nodes.len();
			let node = nodes.get_mut(owner.at.node.0).ok_or(DecodeError::NodeIndexOutOfRange {
				index: owner.at.node.0,
				len,
			})?;
			if !assign(&mut node.fields, &owner.at.segs, value) {
				trace!(node = owner.at.node.0, path = ?owner.at.segs, "link target field not reachable");
			}
		}
		Ok(())
	}
}

fn link_to(nodes: &[Node], id: i32) -> Result<NodeLink> {
	let len = nodes.len();
	let (idx, node) = usize::try_from(id)
		.ok()
		.and_then(|idx| nodes.get(idx).map(|node| (idx, node)))
		.ok_or(DecodeError::DanglingNodeRef { id, len })?;
	Ok(NodeLink {
		owner: node.owner,
		node: NodeId(idx),
		reference_id: node.reference_id,
	})
}

fn assign(fields: &mut Vec<FieldValue>, path: &[PathSeg], value: Value) -> bool {
	match path {
		[PathSeg::Field(last)] => {
			set_field(fields, last, value);
			true
		}
		[PathSeg::Field(name), rest @ ..] => match find_field_mut(fields, name) {
			Some(inner) => assign_in(inner, rest, value),
			None => false,
		},
		_ => false,
	}
}

fn assign_in(target: &mut Value, path: &[PathSeg], value: Value) -> bool {
	match (target, path) {
		(Value::Object(object), [PathSeg::Field(_), ..]) => assign(&mut object.fields, path, value),
		(Value::Array(items) | Value::List(items), [PathSeg::Index(idx), rest @ ..]) => match items.get_mut(*idx) {
			Some(item) => assign_in(item, rest, value),
			None => false,
		},
		_ => false,
	}
}

/// Entry, root, and detached nodes derived from stored parent positions.
#[derive(Debug, Default)]
pub(crate) struct Wiring {
	pub(crate) entry: Option<NodeId>,
	pub(crate) root: Option<NodeId>,
	pub(crate) detached: Vec<NodeId>,
}

/// Attach children to parents; `-1` marks entry then detached nodes, `0` the root.
pub(crate) fn wire_parents(parents: &[i32], nodes: &mut [Node]) -> Result<Wiring> {
	let len = nodes.len();
	let mut wiring = Wiring::default();
	for (index, parent) in parents.iter().copied().enumerate() {
		let id = NodeId(index);
		match parent {
			-1 if wiring.entry.is_none() => wiring.entry = Some(id),
			-1 => wiring.detached.push(id),
			0 => wiring.root = Some(id),
			raw => {
				let target = usize::try_from(raw)
					.ok()
					.filter(|target| *target < len)
					.ok_or(DecodeError::ParentOutOfRange { index, parent: raw, len })?;
				match nodes[target].children_mut() {
					Some(children) => children.push(id),
					None => {
						warn!(index, parent = raw, "parent cannot hold children, node left detached");
						wiring.detached.push(id);
					}
				}
			}
		}
	}
	Ok(wiring)
}
