use tracing::{debug, trace};

use crate::tree::{Document, FieldValue, NodeId, NodeLink, OwnerId, Value};

/// Re-resolve node links that point into other documents.
///
/// Single links owned by another document are looked up by reference id in
/// `task_list` and keep their old target when nothing matches. Every link of
/// a node-link collection is looked up regardless of owner, and unmatched
/// entries are dropped. Inline node objects are searched one level deep.
/// Returns the number of links rewritten or dropped.
pub fn relink_foreign(doc: &mut Document, task_list: &[NodeLink]) -> usize {
	let owner = doc.owner;
	let mut changed = 0;
	for node in &mut doc.nodes {
		changed += relink_fields(&mut node.fields, owner, task_list);
		for field in &mut node.fields {
			if let Value::Object(object) = &mut field.value {
				changed += relink_fields(&mut object.fields, owner, task_list);
			}
		}
	}
	debug!(changed, candidates = task_list.len(), "relinked foreign node references");
	changed
}

fn relink_fields(fields: &mut [FieldValue], owner: OwnerId, task_list: &[NodeLink]) -> usize {
	let mut changed = 0;
	for field in fields {
		match &mut field.value {
			Value::Node(link) if link.owner != owner => {
				if let Some(found) = find_referenced(task_list, link.reference_id) {
					changed += usize::from(*link != found);
					*link = found;
				} else {
					trace!(field = %field.name, reference_id = link.reference_id, "foreign link target not found, keeping it");
				}
			}
			Value::Array(items) | Value::List(items) if items.iter().any(|item| matches!(item, Value::Node(_))) => {
				let before = items.len();
				let mut rewritten = 0;
				items.retain_mut(|item| match item {
					Value::Node(link) => match find_referenced(task_list, link.reference_id) {
						Some(found) => {
							rewritten += usize::from(*link != found);
							*link = found;
							true
						}
						None => false,
					},
					_ => true,
				});
				changed += rewritten + (before - items.len());
			}
			_ => {}
		}
	}
	changed
}

fn find_referenced(task_list: &[NodeLink], reference_id: i32) -> Option<NodeLink> {
	task_list.iter().find(|link| link.reference_id == reference_id).copied()
}

/// Re-point node links at the node of `doc` carrying the same stored id.
///
/// `source` is the document the links currently point into, usually the one
/// `doc` was copied from. Only nodes reachable from the root or a detached
/// subtree are visited. Single links whose id has no match keep their old
/// target; unmatched collection entries are dropped. Returns the number of
/// links rewritten or dropped.
pub fn relink_by_id(doc: &mut Document, source: &Document) -> usize {
	let reachable: Vec<NodeId> = doc.root.into_iter().chain(doc.detached.iter().copied()).flat_map(|start| doc.preorder(start)).collect();
	let mut changed = 0;
	for id in reachable {
		let Some(node) = doc.nodes.get_mut(id.0) else {
			continue;
		};
		let mut fields = std::mem::take(&mut node.fields);
		changed += rewrite_links(&mut fields, |link| matching_link(&*doc, source, link));
		if let Some(node) = doc.nodes.get_mut(id.0) {
			node.fields = fields;
		}
	}
	debug!(changed, "relinked node references by stored id");
	changed
}

fn matching_link(doc: &Document, source: &Document, link: &NodeLink) -> Option<NodeLink> {
	if link.owner != source.owner {
		return None;
	}
	let stored = source.nodes.get(link.node.0)?.id;
	doc.find_by_id(stored).and_then(|found| doc.link(found).ok())
}

fn rewrite_links(fields: &mut [FieldValue], lookup: impl Fn(&NodeLink) -> Option<NodeLink>) -> usize {
	let mut changed = 0;
	for field in fields {
		match &mut field.value {
			Value::Node(link) => match lookup(link) {
				Some(found) => {
					changed += usize::from(*link != found);
					*link = found;
				}
				None => trace!(field = %field.name, node = link.node.0, "no node with a matching id, keeping link"),
			},
			Value::Array(items) | Value::List(items) if items.iter().any(|item| matches!(item, Value::Node(_))) => {
				let before = items.len();
				let mut rewritten = 0;
				items.retain_mut(|item| match item {
					Value::Node(link) => match lookup(link) {
						Some(found) => {
							rewritten += usize::from(*link != found);
							*link = found;
							true
						}
						None => false,
					},
					_ => true,
				});
				changed += rewritten + (before - items.len());
			}
			_ => {}
		}
	}
	changed
}
