use tracing::{debug, warn};

use crate::tree::decode::{Session, Wiring, wire_parents};
use crate::tree::keys::{CurrentKeys, KeyScheme, LegacyKeys};
use crate::tree::{DecodeContext, Document, FieldLayout, GlobalVariables, IndexMap, Result, TaskData, VariableData};

/// On-disk layout family of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
	/// Name-keyed rows, big-endian integers.
	Legacy,
	/// Hash-keyed rows with an optional index map, little-endian integers.
	Current {
		/// Collection element hashes are divided by the element position.
		per_element_hash: bool,
	},
}

impl FormatVersion {
	/// First writer version that divides element hashes by position.
	pub const PER_ELEMENT_HASH_SINCE: &'static str = "1.5.7";

	/// Route a tree document by its version tag.
	///
	/// Tags compare as plain strings.
	pub fn for_tree(version: &str) -> Self {
		if version.is_empty() {
			return Self::Legacy;
		}
		Self::Current {
			per_element_hash: version >= Self::PER_ELEMENT_HASH_SINCE,
		}
	}

	/// Route a global-variable document; name-keyed rows force the legacy decoder.
	pub fn for_globals(version: &str, layout: &FieldLayout) -> Self {
		if layout.is_name_keyed() {
			return Self::Legacy;
		}
		Self::for_tree(version)
	}

	/// Version tag an encoder writes for this format.
	pub fn version_tag(self) -> &'static str {
		match self {
			Self::Legacy => "",
			Self::Current { per_element_hash: true } => Self::PER_ELEMENT_HASH_SINCE,
			Self::Current { per_element_hash: false } => "1.5.6",
		}
	}

	/// Return stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Legacy => "legacy",
			Self::Current { per_element_hash: true } => "current",
			Self::Current { per_element_hash: false } => "current-shared-element-hash",
		}
	}
}

/// Decode a tree document, routing on its version tag.
pub fn decode_tree(data: &TaskData, ctx: &DecodeContext<'_>) -> Result<Document> {
	decode_tree_as(data, FormatVersion::for_tree(&data.version), ctx)
}

/// Decode a tree document with an explicit format.
pub fn decode_tree_as(data: &TaskData, format: FormatVersion, ctx: &DecodeContext<'_>) -> Result<Document> {
	match format {
		FormatVersion::Legacy => tree_with(LegacyKeys::new(), data, ctx),
		FormatVersion::Current { per_element_hash } => tree_with(CurrentKeys::new(IndexMap::build(&data.layout)?, per_element_hash), data, ctx),
	}
}

fn tree_with<K: KeyScheme>(keys: K, data: &TaskData, ctx: &DecodeContext<'_>) -> Result<Document> {
	let mut doc = Document::new(ctx.options.owner);
	if data.layout.bytes.is_empty() {
		debug!("empty field blob, nothing to decode");
		return Ok(doc);
	}

	let mut session = Session::new(ctx, &data.layout, keys);
	for index in 0..data.variable_start_index.len() {
		if let Some(variable) = session.variable(data.variable_rows(index)?)? {
			session.push_local(variable);
		}
	}
	for index in 0..data.types.len() {
		session.node(data, index)?;
	}

	let (mut nodes, pending, variables) = session.finish();
	doc.variables = variables;
	if data.parent_index.len() != nodes.len() {
		warn!(parents = data.parent_index.len(), nodes = nodes.len(), "parent index count mismatch, dropping node structure");
		return Ok(doc);
	}

	let Wiring { entry, root, detached } = wire_parents(&data.parent_index, &mut nodes)?;
	debug!(fields = pending.len(), "resolving node links");
	pending.resolve(&mut nodes)?;

	doc.nodes = nodes;
	doc.entry = entry;
	doc.root = root;
	doc.detached = detached;
	debug!(decoder = K::DECODER, nodes = doc.nodes.len(), variables = doc.variables.len(), "decoded tree");
	Ok(doc)
}

/// Decode a global-variable document, routing on its version tag and row keys.
pub fn decode_globals(data: &VariableData, ctx: &DecodeContext<'_>) -> Result<GlobalVariables> {
	decode_globals_as(data, FormatVersion::for_globals(&data.version, &data.layout), ctx)
}

/// Decode a global-variable document with an explicit format.
pub fn decode_globals_as(data: &VariableData, format: FormatVersion, ctx: &DecodeContext<'_>) -> Result<GlobalVariables> {
	match format {
		FormatVersion::Legacy => globals_with(LegacyKeys::new(), data, ctx),
		FormatVersion::Current { per_element_hash } => globals_with(CurrentKeys::new(IndexMap::build(&data.layout)?, per_element_hash), data, ctx),
	}
}

fn globals_with<K: KeyScheme>(keys: K, data: &VariableData, ctx: &DecodeContext<'_>) -> Result<GlobalVariables> {
	let mut globals = GlobalVariables::default();
	if data.layout.bytes.is_empty() {
		debug!("empty global variable blob");
		return Ok(globals);
	}

	let mut session = Session::new(ctx, &data.layout, keys);
	for index in 0..data.variable_start_index.len() {
		if let Some(variable) = session.variable(data.variable_rows(index)?)? {
			globals.variables.push(variable);
		}
	}
	debug!(decoder = K::DECODER, variables = globals.variables.len(), "decoded global variables");
	Ok(globals)
}

#[cfg(test)]
mod tests;
