use std::path::PathBuf;

use btdoc::tree::{Document, NodeId, short_name};

use crate::cmd::util::{DecodeFlags, decode_file, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long)]
	pub globals: Option<PathBuf>,
	#[command(flatten)]
	pub decode: DecodeFlags,
}

#[derive(serde::Serialize)]
struct TreeJson {
	path: String,
	format: String,
	entry: Option<TreeNodeJson>,
	root: Option<TreeNodeJson>,
	detached: Vec<TreeNodeJson>,
}

#[derive(serde::Serialize)]
struct TreeNodeJson {
	index: usize,
	id: i32,
	#[serde(rename = "type")]
	type_name: String,
	name: String,
	disabled: bool,
	unknown: bool,
	children: Vec<TreeNodeJson>,
}

/// Print entry, root subtree and detached subtrees of a decoded document.
pub fn run(args: Args) -> btdoc::tree::Result<()> {
	let Args { file: path, json, globals, decode } = args;
	let decoded = decode_file(&path, globals.as_deref(), &decode)?;
	let doc = &decoded.doc;

	if json {
		let mut seen = vec![false; doc.nodes.len()];
		let payload = TreeJson {
			path: path.display().to_string(),
			format: decoded.format.as_str().to_owned(),
			entry: doc.entry.and_then(|id| subtree_json(doc, id, &mut seen)),
			root: doc.root.and_then(|id| subtree_json(doc, id, &mut seen)),
			detached: doc.detached.iter().filter_map(|id| subtree_json(doc, *id, &mut seen)).collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("format: {}", decoded.format.as_str());
	if let Some(entry) = doc.entry {
		println!("entry: {}", node_label(doc, entry));
	}
	match doc.root {
		Some(root) => {
			println!("root:");
			print_subtree(doc, root);
		}
		None => println!("root: -"),
	}
	if !doc.detached.is_empty() {
		println!("detached:");
		for id in &doc.detached {
			print_subtree(doc, *id);
		}
	}
	Ok(())
}

fn subtree_json(doc: &Document, id: NodeId, seen: &mut [bool]) -> Option<TreeNodeJson> {
	let node = doc.nodes.get(id.0)?;
	if std::mem::replace(seen.get_mut(id.0)?, true) {
		return None;
	}
	Some(TreeNodeJson {
		index: id.0,
		id: node.id,
		type_name: short_name(&node.type_name).to_owned(),
		name: node.friendly_name.clone(),
		disabled: node.disabled,
		unknown: node.is_unknown(),
		children: node.children().iter().filter_map(|child| subtree_json(doc, *child, seen)).collect(),
	})
}

fn print_subtree(doc: &Document, start: NodeId) {
	let mut stack = vec![(start, 1_usize)];
	let mut seen = vec![false; doc.nodes.len()];
	while let Some((id, depth)) = stack.pop() {
		let Some(node) = doc.nodes.get(id.0) else {
			continue;
		};
		if std::mem::replace(&mut seen[id.0], true) {
			continue;
		}
		println!("{}{}", "  ".repeat(depth), node_label(doc, id));
		stack.extend(node.children().iter().rev().map(|child| (*child, depth + 1)));
	}
}

fn node_label(doc: &Document, id: NodeId) -> String {
	let Some(node) = doc.nodes.get(id.0) else {
		return format!("[{}] <missing>", id.0);
	};
	let mut label = format!("[{}] {} {:?}", id.0, short_name(&node.type_name), node.friendly_name);
	if node.is_unknown() {
		label.push_str(" (unknown)");
	}
	if node.disabled {
		label.push_str(" (disabled)");
	}
	label
}
