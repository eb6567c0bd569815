use std::path::PathBuf;

use btdoc::tree::{NodeId, short_name};

use crate::cmd::util::{DecodeFlags, decode_file, emit_json, render_value, value_json};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub node: usize,
	#[arg(long)]
	pub json: bool,
	#[arg(long)]
	pub globals: Option<PathBuf>,
	#[command(flatten)]
	pub decode: DecodeFlags,
}

#[derive(serde::Serialize)]
struct NodeJson {
	index: usize,
	id: i32,
	#[serde(rename = "type")]
	type_name: String,
	name: String,
	instant: bool,
	disabled: bool,
	reference_id: i32,
	unknown: bool,
	children: Vec<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	meta: Option<MetaJson>,
	fields: Vec<FieldJson>,
}

#[derive(serde::Serialize)]
struct MetaJson {
	offset: [f32; 2],
	comment: String,
	breakpoint: bool,
	collapsed: bool,
	color_index: i32,
	watched_fields: Vec<String>,
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	kind: &'static str,
	value: serde_json::Value,
}

/// Decode a document and print one node with all of its field values.
pub fn run(args: Args) -> btdoc::tree::Result<()> {
	let Args {
		file: path,
		node: index,
		json,
		globals,
		decode,
	} = args;

	let decoded = decode_file(&path, globals.as_deref(), &decode)?;
	let node = decoded.doc.node(NodeId(index))?;

	if json {
		let payload = NodeJson {
			index,
			id: node.id,
			type_name: node.type_name.to_string(),
			name: node.friendly_name.clone(),
			instant: node.is_instant,
			disabled: node.disabled,
			reference_id: node.reference_id,
			unknown: node.is_unknown(),
			children: node.children().iter().map(|child| child.0).collect(),
			meta: node.meta.as_ref().map(|meta| MetaJson {
				offset: [meta.offset.x, meta.offset.y],
				comment: meta.comment.clone(),
				breakpoint: meta.is_breakpoint,
				collapsed: meta.collapsed,
				color_index: meta.color_index,
				watched_fields: meta.watched_fields.iter().map(|name| name.to_string()).collect(),
			}),
			fields: node
				.fields
				.iter()
				.map(|field| FieldJson {
					name: field.name.to_string(),
					kind: field.value.kind_label(),
					value: value_json(&field.value),
				})
				.collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("node: [{index}] {}", node.type_name);
	println!("name: {}", node.friendly_name);
	println!("id: {}", node.id);
	println!("reference_id: {}", node.reference_id);
	println!("instant: {}", node.is_instant);
	println!("disabled: {}", node.disabled);
	if node.is_unknown() {
		println!("unknown: true");
	}
	if !node.children().is_empty() {
		let children = node.children().iter().map(|child| child.0.to_string()).collect::<Vec<_>>();
		println!("children: {}", children.join(", "));
	}
	if let Some(meta) = &node.meta {
		println!("offset: ({}, {})", meta.offset.x, meta.offset.y);
		if !meta.comment.is_empty() {
			println!("comment: {:?}", meta.comment);
		}
	}
	println!();
	println!("fields ({}):", short_name(&node.type_name));
	for field in &node.fields {
		println!("  {}: {}", field.name, render_value(&field.value));
	}
	Ok(())
}
