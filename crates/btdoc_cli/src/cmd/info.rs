use std::path::PathBuf;

use crate::cmd::util::{DecodeFlags, decode_file, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[command(flatten)]
	pub decode: DecodeFlags,
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	name: String,
	description: String,
	version: String,
	format: String,
	compression: String,
	types: usize,
	nodes: usize,
	detached: usize,
	unknown_nodes: usize,
	variables: usize,
	rows: usize,
	slots: usize,
	bytes: usize,
	index_keys: usize,
}

/// Print container summary and decoded counts.
pub fn run(args: Args) -> btdoc::tree::Result<()> {
	let Args { file: path, json, decode } = args;
	let decoded = decode_file(&path, None, &decode)?;
	let data = &decoded.file.task_data;
	let layout = &data.layout;

	let payload = InfoJson {
		path: path.display().to_string(),
		name: decoded.file.name.clone(),
		description: decoded.file.description.clone(),
		version: data.version.clone(),
		format: decoded.format.as_str().to_owned(),
		compression: decoded.file.compression.as_str().to_owned(),
		types: data.types.len(),
		nodes: decoded.doc.nodes.len(),
		detached: decoded.doc.detached.len(),
		unknown_nodes: decoded.doc.nodes.iter().filter(|node| node.is_unknown()).count(),
		variables: decoded.doc.variables.len(),
		rows: layout.row_count(),
		slots: layout.slot_count(),
		bytes: layout.bytes.len(),
		index_keys: layout.index_keys.len(),
	};

	if json {
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", payload.path);
	println!("name: {}", payload.name);
	println!("description: {}", payload.description);
	println!("version: {}", if payload.version.is_empty() { "-" } else { &payload.version });
	println!("format: {}", payload.format);
	println!("compression: {}", payload.compression);
	println!("types: {}", payload.types);
	println!("nodes: {} ({} detached, {} unknown)", payload.nodes, payload.detached, payload.unknown_nodes);
	println!("variables: {}", payload.variables);
	println!("rows: {}", payload.rows);
	println!("slots: {}", payload.slots);
	println!("bytes: {}", payload.bytes);
	println!("index_keys: {}", payload.index_keys);
	Ok(())
}
