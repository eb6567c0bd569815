use std::collections::HashMap;
use std::path::PathBuf;

use btdoc::tree::{BehaviorFile, FieldLayout, Result};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	/// Only rows of this node.
	#[arg(long)]
	pub node: Option<usize>,
	#[arg(long)]
	pub json: bool,
}

#[derive(serde::Serialize)]
struct LayoutJson {
	path: String,
	version: String,
	node: Option<usize>,
	rows: Vec<RowJson>,
}

#[derive(serde::Serialize)]
struct RowJson {
	row: usize,
	slot: usize,
	offset: usize,
	size: usize,
	key: Option<String>,
	hash: Option<i32>,
}

/// Dump field layout rows of a whole document or of one node.
pub fn run(args: Args) -> Result<()> {
	let Args { file: path, node, json } = args;

	let file = BehaviorFile::open(&path)?;
	let data = &file.task_data;
	let range = match node {
		Some(index) => data.node_rows(index)?,
		None => 0..data.layout.row_count(),
	};
	let keys = index_keys_by_slot(&data.layout);
	let rows = range.map(|row| row_info(&data.layout, &keys, row)).collect::<Result<Vec<_>>>()?;

	if json {
		let payload = LayoutJson {
			path: path.display().to_string(),
			version: data.version.clone(),
			node,
			rows,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("rows: {}", rows.len());
	println!("row\tslot\toffset\tsize\thash\tkey");
	for row in &rows {
		let hash = row.hash.map(|hash| hash.to_string()).unwrap_or_else(|| "-".to_owned());
		println!("{}\t{}\t{}\t{}\t{}\t{}", row.row, row.slot, row.offset, row.size, hash, row.key.as_deref().unwrap_or("-"));
	}
	Ok(())
}

fn row_info(layout: &FieldLayout, keys: &HashMap<usize, &str>, row: usize) -> Result<RowJson> {
	let slot = layout.slot_of_row(row)?;
	let key = match layout.type_names.get(row) {
		Some(name) => Some(name.clone()),
		None => keys.get(&slot).map(|key| (*key).to_owned()),
	};
	Ok(RowJson {
		row,
		slot,
		offset: layout.offset_of_slot(slot)?,
		size: layout.field_size(slot)?,
		key,
		hash: layout.name_hashes.get(row).copied(),
	})
}

fn index_keys_by_slot(layout: &FieldLayout) -> HashMap<usize, &str> {
	let mut out = HashMap::new();
	for (key, slot) in layout.index_keys.iter().zip(&layout.index_values) {
		if let Ok(slot) = usize::try_from(*slot) {
			out.entry(slot).or_insert(key.as_str());
		}
	}
	out
}
