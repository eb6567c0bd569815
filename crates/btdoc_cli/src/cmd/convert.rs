use std::path::PathBuf;

use btdoc::tree::{BehaviorFile, Compression, EncodeOptions, FormatVersion, Registry, TreeEncoder};
use tracing::info;

use crate::cmd::util::{DecodeFlags, decode_file, emit_json};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub out: PathBuf,
	/// Compress the output with zstd.
	#[arg(long)]
	pub zstd: bool,
	/// Leave the index map out of the output.
	#[arg(long = "no-index-map")]
	pub no_index_map: bool,
	#[arg(long)]
	pub json: bool,
	#[command(flatten)]
	pub decode: DecodeFlags,
}

#[derive(serde::Serialize)]
struct ConvertJson {
	input: String,
	output: String,
	from: String,
	to: String,
	nodes: usize,
	rows: usize,
	compression: String,
}

/// Decode a document and write it back in the current per-element-hash format.
pub fn run(args: Args) -> btdoc::tree::Result<()> {
	let Args {
		file: path,
		out,
		zstd,
		no_index_map,
		json,
		decode,
	} = args;

	let decoded = decode_file(&path, None, &decode)?;
	let registry = Registry::standard();
	let target = FormatVersion::Current { per_element_hash: true };
	let encoder = TreeEncoder::new(
		&registry,
		EncodeOptions {
			format: target,
			index_map: !no_index_map,
		},
	);
	let task_data = encoder.encode_tree(&decoded.doc)?;

	let compression = if zstd { Compression::Zstd } else { Compression::None };
	let file = BehaviorFile {
		task_data,
		..decoded.file
	};
	file.save(&out, compression)?;
	info!(from = decoded.format.as_str(), to = target.as_str(), path = %out.display(), "converted document");

	let payload = ConvertJson {
		input: path.display().to_string(),
		output: out.display().to_string(),
		from: decoded.format.as_str().to_owned(),
		to: target.as_str().to_owned(),
		nodes: decoded.doc.nodes.len(),
		rows: file.task_data.layout.row_count(),
		compression: compression.as_str().to_owned(),
	};
	if json {
		emit_json(&payload);
		return Ok(());
	}

	println!("input: {} ({})", payload.input, payload.from);
	println!("output: {} ({}, {})", payload.output, payload.to, payload.compression);
	println!("nodes: {}", payload.nodes);
	println!("rows: {}", payload.rows);
	Ok(())
}
