use std::path::PathBuf;
use std::sync::Arc;

use btdoc::tree::{Registry, SharedVariable};

use crate::cmd::util::{DecodeFlags, decode_file, emit_json, open_globals, render_variable, variable_json};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long)]
	pub globals: Option<PathBuf>,
	/// Read the file as a global variable document.
	#[arg(long = "as-globals", conflicts_with = "globals")]
	pub as_globals: bool,
	#[command(flatten)]
	pub decode: DecodeFlags,
}

#[derive(serde::Serialize)]
struct VarsJson {
	path: String,
	source: &'static str,
	variables: Vec<serde_json::Value>,
}

/// List the variables of a tree document or of a global variable document.
pub fn run(args: Args) -> btdoc::tree::Result<()> {
	let Args {
		file: path,
		json,
		globals,
		as_globals,
		decode,
	} = args;

	let (source, variables): (&'static str, Vec<Arc<SharedVariable>>) = if as_globals {
		let registry = Registry::standard();
		("globals", open_globals(&path, &registry, decode.options())?.variables)
	} else {
		("document", decode_file(&path, globals.as_deref(), &decode)?.doc.variables)
	};

	if json {
		let payload = VarsJson {
			path: path.display().to_string(),
			source,
			variables: variables.iter().map(|variable| variable_json(variable)).collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("source: {source}");
	println!("variables: {}", variables.len());
	for variable in &variables {
		let mut flags = Vec::new();
		if variable.is_global {
			flags.push("global");
		}
		if variable.network_sync {
			flags.push("network");
		}
		if flags.is_empty() {
			println!("  {}", render_variable(variable));
		} else {
			println!("  {} [{}]", render_variable(variable), flags.join(", "));
		}
	}
	Ok(())
}
