//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use btdoc::tree::{
	BehaviorFile, Compression, Document, EncodeOptions, FormatVersion, GlobalVariables, NodeId, OwnerId, Registry, SharedVariable, TaskData, TreeEncoder, Value,
};

/// Name written into every sample container.
pub const SAMPLE_NAME: &str = "Patrol";

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Fresh scratch directory under `<target>/btdoc-scratch`, unique per call.
pub fn scratch_dir(label: &str) -> PathBuf {
	static NEXT: AtomicUsize = AtomicUsize::new(0);
	let seq = NEXT.fetch_add(1, Ordering::Relaxed);
	let dir = target_dir().join("btdoc-scratch").join(format!("{label}-{}-{seq}", std::process::id()));
	std::fs::create_dir_all(&dir).expect("create scratch dir");
	dir
}

/// Node ids of [`sample_document`].
#[derive(Debug, Clone, Copy)]
pub struct SampleNodes {
	/// Entry task.
	pub entry: NodeId,
	/// Root sequence.
	pub sequence: NodeId,
	/// Wait child bound to the `delay` variable.
	pub wait: NodeId,
	/// Log child with a local text variable.
	pub log: NodeId,
	/// Detached idle task.
	pub idle: NodeId,
}

/// Small tree: entry, a `Main` sequence with wait and log children, one detached idle task.
pub fn sample_document(registry: &Registry) -> (Document, SampleNodes) {
	let mut doc = Document::new(OwnerId(1));
	let entry = doc.add_node(registry, "EntryTask").expect("entry");
	let sequence = doc.add_node(registry, "Sequence").expect("sequence");
	let wait = doc.add_node(registry, "Wait").expect("wait");
	let log = doc.add_node(registry, "Log").expect("log");
	let idle = doc.add_node(registry, "Idle").expect("idle");
	doc.set_root(sequence).expect("root");
	doc.add_child(sequence, wait).expect("wait child");
	doc.add_child(sequence, log).expect("log child");
	doc.node_mut(sequence).expect("sequence").friendly_name = "Main".to_owned();

	let delay = Arc::new(variable(registry, "SharedFloat", "delay", Value::Float(2.5)));
	doc.variables.push(Arc::clone(&delay));
	doc.node_mut(wait).expect("wait").set_field("waitTime", Value::Variable(delay));
	doc.node_mut(log)
		.expect("log")
		.set_field("text", Value::Variable(Arc::new(variable(registry, "SharedString", "", Value::String("hello".to_owned())))));

	(doc, SampleNodes { entry, sequence, wait, log, idle })
}

/// Global pool with `speed` (float 4) and `target` (string `home`).
pub fn sample_globals(registry: &Registry) -> GlobalVariables {
	let mut speed = variable(registry, "SharedFloat", "speed", Value::Float(4.0));
	speed.is_global = true;
	let mut target = variable(registry, "SharedString", "target", Value::String("home".to_owned()));
	target.is_global = true;
	GlobalVariables {
		variables: vec![Arc::new(speed), Arc::new(target)],
	}
}

fn variable(registry: &Registry, type_name: &str, name: &str, value: Value) -> SharedVariable {
	let schema = registry.resolve_variable(type_name).expect("registered variable type");
	if name.is_empty() {
		let mut variable = SharedVariable::blank(registry, schema);
		variable.set_value(value);
		return variable;
	}
	SharedVariable::named(registry, schema, name, value)
}

/// Encode the sample document in `format`.
pub fn sample_task_data(registry: &Registry, format: FormatVersion) -> TaskData {
	let (doc, _) = sample_document(registry);
	TreeEncoder::new(registry, EncodeOptions { format, index_map: true })
		.encode_tree(&doc)
		.expect("encode sample")
}

/// Paths of the sample containers written by [`write_samples`].
#[derive(Debug, Clone)]
pub struct SampleFiles {
	/// Directory holding every sample.
	pub dir: PathBuf,
	/// Current-format tree, uncompressed.
	pub current: PathBuf,
	/// Legacy-format tree, uncompressed.
	pub legacy: PathBuf,
	/// Current-format tree, zstd-compressed.
	pub compressed: PathBuf,
	/// Current-format global variable document.
	pub globals: PathBuf,
}

/// Write every sample container into a fresh scratch directory.
pub fn write_samples() -> SampleFiles {
	let registry = Registry::standard();
	let dir = scratch_dir("samples");
	let current_format = FormatVersion::Current { per_element_hash: true };

	let mut current = BehaviorFile::new(sample_task_data(&registry, current_format));
	current.name = SAMPLE_NAME.to_owned();
	current.description = "walks between two points".to_owned();
	let legacy = BehaviorFile {
		task_data: sample_task_data(&registry, FormatVersion::Legacy),
		..current.clone()
	};
	let globals = TreeEncoder::new(&registry, EncodeOptions { format: current_format, index_map: true })
		.encode_globals(&sample_globals(&registry))
		.expect("encode globals");

	let files = SampleFiles {
		current: dir.join("current.btd"),
		legacy: dir.join("legacy.btd"),
		compressed: dir.join("current.btd.zst"),
		globals: dir.join("globals.btd"),
		dir,
	};
	current.save(&files.current, Compression::None).expect("write current");
	current.save(&files.compressed, Compression::Zstd).expect("write compressed");
	legacy.save(&files.legacy, Compression::None).expect("write legacy");
	BehaviorFile::new(TaskData::from(globals)).save(&files.globals, Compression::None).expect("write globals");
	files
}

/// Run a CLI binary and parse its stdout as JSON, failing on a non-zero exit.
pub fn run_json(bin: &str, args: &[&str]) -> serde_json::Value {
	let output = Command::new(bin).args(args).output().expect("spawn cli");
	assert!(output.status.success(), "{args:?} failed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout is json")
}
