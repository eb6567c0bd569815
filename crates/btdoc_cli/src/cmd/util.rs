use std::path::Path;

use btdoc::tree::{
	BehaviorFile, DecodeContext, DecodeOptions, Document, FormatVersion, GlobalVariables, Registry, Result, SharedVariable, Value, VariableData, decode_globals, decode_tree_as,
	short_name,
};
use serde_json::json;

/// Decode switches shared by every command that decodes a document.
#[derive(clap::Args, Clone)]
pub struct DecodeFlags {
	/// Fail on unregistered node types instead of keeping placeholders.
	#[arg(long = "strict-types")]
	pub strict_types: bool,
	/// Skip editor node metadata.
	#[arg(long = "no-meta")]
	pub no_meta: bool,
	/// Nesting ceiling for objects and collections.
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

impl DecodeFlags {
	/// Inspection preset adjusted by the command-line switches.
	pub(crate) fn options(&self) -> DecodeOptions {
		let mut options = DecodeOptions::for_inspect();
		options.strict_types = self.strict_types;
		options.include_node_meta = !self.no_meta;
		if let Some(max_depth) = self.max_depth {
			options.max_depth = max_depth;
		}
		options
	}
}

/// Container plus its decoded tree.
pub(crate) struct Decoded {
	pub file: BehaviorFile,
	pub format: FormatVersion,
	pub doc: Document,
}

/// Open and decode a tree container, optionally resolving globals from a second container.
pub(crate) fn decode_file(path: &Path, globals: Option<&Path>, flags: &DecodeFlags) -> Result<Decoded> {
	let registry = Registry::standard();
	let options = flags.options();
	let globals = match globals {
		Some(globals) => Some(open_globals(globals, &registry, options.clone())?),
		None => None,
	};

	let file = BehaviorFile::open(path)?;
	let mut ctx = DecodeContext::new(&registry).with_options(options);
	if let Some(globals) = &globals {
		ctx = ctx.with_globals(globals);
	}
	let format = FormatVersion::for_tree(&file.task_data.version);
	let doc = decode_tree_as(&file.task_data, format, &ctx)?;
	Ok(Decoded { file, format, doc })
}

/// Open a container holding a global variable document.
pub(crate) fn open_globals(path: &Path, registry: &Registry, options: DecodeOptions) -> Result<GlobalVariables> {
	let file = BehaviorFile::open(path)?;
	let ctx = DecodeContext::new(registry).with_options(options);
	decode_globals(&VariableData::from(file.task_data), &ctx)
}

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to encode json: {err}"),
	}
}

/// Convert a decoded value into a JSON tree.
pub(crate) fn value_json(value: &Value) -> serde_json::Value {
	match value {
		Value::Null => serde_json::Value::Null,
		Value::Bool(flag) => json!(flag),
		Value::Byte(byte) => json!(byte),
		Value::Int(number) | Value::LayerMask(number) => json!(number),
		Value::UInt(number) => json!(number),
		Value::Long(number) => json!(number),
		Value::Float(number) => json!(number),
		Value::Double(number) => json!(number),
		Value::String(text) => json!(text),
		Value::Vector2(v) => json!([v.x, v.y]),
		Value::Vector3(v) => json!([v.x, v.y, v.z]),
		Value::Vector4(v) | Value::Quaternion(v) => json!([v.x, v.y, v.z, v.w]),
		Value::Color(c) => json!({ "r": c.r, "g": c.g, "b": c.b, "a": c.a }),
		Value::Rect(r) => json!({ "x": r.x, "y": r.y, "width": r.width, "height": r.height }),
		Value::Matrix4x4(m) => json!(m.cells),
		Value::AnimationCurve(curve) => json!({
			"keys": curve
				.keys
				.iter()
				.map(|key| json!([key.time, key.value, key.in_tangent, key.out_tangent, key.tangent_mode]))
				.collect::<Vec<_>>(),
			"pre_wrap_mode": curve.pre_wrap_mode,
			"post_wrap_mode": curve.post_wrap_mode,
		}),
		Value::Array(items) | Value::List(items) => serde_json::Value::Array(items.iter().map(value_json).collect()),
		Value::Node(link) => json!({ "node": link.node.0, "reference_id": link.reference_id, "owner": link.owner.0 }),
		Value::Variable(variable) => variable_json(variable),
		Value::HostObject(object) => json!({ "object": object.index, "name": object.name }),
		Value::Object(object) => {
			let fields: serde_json::Map<String, serde_json::Value> = object.fields.iter().map(|field| (field.name.to_string(), value_json(&field.value))).collect();
			json!({ "type": short_name(&object.type_name), "fields": fields })
		}
	}
}

/// JSON summary of a shared variable.
pub(crate) fn variable_json(variable: &SharedVariable) -> serde_json::Value {
	json!({
		"name": variable.name,
		"type": short_name(&variable.type_name),
		"shared": variable.is_shared,
		"global": variable.is_global,
		"value": variable.value().map(value_json).unwrap_or_default(),
	})
}

/// One-line text rendering of a decoded value.
pub(crate) fn render_value(value: &Value) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::Bool(flag) => flag.to_string(),
		Value::Byte(byte) => byte.to_string(),
		Value::Int(number) => number.to_string(),
		Value::UInt(number) => number.to_string(),
		Value::Long(number) => number.to_string(),
		Value::Float(number) => number.to_string(),
		Value::Double(number) => number.to_string(),
		Value::String(text) => format!("{text:?}"),
		Value::Vector2(v) => format!("({}, {})", v.x, v.y),
		Value::Vector3(v) => format!("({}, {}, {})", v.x, v.y, v.z),
		Value::Vector4(v) | Value::Quaternion(v) => format!("({}, {}, {}, {})", v.x, v.y, v.z, v.w),
		Value::Color(c) => format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
		Value::Rect(r) => format!("rect({}, {}, {}, {})", r.x, r.y, r.width, r.height),
		Value::Matrix4x4(m) => format!("{:?}", m.cells),
		Value::AnimationCurve(curve) => format!("curve({} keys)", curve.keys.len()),
		Value::LayerMask(mask) => format!("mask(0x{mask:08x})"),
		Value::Array(items) | Value::List(items) => format!("[{}]", items.iter().map(render_value).collect::<Vec<_>>().join(", ")),
		Value::Node(link) => format!("-> [{}]", link.node.0),
		Value::Variable(variable) => render_variable(variable),
		Value::HostObject(object) => format!("object[{}] {:?}", object.index, object.name),
		Value::Object(object) => {
			let fields = object
				.fields
				.iter()
				.map(|field| format!("{}: {}", field.name, render_value(&field.value)))
				.collect::<Vec<_>>()
				.join(", ");
			format!("{} {{ {fields} }}", short_name(&object.type_name))
		}
	}
}

/// `Type(name) = value`, or `Type = value` for unnamed locals.
pub(crate) fn render_variable(variable: &SharedVariable) -> String {
	let value = variable.value().map(render_value).unwrap_or_else(|| "null".to_owned());
	let ty = short_name(&variable.type_name);
	if variable.name.is_empty() {
		format!("{ty} = {value}")
	} else {
		format!("{ty}({}) = {value}", variable.name)
	}
}
