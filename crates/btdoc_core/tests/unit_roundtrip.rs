#![allow(missing_docs)]

use btdoc::tree::{
	AnimationCurve, Color, DecodeContext, Document, EncodeOptions, FieldKind, FieldValue, FormatVersion, Keyframe, Matrix4x4, NodeId, NodeMeta, ObjectValue, OwnerId, Rect, Registry, TreeEncoder,
	Value, Vector2, Vector3, Vector4, decode_tree, decode_tree_as,
};

const FORMATS: [FormatVersion; 3] = [
	FormatVersion::Legacy,
	FormatVersion::Current { per_element_hash: false },
	FormatVersion::Current { per_element_hash: true },
];

fn sampler_registry() -> Registry {
	Registry::builder()
		.enumeration("Game.Tasks.Mode")
		.plain("Game.Tasks.Range", |ty| ty.field("low", FieldKind::Float).field("high", FieldKind::Float))
		.task("Game.Tasks.Sampler", |ty| {
			ty.field("count", FieldKind::Int)
				.field("mask", FieldKind::UInt)
				.field("speed", FieldKind::Float)
				.field("precise", FieldKind::Double)
				.field("ticks", FieldKind::Long)
				.field("armed", FieldKind::Bool)
				.field("level", FieldKind::Byte)
				.field("label", FieldKind::String)
				.field("offset", FieldKind::Vector2)
				.field("position", FieldKind::Vector3)
				.field("tint", FieldKind::Vector4)
				.field("rotation", FieldKind::Quaternion)
				.field("color", FieldKind::Color)
				.field("area", FieldKind::Rect)
				.field("transform", FieldKind::Matrix4x4)
				.field("falloff", FieldKind::AnimationCurve)
				.field("layers", FieldKind::LayerMask)
				.field("mode", FieldKind::enumeration("Game.Tasks.Mode"))
				.field("range", FieldKind::structure("Game.Tasks.Range"))
				.field("samples", FieldKind::array(FieldKind::Float))
				.field("tags", FieldKind::list(FieldKind::String))
				.field("windows", FieldKind::array(FieldKind::structure("Game.Tasks.Range")))
				.private_field("scratch", FieldKind::Int)
		})
		.build()
}

fn range(low: f32, high: f32) -> Value {
	Value::Object(ObjectValue {
		type_name: "Game.Tasks.Range".into(),
		fields: vec![
			FieldValue {
				name: "low".into(),
				value: Value::Float(low),
			},
			FieldValue {
				name: "high".into(),
				value: Value::Float(high),
			},
		],
	})
}

fn sampler_document(registry: &Registry) -> (Document, NodeId) {
	let mut doc = Document::new(OwnerId(3));
	doc.add_node(registry, "EntryTask").expect("entry");
	let sampler = doc.add_node(registry, "Game.Tasks.Sampler").expect("sampler");
	doc.set_root(sampler).expect("root");

	let mut cells = [0.0_f32; 16];
	for (idx, cell) in cells.iter_mut().enumerate() {
		*cell = idx as f32 * 0.5;
	}
	let node = doc.node_mut(sampler).expect("sampler node");
	node.id = 41;
	node.friendly_name = "Sampler ünicode".to_owned();
	node.is_instant = false;
	node.disabled = true;
	node.meta = Some(NodeMeta {
		offset: Vector2 { x: 120.0, y: -40.5 },
		comment: "checks every field".to_owned(),
		is_breakpoint: true,
		collapsed: false,
		color_index: 3,
		watched_fields: vec!["count".into(), "label".into()],
	});
	node.set_field("count", Value::Int(-7));
	node.set_field("mask", Value::UInt(0xDEAD_BEEF));
	node.set_field("speed", Value::Float(3.25));
	node.set_field("precise", Value::Double(-1.0e-9));
	node.set_field("ticks", Value::Long(i64::MIN + 1));
	node.set_field("armed", Value::Bool(true));
	node.set_field("level", Value::Byte(200));
	node.set_field("label", Value::String("gate → yard".to_owned()));
	node.set_field("offset", Value::Vector2(Vector2 { x: 1.0, y: 2.0 }));
	node.set_field("position", Value::Vector3(Vector3 { x: 1.0, y: 2.0, z: 3.0 }));
	node.set_field("tint", Value::Vector4(Vector4 { x: 0.1, y: 0.2, z: 0.3, w: 0.4 }));
	node.set_field("rotation", Value::Quaternion(Vector4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }));
	node.set_field("color", Value::Color(Color { r: 1.0, g: 0.5, b: 0.25, a: 1.0 }));
	node.set_field("area", Value::Rect(Rect {
		x: 5.0,
		y: 6.0,
		width: 7.0,
		height: 8.0,
	}));
	node.set_field("transform", Value::Matrix4x4(Matrix4x4 { cells }));
	node.set_field("falloff", Value::AnimationCurve(AnimationCurve {
		keys: vec![
			Keyframe {
				time: 0.0,
				value: 1.0,
				in_tangent: 0.0,
				out_tangent: -1.0,
				tangent_mode: 0,
			},
			Keyframe {
				time: 1.0,
				value: 0.0,
				in_tangent: -1.0,
				out_tangent: 0.0,
				tangent_mode: 34,
			},
		],
		pre_wrap_mode: 8,
		post_wrap_mode: 2,
	}));
	node.set_field("layers", Value::LayerMask(0b1011));
	node.set_field("mode", Value::Int(2));
	node.set_field("range", range(-1.0, 1.0));
	(doc, sampler)
}

fn set_collections(doc: &mut Document, sampler: NodeId, len: usize) {
	let node = doc.node_mut(sampler).expect("sampler node");
	node.set_field("samples", Value::Array((0..len).map(|idx| Value::Float(idx as f32 + 0.5)).collect()));
	node.set_field("tags", Value::List((0..len).map(|idx| Value::String(format!("tag{idx}"))).collect()));
	node.set_field("windows", Value::Array((0..len).map(|idx| range(idx as f32, idx as f32 * 10.0)).collect()));
}

fn round_trip(registry: &Registry, doc: &Document, format: FormatVersion, index_map: bool) -> Document {
	let options = EncodeOptions { format, index_map };
	let data = TreeEncoder::new(registry, options).encode_tree(doc).expect("encode");
	assert_eq!(FormatVersion::for_tree(&data.version), format);
	decode_tree(&data, &DecodeContext::new(registry)).expect("decode")
}

#[test]
fn every_primitive_survives_both_formats() {
	let registry = sampler_registry();
	let (doc, sampler) = sampler_document(&registry);

	for format in FORMATS {
		for index_map in [true, false] {
			let decoded = round_trip(&registry, &doc, format, index_map);
			let expected = doc.node(sampler).expect("source");
			let node = decoded.node(sampler).expect("decoded");
			assert_eq!(node.fields, expected.fields, "{} index_map={index_map}", format.as_str());
			assert_eq!(node.id, 41);
			assert_eq!(node.friendly_name, expected.friendly_name);
			assert!(!node.is_instant);
			assert!(node.disabled);
			assert_eq!(node.meta, expected.meta);
			assert_eq!(decoded.root, Some(sampler));
			assert_eq!(decoded.entry, Some(NodeId(0)));
		}
	}
}

#[test]
fn collections_keep_their_length() {
	let registry = sampler_registry();
	for len in [0, 1, 4] {
		let (mut doc, sampler) = sampler_document(&registry);
		set_collections(&mut doc, sampler, len);
		for format in FORMATS {
			let decoded = round_trip(&registry, &doc, format, true);
			let node = decoded.node(sampler).expect("decoded");
			for name in ["samples", "tags", "windows"] {
				let items = node.field(name).and_then(Value::as_items).expect("collection");
				assert_eq!(items.len(), len, "{name} in {}", format.as_str());
			}
			assert_eq!(node.fields, doc.node(sampler).expect("source").fields, "len {len} in {}", format.as_str());
		}
	}
}

#[test]
fn element_hash_rule_follows_the_version_tag() {
	let registry = sampler_registry();
	let (mut doc, sampler) = sampler_document(&registry);
	set_collections(&mut doc, sampler, 3);

	let options = EncodeOptions {
		format: FormatVersion::Current { per_element_hash: false },
		index_map: false,
	};
	let data = TreeEncoder::new(&registry, options).encode_tree(&doc).expect("encode");
	assert_eq!(data.version, "1.5.6");

	let routed = decode_tree(&data, &DecodeContext::new(&registry)).expect("routed decode");
	let samples = routed.node(sampler).expect("node").field("samples").cloned();
	assert_eq!(samples, Some(Value::Array(vec![Value::Float(0.5), Value::Float(1.5), Value::Float(2.5)])));

	let forced = decode_tree_as(&data, FormatVersion::Current { per_element_hash: true }, &DecodeContext::new(&registry)).expect("forced decode");
	let items = forced.node(sampler).expect("node").field("samples").and_then(Value::as_items).map(<[Value]>::to_vec).expect("samples");
	assert_eq!(items[0], Value::Float(0.5), "first element hash is unscaled");
	assert_eq!(items[1], Value::Null);
	assert_eq!(items[2], Value::Null);
}

#[test]
fn private_fields_are_not_written() {
	let registry = sampler_registry();
	let (mut doc, sampler) = sampler_document(&registry);
	doc.node_mut(sampler).expect("sampler").set_field("scratch", Value::Int(99));

	let decoded = round_trip(&registry, &doc, FormatVersion::Current { per_element_hash: true }, true);
	assert_eq!(decoded.node(sampler).expect("node").field("scratch"), Some(&Value::Int(0)));
}
