use crate::tree::hash::{element_hash, field_hash};
use crate::tree::{
	CURRENT_UNKNOWN_COMMENT, DecodeContext, DecodeError, DecodeOptions, FieldKind, FieldLayout, HostObject, LEGACY_UNKNOWN_COMMENT, NodeId, Registry, TaskData, Value, decode_tree,
};

const ENTRY: &str = "BehaviorDesigner.Runtime.Tasks.EntryTask";

#[derive(Default)]
struct Rows {
	layout: FieldLayout,
}

impl Rows {
	fn push(&mut self, payload: &[u8]) {
		let slot = self.layout.data_position.len();
		self.layout.data_position.push(self.layout.bytes.len() as i32);
		self.layout.bytes.extend_from_slice(payload);
		self.layout.start_index.push(slot as i32);
	}

	fn hashed(mut self, hash: i32, payload: &[u8]) -> Self {
		self.push(payload);
		self.layout.name_hashes.push(hash);
		self
	}

	fn named(mut self, key: &str, payload: &[u8]) -> Self {
		self.push(payload);
		self.layout.type_names.push(key.to_owned());
		self
	}
}

fn task_data(types: &[&str], parents: &[i32], starts: &[i32], rows: Rows, version: &str) -> TaskData {
	TaskData {
		types: types.iter().map(|name| (*name).to_owned()).collect(),
		parent_index: parents.to_vec(),
		start_index: starts.to_vec(),
		layout: rows.layout,
		version: version.to_owned(),
		..TaskData::default()
	}
}

fn id_hash() -> i32 {
	field_hash(0, "Int32", "ID")
}

#[test]
fn current_nodes_read_bookkeeping_fields() {
	let registry = Registry::standard();
	let rows = Rows::default()
		.hashed(id_hash(), &5_i32.to_le_bytes())
		.hashed(field_hash(0, "String", "FriendlyName"), b"Root")
		.hashed(field_hash(0, "Boolean", "Disabled"), &[1]);
	let data = task_data(&[ENTRY], &[-1], &[0], rows, "1.5.7");

	let doc = decode_tree(&data, &DecodeContext::new(&registry)).expect("decode");
	assert_eq!(doc.entry, Some(NodeId(0)));
	let node = &doc.nodes[0];
	assert_eq!(node.id, 5);
	assert_eq!(node.friendly_name, "Root");
	assert!(node.disabled);
	assert!(node.is_instant);
	assert_eq!(node.reference_id, 0);
	assert_eq!(node.meta.as_ref().map(|meta| meta.comment.as_str()), Some(""));
}

#[test]
fn strict_current_decoding_rejects_unknown_types() {
	let registry = Registry::standard();
	let rows = Rows::default().hashed(id_hash(), &3_i32.to_le_bytes());
	let data = task_data(&["Game.Tasks.Patrol"], &[-1], &[0], rows, "1.5.7");

	let err = decode_tree(&data, &DecodeContext::new(&registry)).expect_err("unknown type");
	assert!(matches!(err, DecodeError::UnknownNodeType { decoder: "current", index: 0, .. }));

	let ctx = DecodeContext::new(&registry).with_options(DecodeOptions::for_inspect());
	let doc = decode_tree(&data, &ctx).expect("lenient decode");
	let node = &doc.nodes[0];
	assert!(node.is_unknown());
	assert_eq!(node.type_name.as_ref(), "Game.Tasks.Patrol");
	assert_eq!(node.id, 3);
	assert_eq!(node.friendly_name, "Unknown ");
	assert_eq!(node.meta.as_ref().map(|meta| meta.comment.as_str()), Some(CURRENT_UNKNOWN_COMMENT));

	let payload = node.unknown_payload().expect("payload");
	assert_eq!(payload.bytes, 3_i32.to_le_bytes());
	assert_eq!(payload.name_hashes, [id_hash()]);
}

#[test]
fn legacy_rows_are_big_endian_and_keep_old_comments() {
	let registry = Registry::standard();
	let rows = Rows::default()
		.named("Int32ID", &5_i32.to_be_bytes())
		.named("StringNodeDataComment", b"old note");
	let data = task_data(&["Game.Tasks.Patrol"], &[-1], &[0], rows, "");

	let doc = decode_tree(&data, &DecodeContext::new(&registry)).expect("legacy never rejects types");
	let node = &doc.nodes[0];
	assert_eq!(node.id, 5);
	assert_eq!(node.friendly_name, "Unknown ");
	let comment = node.meta.as_ref().map(|meta| meta.comment.clone()).unwrap_or_default();
	assert_eq!(comment, format!("{LEGACY_UNKNOWN_COMMENT}\0old note"));
	assert_eq!(node.unknown_payload().expect("payload").type_names, ["Int32ID", "StringNodeDataComment"]);
}

#[test]
fn missing_variable_fields_are_seeded_only_in_current_format() {
	let registry = Registry::standard();
	let wait_time = |doc: &crate::tree::Document| {
		doc.nodes[1]
			.field("waitTime")
			.and_then(Value::as_variable)
			.and_then(|variable| variable.value().cloned())
	};

	let rows = Rows::default().hashed(id_hash(), &0_i32.to_le_bytes()).hashed(id_hash(), &1_i32.to_le_bytes());
	let data = task_data(&[ENTRY, "Wait"], &[-1, 0], &[0, 1], rows, "1.5.7");
	let doc = decode_tree(&data, &DecodeContext::new(&registry)).expect("current");
	assert_eq!(doc.root, Some(NodeId(1)));
	assert_eq!(wait_time(&doc), Some(Value::Float(1.0)));

	let rows = Rows::default().named("Int32ID", &0_i32.to_be_bytes()).named("Int32ID", &1_i32.to_be_bytes());
	let data = task_data(&[ENTRY, "Wait"], &[-1, 0], &[0, 1], rows, "");
	let doc = decode_tree(&data, &DecodeContext::new(&registry)).expect("legacy");
	assert_eq!(wait_time(&doc), Some(Value::Float(0.0)));
}

#[test]
fn nested_variables_respect_max_depth() {
	let registry = Registry::standard();
	let wait_hash = field_hash(0, "SharedFloat", "waitTime");
	let rows = Rows::default()
		.hashed(wait_hash, &[])
		.hashed(field_hash(wait_hash, "String", "Type"), b"BehaviorDesigner.Runtime.SharedFloat")
		.hashed(field_hash(wait_hash, "String", "Name"), b"delay");
	let data = task_data(&["Wait"], &[-1], &[0], rows, "1.5.7");

	let options = DecodeOptions { max_depth: 0, ..DecodeOptions::default() };
	let ctx = DecodeContext::new(&registry).with_options(options);
	let err = decode_tree(&data, &ctx).expect_err("variable nests one level");
	assert!(matches!(err, DecodeError::DecodeDepthExceeded { max_depth: 0 }));

	let doc = decode_tree(&data, &DecodeContext::new(&registry)).expect("default depth");
	let variable = doc.nodes[0].field("waitTime").and_then(Value::as_variable).expect("variable");
	assert_eq!(variable.name, "delay");
	assert_eq!(variable.type_name.as_ref(), "BehaviorDesigner.Runtime.SharedFloat");
	assert_eq!(variable.value(), Some(&Value::Float(0.0)));
}

#[test]
fn node_links_resolve_against_the_arena() {
	let registry = Registry::standard();
	let actions = field_hash(0, "Action[]", "actions");
	let element = field_hash(element_hash(actions, 0, true), "Action", "0");
	let build = |target: i32| {
		let rows = Rows::default()
			.hashed(id_hash(), &0_i32.to_le_bytes())
			.hashed(actions, &1_i32.to_le_bytes())
			.hashed(element, &target.to_le_bytes());
		task_data(&[ENTRY, "StackedAction"], &[-1, 0], &[0, 1], rows, "1.5.7")
	};

	let doc = decode_tree(&build(0), &DecodeContext::new(&registry)).expect("decode");
	let items = doc.nodes[1].field("actions").and_then(Value::as_items).expect("actions");
	assert_eq!(items.len(), 1);
	assert_eq!(items[0].as_node().map(|link| link.node), Some(NodeId(0)));

	let err = decode_tree(&build(9), &DecodeContext::new(&registry)).expect_err("dangling id");
	assert!(matches!(err, DecodeError::DanglingNodeRef { id: 9, len: 2 }));
}

#[test]
fn children_of_leaf_parents_stay_detached() {
	let registry = Registry::standard();
	let rows = Rows::default()
		.hashed(id_hash(), &0_i32.to_le_bytes())
		.hashed(id_hash(), &1_i32.to_le_bytes())
		.hashed(id_hash(), &2_i32.to_le_bytes());
	let data = task_data(&[ENTRY, "Wait", "Idle"], &[-1, 0, 1], &[0, 1, 2], rows, "1.5.7");

	let doc = decode_tree(&data, &DecodeContext::new(&registry)).expect("decode");
	assert_eq!(doc.root, Some(NodeId(1)));
	assert!(doc.nodes[1].children().is_empty());
	assert_eq!(doc.detached, [NodeId(2)]);
	assert_eq!(doc.find_by_id(2), Some(NodeId(2)));
}

#[test]
fn host_object_index_past_the_table_keeps_the_default() {
	let fallback = Value::HostObject(HostObject {
		index: 0,
		name: "self".to_owned(),
	});
	let registry = Registry::builder()
		.with_standard()
		.task("Game.Tasks.Aim", |ty| {
			ty.base("BehaviorDesigner.Runtime.Tasks.Action")
				.field("target", FieldKind::host_object("UnityEngine.GameObject"))
				.with_default(fallback.clone())
		})
		.build();
	let build = |index: i32| {
		let rows = Rows::default()
			.hashed(id_hash(), &0_i32.to_le_bytes())
			.hashed(id_hash(), &1_i32.to_le_bytes())
			.hashed(field_hash(0, "GameObject", "target"), &index.to_le_bytes());
		let mut data = task_data(&[ENTRY, "Game.Tasks.Aim"], &[-1, 0], &[0, 1], rows, "1.5.7");
		data.layout.objects = vec![HostObject {
			index: 0,
			name: "turret".to_owned(),
		}];
		data
	};

	let doc = decode_tree(&build(0), &DecodeContext::new(&registry)).expect("in range");
	assert!(matches!(doc.nodes[1].field("target"), Some(Value::HostObject(object)) if object.name == "turret"));

	let doc = decode_tree(&build(7), &DecodeContext::new(&registry)).expect("out of range");
	assert_eq!(doc.nodes[1].field("target"), Some(&fallback));
}
