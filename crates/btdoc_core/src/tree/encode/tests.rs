use std::sync::Arc;

use super::{EncodeOptions, TreeEncoder};
use crate::tree::hash::field_hash;
use crate::tree::{Document, FormatVersion, HostObject, OwnerId, Registry, SharedVariable, Value};

fn entry_only(registry: &Registry) -> Document {
	let mut doc = Document::new(OwnerId(1));
	doc.add_node(registry, "EntryTask").expect("entry");
	doc.nodes[0].id = 6;
	doc
}

#[test]
fn current_rows_carry_hashes_and_index_keys() {
	let registry = Registry::standard();
	let data = TreeEncoder::new(&registry, EncodeOptions::default()).encode_tree(&entry_only(&registry)).expect("encode");

	assert_eq!(data.version, "1.5.7");
	assert_eq!(data.types, ["BehaviorDesigner.Runtime.Tasks.EntryTask"]);
	assert_eq!(data.parent_index, [-1]);
	assert_eq!(data.start_index, [0]);
	let layout = &data.layout;
	assert!(layout.type_names.is_empty());
	assert_eq!(layout.name_hashes[0], field_hash(0, "Int32", "ID"));
	assert_eq!(layout.index_keys[0], "task_0_Int32_ID");
	assert_eq!(layout.index_values[0], 0);
	assert_eq!(layout.payload(0).expect("id payload"), 6_i32.to_le_bytes());
	assert_eq!(layout.index_keys.len(), layout.row_count());
}

#[test]
fn legacy_rows_are_name_keyed_and_big_endian() {
	let registry = Registry::standard();
	let options = EncodeOptions {
		format: FormatVersion::Legacy,
		index_map: true,
	};
	let data = TreeEncoder::new(&registry, options).encode_tree(&entry_only(&registry)).expect("encode");

	assert_eq!(data.version, "");
	let layout = &data.layout;
	assert!(layout.name_hashes.is_empty());
	assert!(layout.index_keys.is_empty());
	assert_eq!(layout.type_names[0], "Int32ID");
	assert_eq!(layout.type_names[1], "StringFriendlyName");
	assert_eq!(layout.payload(0).expect("id payload"), 6_i32.to_be_bytes());
}

#[test]
fn index_map_can_be_left_out() {
	let registry = Registry::standard();
	let options = EncodeOptions {
		index_map: false,
		..EncodeOptions::default()
	};
	let data = TreeEncoder::new(&registry, options).encode_tree(&entry_only(&registry)).expect("encode");
	assert!(data.layout.index_keys.is_empty());
	assert_eq!(data.layout.name_hashes.len(), data.layout.row_count());
}

#[test]
fn variables_are_written_before_nodes() {
	let registry = Registry::standard();
	let mut doc = entry_only(&registry);
	let schema = registry.resolve_variable("SharedBool").expect("SharedBool");
	doc.variables.push(Arc::new(SharedVariable::named(&registry, schema, "alert", Value::Bool(true))));

	let data = TreeEncoder::new(&registry, EncodeOptions::default()).encode_tree(&doc).expect("encode");
	assert_eq!(data.variable_start_index, [0]);
	let first_node_row = data.start_index[0] as usize;
	assert!(first_node_row > 0);
	assert_eq!(data.layout.index_keys[0], "shared_String_Type");
	assert_eq!(data.layout.index_keys[first_node_row], "task_0_Int32_ID");
}

#[test]
fn host_objects_fill_the_object_table() {
	let registry = Registry::standard();
	let mut doc = entry_only(&registry);
	let send = doc.add_node(&registry, "SendEvent").expect("send");
	doc.set_root(send).expect("root");
	let schema = registry.resolve_variable("SharedGameObject").expect("SharedGameObject");
	let target = HostObject {
		index: 2,
		name: "Player".to_owned(),
	};
	let mut variable = SharedVariable::blank(&registry, schema);
	variable.set_value(Value::HostObject(target.clone()));
	doc.node_mut(send).expect("node").set_field("targetGameObject", Value::Variable(Arc::new(variable)));

	let data = TreeEncoder::new(&registry, EncodeOptions::default()).encode_tree(&doc).expect("encode");
	assert_eq!(data.layout.objects.len(), 3);
	assert_eq!(data.layout.objects[2], target);
	assert_eq!(data.layout.objects[0].name, "");
}

#[test]
fn mismatched_values_are_rejected() {
	let registry = Registry::standard();
	let mut doc = entry_only(&registry);
	let wait = doc.add_node(&registry, "Wait").expect("wait");
	doc.set_root(wait).expect("root");
	doc.node_mut(wait).expect("node").set_field("waitTime", Value::Int(3));

	let err = TreeEncoder::new(&registry, EncodeOptions::default()).encode_tree(&doc).expect_err("int is not a variable");
	assert!(matches!(err, crate::tree::DecodeError::Unencodable { .. }));
}
