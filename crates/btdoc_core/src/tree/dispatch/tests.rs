use std::sync::Arc;

use super::FormatVersion;
use crate::tree::{
	DecodeContext, Document, EncodeOptions, FieldLayout, GlobalVariables, OwnerId, Registry, SharedVariable, TaskData, TreeEncoder, Value, decode_globals, decode_tree,
};

#[test]
fn tree_versions_route_by_plain_string_comparison() {
	assert_eq!(FormatVersion::for_tree(""), FormatVersion::Legacy);
	assert_eq!(FormatVersion::for_tree("1.5.6"), FormatVersion::Current { per_element_hash: false });
	assert_eq!(FormatVersion::for_tree("1.5.7"), FormatVersion::Current { per_element_hash: true });
	assert_eq!(FormatVersion::for_tree("1.6.0"), FormatVersion::Current { per_element_hash: true });
	assert_eq!(FormatVersion::for_tree("1.5.10"), FormatVersion::Current { per_element_hash: false });
}

#[test]
fn version_tags_route_back_to_their_format() {
	for format in [FormatVersion::Legacy, FormatVersion::Current { per_element_hash: false }, FormatVersion::Current { per_element_hash: true }] {
		assert_eq!(FormatVersion::for_tree(format.version_tag()), format, "{}", format.as_str());
	}
}

#[test]
fn name_keyed_globals_use_the_legacy_decoder() {
	let layout = FieldLayout {
		type_names: vec!["StringType".to_owned()],
		..FieldLayout::default()
	};
	assert_eq!(FormatVersion::for_globals("1.5.7", &layout), FormatVersion::Legacy);
	assert_eq!(FormatVersion::for_globals("1.5.7", &FieldLayout::default()), FormatVersion::Current { per_element_hash: true });
	assert_eq!(FormatVersion::for_globals("", &FieldLayout::default()), FormatVersion::Legacy);
}

#[test]
fn empty_blob_decodes_to_an_empty_document() {
	let registry = Registry::standard();
	let data = TaskData {
		types: vec!["Wait".to_owned()],
		parent_index: vec![-1],
		start_index: vec![0],
		version: "1.5.7".to_owned(),
		..TaskData::default()
	};
	let doc = decode_tree(&data, &DecodeContext::new(&registry)).expect("decode");
	assert!(doc.nodes.is_empty());
	assert_eq!(doc.entry, None);
}

#[test]
fn parent_count_mismatch_keeps_only_variables() {
	let registry = Registry::standard();
	let schema = registry.resolve_variable("SharedInt").expect("SharedInt");
	let mut doc = Document::new(OwnerId(1));
	doc.variables.push(Arc::new(SharedVariable::named(&registry, schema, "hits", Value::Int(4))));
	doc.add_node(&registry, "EntryTask").expect("entry");
	let wait = doc.add_node(&registry, "Wait").expect("wait");
	doc.set_root(wait).expect("root");

	let mut data = TreeEncoder::new(&registry, EncodeOptions::default()).encode_tree(&doc).expect("encode");
	data.parent_index.pop();

	let decoded = decode_tree(&data, &DecodeContext::new(&registry)).expect("structural fault is not an error");
	assert!(decoded.nodes.is_empty());
	assert_eq!(decoded.entry, None);
	assert_eq!(decoded.root, None);
	assert_eq!(decoded.variables.len(), 1);
	assert_eq!(decoded.variables[0].value(), Some(&Value::Int(4)));
}

#[test]
fn globals_round_trip_in_both_formats() {
	let registry = Registry::standard();
	let schema = registry.resolve_variable("SharedString").expect("SharedString");
	let mut variable = SharedVariable::named(&registry, schema, "greeting", Value::String("hello".to_owned()));
	variable.is_global = true;
	let globals = GlobalVariables {
		variables: vec![Arc::new(variable)],
	};

	for format in [FormatVersion::Legacy, FormatVersion::Current { per_element_hash: true }] {
		let options = EncodeOptions { format, index_map: true };
		let data = TreeEncoder::new(&registry, options).encode_globals(&globals).expect("encode");
		let decoded = decode_globals(&data, &DecodeContext::new(&registry)).expect("decode");
		assert_eq!(decoded.variables.len(), 1, "{}", format.as_str());
		let greeting = &decoded.variables[0];
		assert_eq!(greeting.name, "greeting");
		assert!(greeting.is_global);
		assert_eq!(greeting.value(), Some(&Value::String("hello".to_owned())));
	}
}
