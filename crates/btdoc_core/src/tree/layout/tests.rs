use super::{FieldLayout, TaskData};
use crate::tree::DecodeError;

fn layout() -> FieldLayout {
	FieldLayout {
		name_hashes: vec![10, 20, 30, 40],
		start_index: vec![0, 1, 2, 3],
		data_position: vec![0, 4, 4, 9],
		bytes: b"abcdefghijkl".to_vec(),
		..FieldLayout::default()
	}
}

#[test]
fn field_size_uses_next_slot_or_blob_end() {
	let layout = layout();
	assert_eq!(layout.field_size(0).expect("slot 0"), 4);
	assert_eq!(layout.field_size(1).expect("slot 1"), 0);
	assert_eq!(layout.field_size(2).expect("slot 2"), 5);
	assert_eq!(layout.field_size(3).expect("last slot"), 3);
	assert_eq!(layout.payload(3).expect("last payload"), b"jkl");
}

#[test]
fn decreasing_positions_are_reported() {
	let mut layout = layout();
	layout.data_position = vec![0, 6, 2];
	let err = layout.field_size(1).expect_err("negative size");
	assert!(matches!(err, DecodeError::NegativeFieldSize { slot: 1, size: -4 }));
}

#[test]
fn slot_outside_table_is_reported() {
	let mut layout = layout();
	layout.start_index[2] = 9;
	let err = layout.slot_of_row(2).expect_err("slot 9 missing");
	assert!(matches!(err, DecodeError::LayoutIndexOutOfRange { table: "data_position", idx: 9, len: 4 }));
}

#[test]
fn entity_ranges_are_derived_from_start_lists() {
	let data = TaskData {
		types: vec!["A".to_owned(), "B".to_owned()],
		start_index: vec![1, 3],
		variable_start_index: vec![0],
		layout: layout(),
		..TaskData::default()
	};

	assert_eq!(data.variable_rows(0).expect("variable rows"), 0..1);
	assert_eq!(data.node_rows(0).expect("first node"), 1..3);
	assert_eq!(data.node_rows(1).expect("last node"), 3..4);
}

#[test]
fn inverted_ranges_are_rejected() {
	let data = TaskData {
		start_index: vec![3, 1],
		layout: layout(),
		..TaskData::default()
	};
	let err = data.node_rows(0).expect_err("inverted");
	assert!(matches!(err, DecodeError::InvalidRowRange { start: 3, end: 1, rows: 4 }));
}
