use super::BehaviorFile;
use crate::tree::{ByteWriter, Compression, DecodeError, FieldLayout, TaskData};

fn sample() -> BehaviorFile {
	BehaviorFile {
		name: "Guard".to_owned(),
		description: "Patrols the gate".to_owned(),
		task_data: TaskData {
			types: vec!["BehaviorDesigner.Runtime.Tasks.EntryTask".to_owned()],
			parent_index: vec![-1],
			start_index: vec![0],
			variable_start_index: Vec::new(),
			json: String::new(),
			layout: FieldLayout {
				name_hashes: vec![11, 12],
				start_index: vec![0, 1],
				data_position: vec![0, 4],
				bytes: vec![1, 0, 0, 0, 9],
				index_keys: vec!["task_0_Int32_ID".to_owned()],
				index_values: vec![0],
				..FieldLayout::default()
			},
			version: "1.5.7".to_owned(),
		},
		compression: Compression::None,
	}
}

#[test]
fn container_bytes_parse_back() {
	let file = sample();
	let parsed = BehaviorFile::parse(&file.to_bytes()).expect("parse");
	assert_eq!(parsed, file);
}

#[test]
fn container_starts_with_prefixed_name() {
	let bytes = sample().to_bytes();
	assert_eq!(bytes[0], 5);
	assert_eq!(&bytes[1..6], b"Guard");
}

#[test]
fn mirror_blob_is_used_when_primary_is_empty() {
	let file = sample();
	let mut out = ByteWriter::new();
	out.put_prefixed_string(&file.name);
	out.put_prefixed_string(&file.description);
	out.put_i32_le(0);
	out.put_i32_le(0);
	out.put_i32_le(0);
	out.put_i32_le(0);
	out.put_prefixed_string("");
	out.put_i32_le(0);
	out.put_i32_le(0);
	out.put_i32_le(0);
	out.put_i32_le(0);
	out.put_i32_le(0);
	out.put_i32_le(3);
	out.put_bytes(&[7, 8, 9]);
	out.put_prefixed_string("");
	out.put_i32_le(0);

	let parsed = BehaviorFile::parse(&out.into_bytes()).expect("parse");
	assert_eq!(parsed.task_data.layout.bytes, [7, 8, 9]);
	assert_eq!(parsed.task_data.version, "");
}

#[test]
fn truncated_containers_fail_cleanly() {
	let bytes = sample().to_bytes();
	let err = BehaviorFile::parse(&bytes[..bytes.len() - 3]).expect_err("truncated");
	assert!(matches!(err, DecodeError::UnexpectedEof { .. }));

	let mut out = ByteWriter::new();
	out.put_prefixed_string("a");
	out.put_prefixed_string("b");
	out.put_i32_le(-2);
	let err = BehaviorFile::parse(&out.into_bytes()).expect_err("negative count");
	assert!(matches!(err, DecodeError::NegativeCount { count: -2, .. }));
}

#[test]
fn zstd_containers_round_trip_through_disk() {
	let dir = std::env::temp_dir().join(format!("btdoc-container-{}", std::process::id()));
	std::fs::create_dir_all(&dir).expect("scratch dir");
	let path = dir.join("guard.bytes");

	let file = sample();
	file.save(&path, Compression::Zstd).expect("save");
	let raw = std::fs::read(&path).expect("read back");
	assert!(raw.starts_with(&crate::tree::ZSTD_MAGIC));

	let opened = BehaviorFile::open(&path).expect("open");
	assert_eq!(opened.compression, Compression::Zstd);
	assert_eq!(opened.task_data, file.task_data);
	let _ = std::fs::remove_dir_all(&dir);
}
