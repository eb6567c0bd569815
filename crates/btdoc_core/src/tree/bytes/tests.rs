use super::{ByteOrder, ByteWriter, Cursor};
use crate::tree::DecodeError;

#[test]
fn reads_respect_byte_order() {
	let bytes = [0x00, 0x00, 0x01, 0x02];
	let mut little = Cursor::new(&bytes);
	let mut big = Cursor::new(&bytes);

	assert_eq!(little.read_i32(ByteOrder::Little).expect("little read"), 0x0201_0000);
	assert_eq!(big.read_i32(ByteOrder::Big).expect("big read"), 0x0000_0102);
	assert_eq!(little.remaining(), 0);
}

#[test]
fn read_exact_reports_eof_position() {
	let bytes = [1_u8, 2, 3];
	let mut cursor = Cursor::new(&bytes);
	cursor.read_u8().expect("first byte");

	let err = cursor.read_i32_le().expect_err("only two bytes remain");
	assert!(matches!(err, DecodeError::UnexpectedEof { at: 1, need: 4, rem: 2 }));
}

#[test]
fn prefixed_strings_use_multi_byte_lengths() {
	let text = "x".repeat(300);
	let mut writer = ByteWriter::new();
	writer.put_prefixed_string(&text);
	writer.put_prefixed_string("tail");
	let bytes = writer.into_bytes();

	assert_eq!(&bytes[..2], &[0xac, 0x02]);

	let mut cursor = Cursor::new(&bytes);
	assert_eq!(cursor.read_prefixed_string().expect("long string"), text);
	assert_eq!(cursor.read_prefixed_string().expect("short string"), "tail");
}

#[test]
fn overlong_length_prefix_is_rejected() {
	let bytes = [0xff_u8, 0xff, 0xff, 0xff, 0xff, 0x01];
	let err = Cursor::new(&bytes).read_7bit_len().expect_err("six byte prefix");
	assert!(matches!(err, DecodeError::BadStringLength { at: 0, .. }));
}

#[test]
fn string_longer_than_input_is_rejected() {
	let bytes = [0x05_u8, b'a', b'b'];
	let err = Cursor::new(&bytes).read_prefixed_string().expect_err("short payload");
	assert!(matches!(err, DecodeError::BadStringLength { at: 0, len: 5, rem: 2 }));
}
