use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors produced while reading, decoding, and re-encoding behavior tree documents.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// A container count prefix was negative.
	#[error("negative count {count} at offset {at}")]
	NegativeCount {
		/// Parsed signed count.
		count: i64,
		/// Byte offset of the count.
		at: usize,
	},
	/// A length-prefixed string used a malformed or oversized prefix.
	#[error("string length {len} at offset {at} exceeds remaining {rem}")]
	BadStringLength {
		/// Byte offset of the length prefix.
		at: usize,
		/// Declared byte length.
		len: u64,
		/// Remaining bytes in cursor.
		rem: usize,
	},
	/// Container string bytes were not valid UTF-8.
	#[error("invalid utf-8 in container string at offset {at}")]
	InvalidUtf8 {
		/// Byte offset of the string payload.
		at: usize,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// A field layout table referenced a row, slot, or offset that does not exist.
	#[error("{table} index {idx} out of range (len={len})")]
	LayoutIndexOutOfRange {
		/// Table being indexed.
		table: &'static str,
		/// Requested index.
		idx: i64,
		/// Table length.
		len: usize,
	},
	/// A data position table was not monotonic.
	#[error("negative field size {size} at data slot {slot}")]
	NegativeFieldSize {
		/// Data slot whose payload size was computed.
		slot: usize,
		/// Computed signed size.
		size: i64,
	},
	/// An entity row range was inverted or ran past the row table.
	#[error("invalid row range {start}..{end} (rows={rows})")]
	InvalidRowRange {
		/// First row of the entity.
		start: i64,
		/// One past the last row of the entity.
		end: i64,
		/// Total rows in the layout.
		rows: usize,
	},
	/// A node type name could not be resolved and strict types are enabled.
	#[error("[{decoder}] unknown node type {type_name} at index {index}")]
	UnknownNodeType {
		/// Decoder that rejected the node.
		decoder: &'static str,
		/// Unresolved stored type name.
		type_name: String,
		/// Node position in the document.
		index: usize,
	},
	/// A type name is not present in the registry.
	#[error("type {name} is not registered")]
	UnknownSchema {
		/// Requested type name.
		name: String,
	},
	/// A type is registered under a different category than required.
	#[error("type {name} is a {found}, expected a {expected}")]
	SchemaCategoryMismatch {
		/// Requested type name.
		name: String,
		/// Required category label.
		expected: &'static str,
		/// Registered category label.
		found: &'static str,
	},
	/// A stored parent index pointed outside the node list.
	#[error("parent index {parent} of node {index} out of range (nodes={len})")]
	ParentOutOfRange {
		/// Child node position.
		index: usize,
		/// Stored parent index.
		parent: i32,
		/// Total nodes.
		len: usize,
	},
	/// A stored node reference id did not name a decoded node.
	#[error("node reference {id} out of range (nodes={len})")]
	DanglingNodeRef {
		/// Stored node id.
		id: i32,
		/// Total nodes.
		len: usize,
	},
	/// A node index passed to a document accessor was out of range.
	#[error("node index {index} out of range (nodes={len})")]
	NodeIndexOutOfRange {
		/// Requested node index.
		index: usize,
		/// Total nodes.
		len: usize,
	},
	/// Nested field decoding exceeded the configured depth.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Maximum recursion depth.
		max_depth: u32,
	},
	/// A stored collection count exceeded the configured element cap.
	#[error("collection count {count} exceeds limit {max}")]
	CollectionTooLarge {
		/// Stored element count.
		count: usize,
		/// Configured cap.
		max: usize,
	},
	/// A value cannot be written in the requested layout.
	#[error("cannot encode {what}")]
	Unencodable {
		/// Description of the rejected value.
		what: String,
	},
}
