mod bytes;
mod codec;
mod compression;
mod container;
mod decode;
mod dispatch;
mod encode;
mod error;
mod hash;
mod index;
mod keys;
mod layout;
mod node;
mod relink;
mod schema;
mod value;
mod variable;

/// Bounds-checked byte cursor and writer.
pub use bytes::{ByteOrder, ByteWriter, Cursor};
/// Compression detection result and helpers.
pub use compression::{Compression, ZSTD_MAGIC};
/// Standalone behavior container.
pub use container::BehaviorFile;
/// Decode options, context, and placeholder comments.
pub use decode::{CURRENT_UNKNOWN_COMMENT, DecodeContext, DecodeOptions, LEGACY_UNKNOWN_COMMENT};
/// Format routing and decode entry points.
pub use dispatch::{FormatVersion, decode_globals, decode_globals_as, decode_tree, decode_tree_as};
/// Layout re-encoder.
pub use encode::{EncodeOptions, TreeEncoder};
/// Error and result aliases.
pub use error::{DecodeError, Result};
/// Field and type key hashing.
pub use hash::{element_hash, field_hash, name_hash};
/// Row lookup tables.
pub use index::{EntityIndex, IndexMap};
/// Serialized document tables.
pub use layout::{FieldLayout, HostObject, TaskData, VariableData};
/// Decoded node arena types.
pub use node::{Document, Node, NodeId, NodeLink, NodeMeta, NodeShape, OwnerId, UnknownPayload};
/// Cross-document node link repair.
pub use relink::{relink_by_id, relink_foreign};
/// Type registry and field declarations.
pub use schema::{FieldKind, FieldSlot, Registry, RegistryBuilder, TypeBuilder, TypeCategory, TypeSchema, UNKNOWN_PARENT_TASK, UNKNOWN_TASK, Visibility, short_name};
/// Decoded runtime value types.
pub use value::{AnimationCurve, Color, FieldValue, Keyframe, Matrix4x4, ObjectValue, Rect, Value, Vector2, Vector3, Vector4};
/// Shared variables and variable pools.
pub use variable::{GlobalVariables, PropertyMapper, SharedVariable, VALUE_FIELD, VariableSource};
