use std::sync::Arc;

use crate::tree::{HostObject, NodeLink, SharedVariable};

/// Two-component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
	/// X component.
	pub x: f32,
	/// Y component.
	pub y: f32,
}

/// Three-component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
	/// X component.
	pub x: f32,
	/// Y component.
	pub y: f32,
	/// Z component.
	pub z: f32,
}

/// Four-component float vector, also used for quaternions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector4 {
	/// X component.
	pub x: f32,
	/// Y component.
	pub y: f32,
	/// Z component.
	pub z: f32,
	/// W component.
	pub w: f32,
}

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
	/// Red channel.
	pub r: f32,
	/// Green channel.
	pub g: f32,
	/// Blue channel.
	pub b: f32,
	/// Alpha channel.
	pub a: f32,
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
	/// Left edge.
	pub x: f32,
	/// Top edge.
	pub y: f32,
	/// Width.
	pub width: f32,
	/// Height.
	pub height: f32,
}

/// 4x4 matrix stored row-major (`m00, m01, .. m33`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix4x4 {
	/// Sixteen cells, row-major.
	pub cells: [f32; 16],
}

/// One key of an animation curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keyframe {
	/// Key time.
	pub time: f32,
	/// Key value.
	pub value: f32,
	/// Incoming tangent.
	pub in_tangent: f32,
	/// Outgoing tangent.
	pub out_tangent: f32,
	/// Packed tangent mode flags.
	pub tangent_mode: i32,
}

/// Keyframed curve with wrap modes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationCurve {
	/// Ordered keys.
	pub keys: Vec<Keyframe>,
	/// Wrap mode before the first key.
	pub pre_wrap_mode: i32,
	/// Wrap mode after the last key.
	pub post_wrap_mode: i32,
}

/// Decoded field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	/// Absent or unset value.
	#[default]
	Null,
	/// Boolean value.
	Bool(bool),
	/// Single byte.
	Byte(u8),
	/// 32-bit signed integer, also carries enum values.
	Int(i32),
	/// 32-bit unsigned integer.
	UInt(u32),
	/// 64-bit signed integer.
	Long(i64),
	/// Single-precision float.
	Float(f32),
	/// Double-precision float.
	Double(f64),
	/// UTF-8 text.
	String(String),
	/// Two-component vector.
	Vector2(Vector2),
	/// Three-component vector.
	Vector3(Vector3),
	/// Four-component vector.
	Vector4(Vector4),
	/// Rotation quaternion.
	Quaternion(Vector4),
	/// RGBA color.
	Color(Color),
	/// Rectangle.
	Rect(Rect),
	/// 4x4 matrix.
	Matrix4x4(Matrix4x4),
	/// Animation curve.
	AnimationCurve(AnimationCurve),
	/// Layer bit mask.
	LayerMask(i32),
	/// Fixed-size collection.
	Array(Vec<Value>),
	/// Growable collection.
	List(Vec<Value>),
	/// Link to a node in a document.
	Node(NodeLink),
	/// Shared variable, possibly shared by identity with other fields.
	Variable(Arc<SharedVariable>),
	/// Host-environment object.
	HostObject(HostObject),
	/// Nested plain object or inline node object.
	Object(ObjectValue),
}

impl Value {
	/// Whether this is [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Stable lowercase label for the variant.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Byte(_) => "byte",
			Self::Int(_) => "int",
			Self::UInt(_) => "uint",
			Self::Long(_) => "long",
			Self::Float(_) => "float",
			Self::Double(_) => "double",
			Self::String(_) => "string",
			Self::Vector2(_) => "vector2",
			Self::Vector3(_) => "vector3",
			Self::Vector4(_) => "vector4",
			Self::Quaternion(_) => "quaternion",
			Self::Color(_) => "color",
			Self::Rect(_) => "rect",
			Self::Matrix4x4(_) => "matrix4x4",
			Self::AnimationCurve(_) => "animation_curve",
			Self::LayerMask(_) => "layer_mask",
			Self::Array(_) => "array",
			Self::List(_) => "list",
			Self::Node(_) => "node",
			Self::Variable(_) => "variable",
			Self::HostObject(_) => "host_object",
			Self::Object(_) => "object",
		}
	}

	/// Borrow a string payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Borrow a node link payload.
	pub fn as_node(&self) -> Option<&NodeLink> {
		match self {
			Self::Node(link) => Some(link),
			_ => None,
		}
	}

	/// Borrow a shared variable payload.
	pub fn as_variable(&self) -> Option<&Arc<SharedVariable>> {
		match self {
			Self::Variable(variable) => Some(variable),
			_ => None,
		}
	}

	/// Borrow collection items for arrays and lists.
	pub fn as_items(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) | Self::List(items) => Some(items),
			_ => None,
		}
	}
}

/// Named field and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Field name.
	pub name: Box<str>,
	/// Field value.
	pub value: Value,
}

/// Nested object value with its schema name.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
	/// Registered type name.
	pub type_name: Box<str>,
	/// Ordered fields.
	pub fields: Vec<FieldValue>,
}

impl ObjectValue {
	/// Look up a field by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		find_field(&self.fields, name)
	}

	/// Replace or append a field value.
	pub fn set(&mut self, name: &str, value: Value) {
		set_field(&mut self.fields, name, value);
	}
}

pub(crate) fn find_field<'a>(fields: &'a [FieldValue], name: &str) -> Option<&'a Value> {
	fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
}

pub(crate) fn find_field_mut<'a>(fields: &'a mut [FieldValue], name: &str) -> Option<&'a mut Value> {
	fields.iter_mut().find(|field| field.name.as_ref() == name).map(|field| &mut field.value)
}

pub(crate) fn set_field(fields: &mut Vec<FieldValue>, name: &str, value: Value) {
	match find_field_mut(fields, name) {
		Some(slot) => *slot = value,
		None => fields.push(FieldValue { name: name.into(), value }),
	}
}
