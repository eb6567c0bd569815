use std::borrow::Cow;
use std::collections::HashMap;

use crate::tree::{DecodeError, FieldValue, Result, Value};

mod builtins;

/// Declared kind of a serialized field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
	/// 32-bit signed integer.
	Int,
	/// 32-bit unsigned integer.
	UInt,
	/// Single-precision float.
	Float,
	/// Double-precision float.
	Double,
	/// 64-bit signed integer.
	Long,
	/// Boolean.
	Bool,
	/// Single byte.
	Byte,
	/// UTF-8 text.
	String,
	/// Two-component vector.
	Vector2,
	/// Three-component vector.
	Vector3,
	/// Four-component vector.
	Vector4,
	/// Rotation quaternion.
	Quaternion,
	/// RGBA color.
	Color,
	/// Rectangle.
	Rect,
	/// 4x4 matrix.
	Matrix4x4,
	/// Animation curve.
	AnimationCurve,
	/// Layer bit mask.
	LayerMask,
	/// Registered enumeration, stored as a 32-bit integer.
	Enum(Box<str>),
	/// Fixed-size collection.
	Array(Box<FieldKind>),
	/// Growable collection.
	List(Box<FieldKind>),
	/// Reference to a node of the named task type.
	Node(Box<str>),
	/// Shared variable of the named variable type.
	Variable(Box<str>),
	/// Host-environment object of the named host type.
	HostObject(Box<str>),
	/// Nested plain object of the named type.
	Struct(Box<str>),
}

impl FieldKind {
	/// Enumeration kind.
	pub fn enumeration(name: &str) -> Self {
		Self::Enum(name.into())
	}

	/// Fixed-size collection of `element`.
	pub fn array(element: Self) -> Self {
		Self::Array(Box::new(element))
	}

	/// Growable collection of `element`.
	pub fn list(element: Self) -> Self {
		Self::List(Box::new(element))
	}

	/// Node reference kind.
	pub fn node(type_name: &str) -> Self {
		Self::Node(type_name.into())
	}

	/// Shared variable kind.
	pub fn variable(type_name: &str) -> Self {
		Self::Variable(type_name.into())
	}

	/// Host object kind.
	pub fn host_object(type_name: &str) -> Self {
		Self::HostObject(type_name.into())
	}

	/// Nested plain object kind.
	pub fn structure(type_name: &str) -> Self {
		Self::Struct(type_name.into())
	}

	/// Runtime type name used when composing field keys.
	pub fn key_name(&self) -> Cow<'_, str> {
		match self {
			Self::Int => Cow::Borrowed("Int32"),
			Self::UInt => Cow::Borrowed("UInt32"),
			Self::Float => Cow::Borrowed("Single"),
			Self::Double => Cow::Borrowed("Double"),
			Self::Long => Cow::Borrowed("Int64"),
			Self::Bool => Cow::Borrowed("Boolean"),
			Self::Byte => Cow::Borrowed("Byte"),
			Self::String => Cow::Borrowed("String"),
			Self::Vector2 => Cow::Borrowed("Vector2"),
			Self::Vector3 => Cow::Borrowed("Vector3"),
			Self::Vector4 => Cow::Borrowed("Vector4"),
			Self::Quaternion => Cow::Borrowed("Quaternion"),
			Self::Color => Cow::Borrowed("Color"),
			Self::Rect => Cow::Borrowed("Rect"),
			Self::Matrix4x4 => Cow::Borrowed("Matrix4x4"),
			Self::AnimationCurve => Cow::Borrowed("AnimationCurve"),
			Self::LayerMask => Cow::Borrowed("LayerMask"),
			Self::Array(element) => Cow::Owned(format!("{}[]", element.key_name())),
			Self::List(_) => Cow::Borrowed("List`1"),
			Self::Enum(name) | Self::Node(name) | Self::Variable(name) | Self::HostObject(name) | Self::Struct(name) => Cow::Borrowed(short_name(name)),
		}
	}

	/// Element kind of arrays and lists.
	pub fn element(&self) -> Option<&FieldKind> {
		match self {
			Self::Array(element) | Self::List(element) => Some(element),
			_ => None,
		}
	}

	/// Value a freshly constructed object holds for this kind.
	pub fn default_value(&self) -> Value {
		match self {
			Self::Int | Self::Enum(_) => Value::Int(0),
			Self::UInt => Value::UInt(0),
			Self::Float => Value::Float(0.0),
			Self::Double => Value::Double(0.0),
			Self::Long => Value::Long(0),
			Self::Bool => Value::Bool(false),
			Self::Byte => Value::Byte(0),
			Self::Vector2 => Value::Vector2(Default::default()),
			Self::Vector3 => Value::Vector3(Default::default()),
			Self::Vector4 => Value::Vector4(Default::default()),
			Self::Quaternion => Value::Quaternion(Default::default()),
			Self::Color => Value::Color(Default::default()),
			Self::Rect => Value::Rect(Default::default()),
			Self::Matrix4x4 => Value::Matrix4x4(Default::default()),
			Self::LayerMask => Value::LayerMask(0),
			Self::String | Self::AnimationCurve | Self::Array(_) | Self::List(_) | Self::Node(_) | Self::Variable(_) | Self::HostObject(_) | Self::Struct(_) => Value::Null,
		}
	}
}

/// Return the segment after the last `.` of a qualified type name.
pub fn short_name(name: &str) -> &str {
	name.rsplit('.').next().unwrap_or(name)
}

/// Field visibility as declared on the runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	/// Public field, serialized.
	Public,
	/// Non-public field, skipped.
	Private,
	/// Non-public field opted into serialization.
	SerializedPrivate,
	/// Field marked non-serialized, skipped.
	NonSerialized,
}

impl Visibility {
	/// Whether the serializers read and write this field.
	pub fn is_serialized(self) -> bool {
		matches!(self, Self::Public | Self::SerializedPrivate)
	}
}

/// One declared field of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
	/// Field name.
	pub name: Box<str>,
	/// Declared kind.
	pub kind: FieldKind,
	/// Declared visibility.
	pub visibility: Visibility,
	/// Node references stored inline as nested objects.
	pub inspect: bool,
	/// Value a freshly constructed object holds.
	pub default: Value,
}

/// Category of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
	/// Tree node type.
	Task {
		/// Whether the type itself declares child support.
		composite: bool,
	},
	/// Shared variable type.
	Variable,
	/// Plain nested object type.
	Plain,
	/// Enumeration.
	Enum,
}

impl TypeCategory {
	/// Return stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Task { .. } => "task",
			Self::Variable => "variable",
			Self::Plain => "plain",
			Self::Enum => "enum",
		}
	}
}

/// Registered runtime type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
	/// Qualified type name.
	pub name: Box<str>,
	/// Category.
	pub category: TypeCategory,
	/// Base type name.
	pub base: Option<Box<str>>,
	/// Abstract types are never instantiated.
	pub is_abstract: bool,
	/// Default for the node `Disabled` flag.
	pub disabled_by_default: bool,
	/// Fields declared on this type, excluding inherited ones.
	pub fields: Vec<FieldSlot>,
}

impl TypeSchema {
	/// Unqualified type name.
	pub fn short_name(&self) -> &str {
		short_name(&self.name)
	}

	/// Whether this is a node type.
	pub fn is_task(&self) -> bool {
		matches!(self.category, TypeCategory::Task { .. })
	}
}

/// Name to schema lookup shared by decoders and encoders.
#[derive(Debug, Clone)]
pub struct Registry {
	types: Vec<TypeSchema>,
	by_name: HashMap<Box<str>, usize>,
}

/// Type used for nodes whose stored type cannot be resolved.
pub const UNKNOWN_TASK: &str = "BehaviorDesigner.Runtime.Tasks.UnknownTask";
/// Type used for unresolved nodes that other nodes name as parent.
pub const UNKNOWN_PARENT_TASK: &str = "BehaviorDesigner.Runtime.Tasks.UnknownParentTask";

impl Registry {
	/// Start a registry containing only the core node and variable bases.
	pub fn builder() -> RegistryBuilder {
		builtins::core(RegistryBuilder { types: Vec::new() })
	}

	/// Registry with the core bases and the standard node and variable library.
	pub fn standard() -> Self {
		Self::builder().with_standard().build()
	}

	/// Registered types in registration order.
	pub fn types(&self) -> &[TypeSchema] {
		&self.types
	}

	/// Resolve a qualified or unqualified type name.
	pub fn resolve(&self, name: &str) -> Option<&TypeSchema> {
		let idx = self.by_name.get(name).or_else(|| self.by_name.get(short_name(name)))?;
		self.types.get(*idx)
	}

	/// Resolve a name that must be a node type.
	pub fn resolve_task(&self, name: &str) -> Option<&TypeSchema> {
		self.resolve(name).filter(|schema| schema.is_task())
	}

	/// Resolve a name that must be a shared variable type.
	pub fn resolve_variable(&self, name: &str) -> Option<&TypeSchema> {
		self.resolve(name).filter(|schema| schema.category == TypeCategory::Variable)
	}

	/// Resolve a name or fail with a category-aware error.
	pub fn require(&self, name: &str, category: TypeCategory) -> Result<&TypeSchema> {
		let schema = self.resolve(name).ok_or_else(|| DecodeError::UnknownSchema { name: name.to_owned() })?;
		if std::mem::discriminant(&schema.category) != std::mem::discriminant(&category) {
			return Err(DecodeError::SchemaCategoryMismatch {
				name: name.to_owned(),
				expected: category.as_str(),
				found: schema.category.as_str(),
			});
		}
		Ok(schema)
	}

	/// Placeholder node type for unresolved nodes.
	pub fn unknown_task(&self, is_parent: bool) -> Result<&TypeSchema> {
		let name = if is_parent { UNKNOWN_PARENT_TASK } else { UNKNOWN_TASK };
		self.require(name, TypeCategory::Task { composite: is_parent })
	}

	fn ancestry<'a>(&'a self, schema: &'a TypeSchema) -> Vec<&'a TypeSchema> {
		let mut chain = vec![schema];
		let mut current = schema;
		while let Some(base) = current.base.as_deref() {
			let Some(next) = self.resolve(base) else {
				break;
			};
			if chain.len() > self.types.len() || chain.iter().any(|seen| seen.name == next.name) {
				break;
			}
			chain.push(next);
			current = next;
		}
		chain
	}

	/// All fields of `schema`, inherited ones first.
	pub fn fields<'a>(&'a self, schema: &'a TypeSchema) -> Vec<&'a FieldSlot> {
		self.ancestry(schema).into_iter().rev().flat_map(|item| item.fields.iter()).collect()
	}

	/// Look up one field of `schema` including inherited ones.
	pub fn field<'a>(&'a self, schema: &'a TypeSchema, name: &str) -> Option<&'a FieldSlot> {
		self.ancestry(schema)
			.into_iter()
			.find_map(|item| item.fields.iter().find(|slot| slot.name.as_ref() == name))
	}

	/// Whether nodes of `schema` carry children.
	pub fn is_composite(&self, schema: &TypeSchema) -> bool {
		self.ancestry(schema)
			.iter()
			.any(|item| matches!(item.category, TypeCategory::Task { composite: true }))
	}

	/// Whether instances of `schema` derive from `base`.
	pub fn derives_from(&self, schema: &TypeSchema, base: &str) -> bool {
		self.ancestry(schema)
			.iter()
			.any(|item| item.name.as_ref() == base || item.short_name() == short_name(base))
	}

	/// Whether a declared kind names an abstract registered type.
	pub fn is_abstract_kind(&self, kind: &FieldKind) -> bool {
		match kind {
			FieldKind::Node(name) | FieldKind::Variable(name) | FieldKind::Struct(name) => self.resolve(name).is_some_and(|schema| schema.is_abstract),
			_ => false,
		}
	}

	/// Fields of a freshly constructed instance of `schema`.
	pub fn default_fields(&self, schema: &TypeSchema) -> Vec<FieldValue> {
		self.fields(schema)
			.into_iter()
			.map(|slot| FieldValue {
				name: slot.name.clone(),
				value: slot.default.clone(),
			})
			.collect()
	}
}

/// Incremental [`Registry`] constructor.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	types: Vec<TypeSchema>,
}

impl RegistryBuilder {
	fn push(mut self, schema: TypeSchema) -> Self {
		self.types.retain(|existing| existing.name != schema.name);
		self.types.push(schema);
		self
	}

	fn with(self, name: &str, category: TypeCategory, base: Option<&str>, build: impl FnOnce(TypeBuilder) -> TypeBuilder) -> Self {
		let builder = TypeBuilder {
			schema: TypeSchema {
				name: name.into(),
				category,
				base: base.map(Into::into),
				is_abstract: false,
				disabled_by_default: false,
				fields: Vec::new(),
			},
		};
		self.push(build(builder).schema)
	}

	fn abstract_root(self, name: &str, category: TypeCategory) -> Self {
		self.with(name, category, None, |ty| ty.abstract_type())
	}

	/// Add the standard node and variable library.
	pub fn with_standard(self) -> Self {
		builtins::standard(self)
	}

	/// Register a leaf node type deriving from `Task` unless overridden.
	pub fn task(self, name: &str, build: impl FnOnce(TypeBuilder) -> TypeBuilder) -> Self {
		self.with(name, TypeCategory::Task { composite: false }, Some(builtins::TASK), build)
	}

	/// Register a child-bearing node type deriving from `ParentTask` unless overridden.
	pub fn composite(self, name: &str, build: impl FnOnce(TypeBuilder) -> TypeBuilder) -> Self {
		self.with(name, TypeCategory::Task { composite: true }, Some(builtins::PARENT_TASK), build)
	}

	/// Register a shared variable type holding one `mValue` of `value_kind`.
	pub fn variable(self, name: &str, value_kind: FieldKind) -> Self {
		self.with(name, TypeCategory::Variable, Some(builtins::SHARED_VARIABLE), |ty| ty.serialized_field("mValue", value_kind))
	}

	/// Register a plain nested object type.
	pub fn plain(self, name: &str, build: impl FnOnce(TypeBuilder) -> TypeBuilder) -> Self {
		self.with(name, TypeCategory::Plain, None, build)
	}

	/// Register an enumeration.
	pub fn enumeration(self, name: &str) -> Self {
		self.with(name, TypeCategory::Enum, None, |ty| ty)
	}

	/// Finish the registry.
	pub fn build(self) -> Registry {
		let mut by_name = HashMap::with_capacity(self.types.len() * 2);
		for (idx, schema) in self.types.iter().enumerate() {
			by_name.insert(schema.name.clone(), idx);
		}
		for (idx, schema) in self.types.iter().enumerate() {
			by_name.entry(schema.short_name().into()).or_insert(idx);
		}
		Registry { types: self.types, by_name }
	}
}

/// Field-by-field constructor for one [`TypeSchema`].
#[derive(Debug)]
pub struct TypeBuilder {
	schema: TypeSchema,
}

impl TypeBuilder {
	/// Override the base type.
	pub fn base(mut self, name: &str) -> Self {
		self.schema.base = Some(name.into());
		self
	}

	/// Mark the type abstract.
	pub fn abstract_type(mut self) -> Self {
		self.schema.is_abstract = true;
		self
	}

	/// Nodes of this type start disabled.
	pub fn disabled_by_default(mut self) -> Self {
		self.schema.disabled_by_default = true;
		self
	}

	fn slot(mut self, name: &str, kind: FieldKind, visibility: Visibility, inspect: bool) -> Self {
		let default = kind.default_value();
		self.schema.fields.push(FieldSlot {
			name: name.into(),
			kind,
			visibility,
			inspect,
			default,
		});
		self
	}

	/// Declare a public field.
	pub fn field(self, name: &str, kind: FieldKind) -> Self {
		self.slot(name, kind, Visibility::Public, false)
	}

	/// Declare a non-public field the serializers skip.
	pub fn private_field(self, name: &str, kind: FieldKind) -> Self {
		self.slot(name, kind, Visibility::Private, false)
	}

	/// Declare a non-public field opted into serialization.
	pub fn serialized_field(self, name: &str, kind: FieldKind) -> Self {
		self.slot(name, kind, Visibility::SerializedPrivate, false)
	}

	/// Declare a public field marked non-serialized.
	pub fn non_serialized_field(self, name: &str, kind: FieldKind) -> Self {
		self.slot(name, kind, Visibility::NonSerialized, false)
	}

	/// Declare a public node reference stored inline as a nested object.
	pub fn inspect_field(self, name: &str, kind: FieldKind) -> Self {
		self.slot(name, kind, Visibility::Public, true)
	}

	/// Set the default of the most recently declared field.
	pub fn with_default(mut self, value: Value) -> Self {
		if let Some(slot) = self.schema.fields.last_mut() {
			slot.default = value;
		}
		self
	}
}
