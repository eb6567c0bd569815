use std::sync::Arc;

use crate::tree::value::{find_field, set_field};
use crate::tree::{FieldValue, HostObject, OwnerId, Registry, TypeSchema, Value};

/// Field holding a shared variable's current value.
pub const VALUE_FIELD: &str = "mValue";

/// Named, typed value that several node fields may share by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedVariable {
	/// Variable name, unique within its pool.
	pub name: String,
	/// Registered variable type name.
	pub type_name: Box<str>,
	/// Whether the variable is bound to a pool entry.
	pub is_shared: bool,
	/// Whether the pool is the global variable pool.
	pub is_global: bool,
	/// Network synchronization flag.
	pub network_sync: bool,
	/// Property path the variable mirrors.
	pub property_mapping: Option<String>,
	/// Host object owning the mapped property.
	pub property_mapping_owner: Option<HostObject>,
	/// Declared fields, including the value field.
	pub fields: Vec<FieldValue>,
}

impl SharedVariable {
	/// Unnamed variable holding `value`.
	pub fn with_value(type_name: &str, value: Value) -> Self {
		Self {
			name: String::new(),
			type_name: type_name.into(),
			is_shared: false,
			is_global: false,
			network_sync: false,
			property_mapping: None,
			property_mapping_owner: None,
			fields: vec![FieldValue {
				name: VALUE_FIELD.into(),
				value,
			}],
		}
	}

	/// Freshly constructed variable of `schema`.
	pub fn blank(registry: &Registry, schema: &TypeSchema) -> Self {
		Self {
			fields: registry.default_fields(schema),
			..Self::with_value(&schema.name, Value::Null)
		}
	}

	/// Named, pool-bound variable of `schema` holding `value`.
	pub fn named(registry: &Registry, schema: &TypeSchema, name: &str, value: Value) -> Self {
		let mut variable = Self::blank(registry, schema);
		variable.name = name.to_owned();
		variable.is_shared = true;
		variable.set_value(value);
		variable
	}

	/// Current value.
	pub fn value(&self) -> Option<&Value> {
		find_field(&self.fields, VALUE_FIELD)
	}

	/// Replace the current value.
	pub fn set_value(&mut self, value: Value) {
		set_field(&mut self.fields, VALUE_FIELD, value);
	}
}

/// Name-addressed pool of shared variables.
pub trait VariableSource {
	/// Look up a variable by name.
	fn get_variable(&self, name: &str) -> Option<Arc<SharedVariable>>;
}

impl VariableSource for [Arc<SharedVariable>] {
	fn get_variable(&self, name: &str) -> Option<Arc<SharedVariable>> {
		self.iter().find(|variable| variable.name == name).cloned()
	}
}

/// Process-wide variable pool decoded from a global-variable document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalVariables {
	/// Variables in stored order.
	pub variables: Vec<Arc<SharedVariable>>,
}

impl VariableSource for GlobalVariables {
	fn get_variable(&self, name: &str) -> Option<Arc<SharedVariable>> {
		self.variables.get_variable(name)
	}
}

/// Host hook run on every freshly constructed non-global variable.
pub trait PropertyMapper {
	/// Bind the variable's property mapping for the owning document.
	fn initialize(&self, variable: &mut SharedVariable, owner: OwnerId);
}
