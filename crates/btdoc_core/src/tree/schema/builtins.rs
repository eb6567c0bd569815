use std::sync::Arc;

use crate::tree::{FieldKind, RegistryBuilder, SharedVariable, TypeCategory, UNKNOWN_PARENT_TASK, UNKNOWN_TASK, Value};

pub(super) const TASK: &str = "BehaviorDesigner.Runtime.Tasks.Task";
pub(super) const PARENT_TASK: &str = "BehaviorDesigner.Runtime.Tasks.ParentTask";
pub(super) const SHARED_VARIABLE: &str = "BehaviorDesigner.Runtime.SharedVariable";

const TASKS: &str = "BehaviorDesigner.Runtime.Tasks";
const RUNTIME: &str = "BehaviorDesigner.Runtime";

fn task_name(name: &str) -> String {
	format!("{TASKS}.{name}")
}

fn runtime_name(name: &str) -> String {
	format!("{RUNTIME}.{name}")
}

pub(super) fn core(builder: RegistryBuilder) -> RegistryBuilder {
	builder
		.abstract_root(TASK, TypeCategory::Task { composite: false })
		.composite(PARENT_TASK, |ty| ty.base(TASK).abstract_type())
		.task(&task_name("Action"), |ty| ty.abstract_type())
		.task(&task_name("Conditional"), |ty| ty.abstract_type())
		.composite(&task_name("Composite"), |ty| {
			ty.abstract_type()
				.field("abortType", FieldKind::enumeration(&task_name("AbortType")))
		})
		.composite(&task_name("Decorator"), |ty| ty.abstract_type())
		.composite(&task_name("EntryTask"), |ty| ty)
		.task(UNKNOWN_TASK, |ty| ty)
		.composite(UNKNOWN_PARENT_TASK, |ty| ty)
		.enumeration(&task_name("AbortType"))
		.abstract_root(SHARED_VARIABLE, TypeCategory::Variable)
}

pub(super) fn standard(builder: RegistryBuilder) -> RegistryBuilder {
	let variables = [
		("SharedBool", FieldKind::Bool),
		("SharedInt", FieldKind::Int),
		("SharedFloat", FieldKind::Float),
		("SharedString", FieldKind::String),
		("SharedVector2", FieldKind::Vector2),
		("SharedVector3", FieldKind::Vector3),
		("SharedVector4", FieldKind::Vector4),
		("SharedQuaternion", FieldKind::Quaternion),
		("SharedColor", FieldKind::Color),
		("SharedRect", FieldKind::Rect),
		("SharedAnimationCurve", FieldKind::AnimationCurve),
		("SharedGameObject", FieldKind::host_object("UnityEngine.GameObject")),
		("SharedTransform", FieldKind::host_object("UnityEngine.Transform")),
		("SharedObject", FieldKind::host_object("UnityEngine.Object")),
		("SharedGameObjectList", FieldKind::list(FieldKind::host_object("UnityEngine.GameObject"))),
	];
	let builder = variables
		.into_iter()
		.fold(builder, |builder, (name, kind)| builder.variable(&runtime_name(name), kind));

	let one_second = Value::Variable(Arc::new(SharedVariable::with_value(&runtime_name("SharedFloat"), Value::Float(1.0))));

	builder
		.composite(&task_name("Sequence"), |ty| ty.base(&task_name("Composite")))
		.composite(&task_name("Selector"), |ty| ty.base(&task_name("Composite")))
		.composite(&task_name("Parallel"), |ty| ty.base(&task_name("Composite")))
		.composite(&task_name("Inverter"), |ty| ty.base(&task_name("Decorator")))
		.composite(&task_name("Repeater"), |ty| {
			ty.base(&task_name("Decorator"))
				.field("count", FieldKind::variable(&runtime_name("SharedInt")))
				.field("repeatForever", FieldKind::variable(&runtime_name("SharedBool")))
				.field("endOnFailure", FieldKind::variable(&runtime_name("SharedBool")))
		})
		.composite(&task_name("ConditionalEvaluator"), |ty| {
			ty.base(&task_name("Decorator"))
				.field("reevaluate", FieldKind::variable(&runtime_name("SharedBool")))
				.inspect_field("conditionalTask", FieldKind::node(&task_name("Conditional")))
				.field("graphLabel", FieldKind::String)
		})
		.task(&task_name("Wait"), |ty| {
			ty.base(&task_name("Action"))
				.field("waitTime", FieldKind::variable(&runtime_name("SharedFloat")))
				.with_default(one_second)
				.field("randomWait", FieldKind::variable(&runtime_name("SharedBool")))
				.field("randomWaitMin", FieldKind::variable(&runtime_name("SharedFloat")))
				.field("randomWaitMax", FieldKind::variable(&runtime_name("SharedFloat")))
				.private_field("waitDuration", FieldKind::Float)
				.private_field("startTime", FieldKind::Float)
		})
		.task(&task_name("Idle"), |ty| ty.base(&task_name("Action")))
		.task(&task_name("Log"), |ty| {
			ty.base(&task_name("Action"))
				.field("text", FieldKind::variable(&runtime_name("SharedString")))
				.field("logError", FieldKind::variable(&runtime_name("SharedBool")))
		})
		.task(&task_name("SendEvent"), |ty| {
			ty.base(&task_name("Action"))
				.field("targetGameObject", FieldKind::variable(&runtime_name("SharedGameObject")))
				.field("eventName", FieldKind::variable(&runtime_name("SharedString")))
		})
		.task(&task_name("CompareSharedFloat"), |ty| {
			ty.base(&task_name("Conditional"))
				.field("variable", FieldKind::variable(&runtime_name("SharedFloat")))
				.field("compareTo", FieldKind::variable(&runtime_name("SharedFloat")))
		})
		.task(&task_name("StackedAction"), |ty| {
			ty.base(&task_name("Action"))
				.field("actions", FieldKind::array(FieldKind::node(&task_name("Action"))))
				.field("comparisonType", FieldKind::Int)
				.field("graphLabel", FieldKind::String)
		})
}
