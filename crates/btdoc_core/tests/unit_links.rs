#![allow(missing_docs)]

use std::sync::Arc;

use btdoc::tree::{
	DecodeContext, Document, EncodeOptions, FieldKind, FieldValue, FormatVersion, NodeId, NodeLink, ObjectValue, OwnerId, Registry, SharedVariable, TreeEncoder, Value, decode_tree,
	relink_foreign,
};

const FORMATS: [FormatVersion; 2] = [FormatVersion::Legacy, FormatVersion::Current { per_element_hash: true }];

fn follow_registry() -> Registry {
	Registry::builder()
		.with_standard()
		.task("Game.Tasks.Follow", |ty| ty.base("BehaviorDesigner.Runtime.Tasks.Action").field("leader", FieldKind::node("BehaviorDesigner.Runtime.Tasks.Task")))
		.build()
}

fn round_trip(registry: &Registry, doc: &Document, format: FormatVersion, owner: OwnerId) -> Document {
	let options = EncodeOptions { format, index_map: true };
	let data = TreeEncoder::new(registry, options).encode_tree(doc).expect("encode");
	let mut ctx = DecodeContext::new(registry);
	ctx.options.owner = owner;
	decode_tree(&data, &ctx).expect("decode")
}

fn float_variable(registry: &Registry, value: f32) -> Value {
	let schema = registry.resolve_variable("SharedFloat").expect("SharedFloat");
	let mut variable = SharedVariable::blank(registry, schema);
	variable.set_value(Value::Float(value));
	Value::Variable(Arc::new(variable))
}

#[test]
fn links_to_later_nodes_resolve_after_the_pass() {
	let registry = follow_registry();
	let mut doc = Document::new(OwnerId(1));
	doc.add_node(&registry, "EntryTask").expect("entry");
	let sequence = doc.add_node(&registry, "Sequence").expect("sequence");
	let follow = doc.add_node(&registry, "Game.Tasks.Follow").expect("follow");
	let stacked = doc.add_node(&registry, "StackedAction").expect("stacked");
	let wait = doc.add_node(&registry, "Wait").expect("wait");
	let idle = doc.add_node(&registry, "Idle").expect("idle");
	doc.set_root(sequence).expect("root");
	doc.add_child(sequence, follow).expect("follow child");
	doc.add_child(sequence, stacked).expect("stacked child");
	doc.add_child(sequence, wait).expect("wait child");

	let leader = doc.link(wait).expect("wait link");
	let actions = vec![Value::Node(doc.link(wait).expect("wait link")), Value::Node(doc.link(idle).expect("idle link"))];
	doc.node_mut(follow).expect("follow").set_field("leader", Value::Node(leader));
	doc.node_mut(stacked).expect("stacked").set_field("actions", Value::Array(actions));

	for format in FORMATS {
		let decoded = round_trip(&registry, &doc, format, OwnerId(1));
		let leader = decoded.node(follow).expect("follow").field("leader").and_then(Value::as_node).copied();
		assert_eq!(leader.map(|link| link.node), Some(wait), "{}", format.as_str());

		let actions = decoded.node(stacked).expect("stacked").field("actions").and_then(Value::as_items).expect("actions");
		let targets: Vec<NodeId> = actions.iter().filter_map(Value::as_node).map(|link| link.node).collect();
		assert_eq!(targets, [wait, idle]);
		assert_eq!(decoded.detached, [idle]);
		assert_eq!(decoded.node(sequence).expect("sequence").children(), [follow, stacked, wait]);
	}
}

fn route_registry() -> Registry {
	Registry::builder()
		.with_standard()
		.plain("Game.Tasks.Waypoint", |ty| ty.field("target", FieldKind::node("BehaviorDesigner.Runtime.Tasks.Task")))
		.task("Game.Tasks.Route", |ty| {
			ty.base("BehaviorDesigner.Runtime.Tasks.Action")
				.field("waypoint", FieldKind::structure("Game.Tasks.Waypoint"))
				.field("points", FieldKind::list(FieldKind::structure("Game.Tasks.Waypoint")))
		})
		.build()
}

fn waypoint(target: NodeLink) -> Value {
	Value::Object(ObjectValue {
		type_name: "Game.Tasks.Waypoint".into(),
		fields: vec![FieldValue {
			name: "target".into(),
			value: Value::Node(target),
		}],
	})
}

fn waypoint_target(value: &Value) -> Option<NodeId> {
	match value {
		Value::Object(object) => object.get("target").and_then(Value::as_node).map(|link| link.node),
		_ => None,
	}
}

#[test]
fn links_inside_structs_and_struct_lists_resolve() {
	let registry = route_registry();
	let mut doc = Document::new(OwnerId(1));
	doc.add_node(&registry, "EntryTask").expect("entry");
	let sequence = doc.add_node(&registry, "Sequence").expect("sequence");
	let route = doc.add_node(&registry, "Game.Tasks.Route").expect("route");
	let idle = doc.add_node(&registry, "Idle").expect("idle");
	let wait = doc.add_node(&registry, "Wait").expect("wait");
	doc.set_root(sequence).expect("root");
	doc.add_child(sequence, route).expect("route child");
	doc.add_child(sequence, idle).expect("idle child");
	doc.add_child(sequence, wait).expect("wait child");

	let points = vec![waypoint(doc.link(idle).expect("idle link")), waypoint(doc.link(wait).expect("wait link"))];
	let single = waypoint(doc.link(wait).expect("wait link"));
	let node = doc.node_mut(route).expect("route");
	node.set_field("waypoint", single);
	node.set_field("points", Value::List(points));

	for format in FORMATS {
		let decoded = round_trip(&registry, &doc, format, OwnerId(1));
		let node = decoded.node(route).expect("route");
		assert_eq!(node.field("waypoint").and_then(waypoint_target), Some(wait), "{}", format.as_str());

		let points = node.field("points").and_then(Value::as_items).expect("points");
		let targets: Vec<Option<NodeId>> = points.iter().map(waypoint_target).collect();
		assert_eq!(targets, [Some(idle), Some(wait)], "{}", format.as_str());
	}
}

#[test]
fn inline_inspected_nodes_round_trip() {
	let registry = Registry::standard();
	let mut doc = Document::new(OwnerId(1));
	doc.add_node(&registry, "EntryTask").expect("entry");
	let evaluator = doc.add_node(&registry, "ConditionalEvaluator").expect("evaluator");
	let idle = doc.add_node(&registry, "Idle").expect("idle");
	doc.set_root(evaluator).expect("root");
	doc.add_child(evaluator, idle).expect("child");

	let compare = ObjectValue {
		type_name: "BehaviorDesigner.Runtime.Tasks.CompareSharedFloat".into(),
		fields: vec![
			FieldValue {
				name: "variable".into(),
				value: float_variable(&registry, 1.0),
			},
			FieldValue {
				name: "compareTo".into(),
				value: float_variable(&registry, 2.0),
			},
		],
	};
	let node = doc.node_mut(evaluator).expect("evaluator");
	node.set_field("conditionalTask", Value::Object(compare.clone()));
	node.set_field("graphLabel", Value::String("(CompareSharedFloat)".to_owned()));

	for format in FORMATS {
		let decoded = round_trip(&registry, &doc, format, OwnerId(1));
		let node = decoded.node(evaluator).expect("evaluator");
		assert_eq!(node.field("conditionalTask"), Some(&Value::Object(compare.clone())), "{}", format.as_str());
		assert_eq!(node.field("graphLabel").and_then(Value::as_str), Some("(CompareSharedFloat)"));
		assert_eq!(node.children(), [idle]);
	}
}

#[test]
fn foreign_links_are_relinked_by_reference_id() {
	let registry = follow_registry();
	let mut doc = Document::new(OwnerId(1));
	doc.add_node(&registry, "EntryTask").expect("entry");
	let follow = doc.add_node(&registry, "Game.Tasks.Follow").expect("follow");
	let wait = doc.add_node(&registry, "Wait").expect("wait");
	doc.set_root(follow).expect("root");

	let mut decoded = round_trip(&registry, &doc, FormatVersion::Current { per_element_hash: true }, OwnerId(7));
	let foreign = NodeLink {
		owner: OwnerId(99),
		node: NodeId(40),
		reference_id: wait.0 as i32,
	};
	decoded.node_mut(follow).expect("follow").set_field("leader", Value::Node(foreign));

	let task_list: Vec<NodeLink> = (0..decoded.nodes.len()).map(|idx| decoded.link(NodeId(idx)).expect("link")).collect();
	assert_eq!(relink_foreign(&mut decoded, &task_list), 1);
	let leader = decoded.node(follow).expect("follow").field("leader").and_then(Value::as_node).copied();
	assert_eq!(leader, Some(NodeLink {
		owner: OwnerId(7),
		node: wait,
		reference_id: wait.0 as i32,
	}));
	assert_eq!(decoded.detached, [wait]);
	assert_eq!(decoded.find_by_id(wait.0 as i32), Some(wait));
}
