//! Type and subtype classification of runtime values.

use cdp_bridge_protocol::dom::{COMMENT_NODE, DOCUMENT_NODE, ELEMENT_NODE};
use cdp_bridge_protocol::{RemoteObjectSubtype, RemoteObjectType};

use super::value::{ObjectKind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
	pub kind: RemoteObjectType,
	/// [`None`] for plain objects and primitives.
	pub subtype: Option<RemoteObjectSubtype>,
}

impl Classification {
	fn of(kind: RemoteObjectType) -> Self {
		Self {
			kind,
			subtype: None,
		}
	}

	fn object(subtype: RemoteObjectSubtype) -> Self {
		Self {
			kind: RemoteObjectType::Object,
			subtype: Some(subtype),
		}
	}
}

pub fn classify(value: &Value) -> Classification {
	let object = match value {
		Value::Undefined => return Classification::of(RemoteObjectType::Undefined),
		Value::Null => return Classification::object(RemoteObjectSubtype::Null),
		Value::Bool(_) => return Classification::of(RemoteObjectType::Boolean),
		Value::Number(_) => return Classification::of(RemoteObjectType::Number),
		Value::String(_) => return Classification::of(RemoteObjectType::String),
		Value::Symbol(_) => return Classification::of(RemoteObjectType::Symbol),
		Value::Object(object) => object,
	};

	let subtype = match object.kind() {
		ObjectKind::Function { .. } => return Classification::of(RemoteObjectType::Function),
		ObjectKind::Plain => return Classification::of(RemoteObjectType::Object),
		// Only elements, comments and documents count as inspectable nodes.
		ObjectKind::Node(node) => match node.node_type() {
			ELEMENT_NODE | COMMENT_NODE | DOCUMENT_NODE => RemoteObjectSubtype::Node,
			_ => return Classification::of(RemoteObjectType::Object),
		},
		ObjectKind::Array => RemoteObjectSubtype::Array,
		ObjectKind::Error { .. } => RemoteObjectSubtype::Error,
		ObjectKind::Date(_) => RemoteObjectSubtype::Date,
		ObjectKind::RegExp { .. } => RemoteObjectSubtype::RegExp,
		ObjectKind::Map => RemoteObjectSubtype::Map,
		ObjectKind::Set => RemoteObjectSubtype::Set,
		ObjectKind::WeakMap => RemoteObjectSubtype::WeakMap,
		ObjectKind::WeakSet => RemoteObjectSubtype::WeakSet,
		ObjectKind::Proxy => RemoteObjectSubtype::Proxy,
		ObjectKind::Promise => RemoteObjectSubtype::Promise,
		ObjectKind::ArrayBuffer => RemoteObjectSubtype::ArrayBuffer,
		ObjectKind::Iterator => RemoteObjectSubtype::Iterator,
		ObjectKind::Generator => RemoteObjectSubtype::Generator,
	};
	Classification::object(subtype)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Node;
	use crate::runtime::value::{Object, Symbol};

	#[test]
	fn primitives_have_no_subtype() {
		assert_eq!(classify(&Value::Undefined).kind, RemoteObjectType::Undefined);
		assert_eq!(classify(&1.into()).kind, RemoteObjectType::Number);
		assert_eq!(classify(&"s".into()).kind, RemoteObjectType::String);
		assert_eq!(classify(&true.into()).kind, RemoteObjectType::Boolean);
		let sym = classify(&Symbol::new(None).into());
		assert_eq!(sym.kind, RemoteObjectType::Symbol);
		assert!(sym.subtype.is_none());
	}

	#[test]
	fn null_is_an_object_with_null_subtype() {
		let c = classify(&Value::Null);
		assert_eq!(c.kind, RemoteObjectType::Object);
		assert_eq!(c.subtype, Some(RemoteObjectSubtype::Null));
	}

	#[test]
	fn objects_classified_by_kind() {
		let cases = [
			(Object::array(Vec::<Value>::new()), Some(RemoteObjectSubtype::Array)),
			(Object::plain(), None),
			(Object::error("TypeError", "x", None), Some(RemoteObjectSubtype::Error)),
			(Object::new(ObjectKind::WeakSet, "WeakSet"), Some(RemoteObjectSubtype::WeakSet)),
			(Object::new(ObjectKind::Date("d".into()), "Date"), Some(RemoteObjectSubtype::Date)),
		];
		for (object, subtype) in cases {
			let c = classify(&object.clone().into());
			assert_eq!(c.kind, RemoteObjectType::Object, "{object:?}");
			assert_eq!(c.subtype, subtype, "{object:?}");
		}
		let f = classify(&Object::function("f", "function f() {}").into());
		assert_eq!(f.kind, RemoteObjectType::Function);
	}

	#[test]
	fn only_element_comment_and_document_nodes_are_nodes() {
		let el = classify(&Object::node(&Node::element("div")).into());
		assert_eq!(el.subtype, Some(RemoteObjectSubtype::Node));
		let doc = classify(&Object::node(&Node::document()).into());
		assert_eq!(doc.subtype, Some(RemoteObjectSubtype::Node));
		let text = classify(&Object::node(&Node::text("x")).into());
		assert_eq!(text.subtype, None);
	}
}
