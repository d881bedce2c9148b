//! Runtime values of the inspected page.
//!
//! [`Object`] and [`Symbol`] are shared handles compared by identity.
//! Everything else is a plain primitive.

use std::fmt;
use std::sync::Arc;

use cdp_bridge_protocol::dom::{
	COMMENT_NODE, DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE, DOCUMENT_TYPE_NODE, ELEMENT_NODE,
	TEXT_NODE,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use thiserror::Error;

use super::number::number_to_string;
use crate::dom::Node;

/// Exception raised by a getter.
#[derive(Debug, Clone, Error)]
#[error("uncaught exception: {0}")]
pub struct Thrown(pub String);

/// Getter invoked with the receiver the property is read through.
pub type Getter = Arc<dyn Fn(&Object) -> Result<Value, Thrown> + Send + Sync>;

#[derive(Clone)]
pub enum Value {
	Undefined,
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Symbol(Symbol),
	Object(Object),
}

impl Value {
	/// `String(value)` for primitives. Objects render as their class name.
	pub fn to_display_string(&self) -> String {
		match self {
			Value::Undefined => "undefined".into(),
			Value::Null => "null".into(),
			Value::Bool(b) => b.to_string(),
			Value::Number(n) => number_to_string(*n),
			Value::String(s) => s.clone(),
			Value::Symbol(s) => s.to_display_string(),
			Value::Object(o) => o.class_name().to_string(),
		}
	}

	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Value::Object(o) => Some(o),
			_ => None,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::String(s) => write!(f, "{s:?}"),
			Value::Object(o) => fmt::Debug::fmt(o, f),
			other => f.write_str(&other.to_display_string()),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<f64> for Value {
	fn from(n: f64) -> Self {
		Value::Number(n)
	}
}

impl From<i32> for Value {
	fn from(n: i32) -> Self {
		Value::Number(n.into())
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<Object> for Value {
	fn from(o: Object) -> Self {
		Value::Object(o)
	}
}

impl From<Symbol> for Value {
	fn from(s: Symbol) -> Self {
		Value::Symbol(s)
	}
}

#[derive(Clone)]
pub struct Symbol(Arc<Option<String>>);

impl Symbol {
	pub fn new(description: Option<&str>) -> Self {
		Symbol(Arc::new(description.map(str::to_string)))
	}

	pub fn description(&self) -> Option<&str> {
		self.0.as_deref()
	}

	/// `Symbol(description)`.
	pub fn to_display_string(&self) -> String {
		format!("Symbol({})", self.description().unwrap_or_default())
	}

	pub(crate) fn addr(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}
}

/// Built-in behavior of an object, standing in for its internal slots.
#[derive(Clone, Debug)]
pub enum ObjectKind {
	Plain,
	Array,
	Function { source: String },
	Error { name: String, message: String, stack: Option<String> },
	/// Carries the result of `Date.prototype.toString`.
	Date(String),
	RegExp { source: String, flags: String },
	Map,
	Set,
	WeakMap,
	WeakSet,
	Proxy,
	Promise,
	ArrayBuffer,
	Iterator,
	Generator,
	Node(Node),
}

#[derive(Clone)]
pub enum Property {
	Data {
		value: Value,
		writable: bool,
		enumerable: bool,
		configurable: bool,
	},
	Accessor {
		getter: Option<Getter>,
		has_setter: bool,
		enumerable: bool,
		configurable: bool,
	},
}

impl Property {
	/// Writable, enumerable, configurable data property.
	pub fn data(value: impl Into<Value>) -> Self {
		Property::Data {
			value: value.into(),
			writable: true,
			enumerable: true,
			configurable: true,
		}
	}

	/// Enumerable, configurable getter without a setter.
	pub fn getter(f: impl Fn(&Object) -> Result<Value, Thrown> + Send + Sync + 'static) -> Self {
		Property::Accessor {
			getter: Some(Arc::new(f)),
			has_setter: false,
			enumerable: true,
			configurable: true,
		}
	}

	pub fn is_accessor(&self) -> bool {
		matches!(self, Property::Accessor { .. })
	}

	pub fn enumerable(&self) -> bool {
		match self {
			Property::Data { enumerable, .. } | Property::Accessor { enumerable, .. } => *enumerable,
		}
	}

	pub fn configurable(&self) -> bool {
		match self {
			Property::Data { configurable, .. } | Property::Accessor { configurable, .. } => {
				*configurable
			}
		}
	}

	/// `None` for accessors.
	pub fn writable(&self) -> Option<bool> {
		match self {
			Property::Data { writable, .. } => Some(*writable),
			Property::Accessor { .. } => None,
		}
	}

	/// Reads the property as seen through `receiver`.
	pub fn read(&self, receiver: &Object) -> Result<Value, Thrown> {
		match self {
			Property::Data { value, .. } => Ok(value.clone()),
			Property::Accessor {
				getter: Some(getter),
				..
			} => getter(receiver),
			Property::Accessor { getter: None, .. } => Ok(Value::Undefined),
		}
	}
}

struct ObjectInner {
	kind: ObjectKind,
	class_name: String,
	prototype: RwLock<Option<Object>>,
	properties: RwLock<IndexMap<String, Property>>,
}

#[derive(Clone)]
pub struct Object(Arc<ObjectInner>);

impl Object {
	pub fn new(kind: ObjectKind, class_name: &str) -> Self {
		Object(Arc::new(ObjectInner {
			kind,
			class_name: class_name.to_string(),
			prototype: RwLock::new(None),
			properties: RwLock::new(IndexMap::new()),
		}))
	}

	pub fn plain() -> Self {
		Self::new(ObjectKind::Plain, "Object")
	}

	/// Array with index properties and a non-enumerable `length`.
	pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
		let array = Self::new(ObjectKind::Array, "Array");
		let mut len = 0;
		for (i, item) in items.into_iter().enumerate() {
			array.set(&i.to_string(), item);
			len = i + 1;
		}
		array.define(
			"length",
			Property::Data {
				value: Value::Number(len as f64),
				writable: true,
				enumerable: false,
				configurable: false,
			},
		);
		array
	}

	pub fn function(name: &str, source: &str) -> Self {
		let function = Self::new(
			ObjectKind::Function {
				source: source.to_string(),
			},
			"Function",
		);
		function.define(
			"name",
			Property::Data {
				value: name.into(),
				writable: false,
				enumerable: false,
				configurable: true,
			},
		);
		function
	}

	pub fn error(name: &str, message: &str, stack: Option<&str>) -> Self {
		let error = Self::new(
			ObjectKind::Error {
				name: name.to_string(),
				message: message.to_string(),
				stack: stack.map(str::to_string),
			},
			name,
		);
		error.define(
			"message",
			Property::Data {
				value: message.into(),
				writable: true,
				enumerable: false,
				configurable: true,
			},
		);
		error
	}

	/// Wraps a DOM node. The class name follows the DOM interface.
	pub fn node(node: &Node) -> Self {
		let class_name = match node.node_type() {
			ELEMENT_NODE => "HTMLElement",
			TEXT_NODE => "Text",
			COMMENT_NODE => "Comment",
			DOCUMENT_NODE => "HTMLDocument",
			DOCUMENT_TYPE_NODE => "DocumentType",
			DOCUMENT_FRAGMENT_NODE => "DocumentFragment",
			_ => "Node",
		};
		Self::new(ObjectKind::Node(node.clone()), class_name)
	}

	/// Builder form of [`set`](Self::set).
	pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
		self.set(name, value);
		self
	}

	/// Builder form of [`set_prototype`](Self::set_prototype).
	pub fn with_prototype(self, prototype: &Object) -> Self {
		self.set_prototype(Some(prototype.clone()));
		self
	}

	pub fn ptr_eq(&self, other: &Object) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn addr(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}

	pub fn kind(&self) -> &ObjectKind {
		&self.0.kind
	}

	/// Constructor name.
	pub fn class_name(&self) -> &str {
		&self.0.class_name
	}

	pub fn prototype(&self) -> Option<Object> {
		self.0.prototype.read().clone()
	}

	pub fn set_prototype(&self, prototype: Option<Object>) {
		*self.0.prototype.write() = prototype;
	}

	/// Assigns a writable, enumerable, configurable data property.
	pub fn set(&self, name: &str, value: impl Into<Value>) {
		self.define(name, Property::data(value));
	}

	pub fn define(&self, name: &str, property: Property) {
		self.0.properties.write().insert(name.to_string(), property);
	}

	pub fn delete(&self, name: &str) -> bool {
		self.0.properties.write().shift_remove(name).is_some()
	}

	pub fn own_property(&self, name: &str) -> Option<Property> {
		self.0.properties.read().get(name).cloned()
	}

	pub fn has_own(&self, name: &str) -> bool {
		self.0.properties.read().contains_key(name)
	}

	/// All own property names in definition order.
	pub fn own_keys(&self) -> Vec<String> {
		self.0.properties.read().keys().cloned().collect()
	}

	/// Own enumerable property names in definition order.
	pub fn own_enumerable_keys(&self) -> Vec<String> {
		self.0
			.properties
			.read()
			.iter()
			.filter(|(_, p)| p.enumerable())
			.map(|(k, _)| k.clone())
			.collect()
	}

	/// Reads an own property through `receiver`. Missing keys read as
	/// `undefined`.
	pub fn get_own(&self, name: &str, receiver: &Object) -> Result<Value, Thrown> {
		match self.own_property(name) {
			Some(property) => property.read(receiver),
			None => Ok(Value::Undefined),
		}
	}

	/// Value of the own `length` data property, if numeric.
	pub fn length(&self) -> Option<usize> {
		match self.own_property("length")? {
			Property::Data {
				value: Value::Number(n),
				..
			} if n >= 0.0 => Some(n as usize),
			_ => None,
		}
	}
}

impl fmt::Debug for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Object")
			.field("class_name", &self.0.class_name)
			.field("kind", &self.0.kind)
			.finish_non_exhaustive()
	}
}
