//! Remote object registry.
//!
//! Hands out string object ids for runtime values and keeps every handed-out
//! value alive until it is released, so an inspector can come back for its
//! properties later. Ids come from a per-registry counter and are never
//! reused, which makes a stale id from an earlier page resolve to nothing.

use std::collections::HashMap;

use cdp_bridge_protocol::{PropertyDescriptor, RemoteObject, RemoteObjectSubtype};
use serde::Deserialize;
use tracing::{debug, trace};

use super::classify::classify;
use super::number::{self, number_to_string};
use super::preview::{PreviewOptions, build_preview};
use super::value::{Object, ObjectKind, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions<'a> {
	/// Receiver for getters read through the formatted object. Recorded
	/// with the handle when its id is first allocated.
	pub origin: Option<&'a Object>,
	/// Attach an [`ObjectPreview`](cdp_bridge_protocol::ObjectPreview).
	pub preview: bool,
}

/// `Runtime.getProperties` params.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPropertiesParams {
	pub object_id: String,
	#[serde(default)]
	pub own_properties: bool,
	#[serde(default)]
	pub accessor_properties_only: bool,
	#[serde(default)]
	pub generate_preview: bool,
}

struct Handle {
	value: Value,
	origin: Option<Object>,
}

#[derive(Default)]
pub struct ObjectRegistry {
	last_id: u64,
	/// Keyed by the address of the object or symbol. Handles hold the value
	/// strongly, so an address cannot be reused while mapped.
	ids: HashMap<usize, String>,
	handles: HashMap<String, Handle>,
}

fn identity(value: &Value) -> Option<usize> {
	match value {
		Value::Object(o) => Some(o.addr()),
		Value::Symbol(s) => Some(s.addr()),
		_ => None,
	}
}

impl ObjectRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	fn handle_id(&mut self, key: usize, value: &Value, origin: Option<&Object>) -> String {
		if let Some(id) = self.ids.get(&key) {
			return id.clone();
		}
		self.last_id += 1;
		let id = self.last_id.to_string();
		self.ids.insert(key, id.clone());
		self.handles.insert(
			id.clone(),
			Handle {
				value: value.clone(),
				origin: origin.cloned(),
			},
		);
		trace!(target = "cdp_bridge::runtime", object_id = %id, "allocated object id");
		id
	}

	/// Object id for `value`, allocating on first sight. Primitives get none.
	pub fn object_id_for(&mut self, value: &Value, origin: Option<&Object>) -> Option<String> {
		let key = identity(value)?;
		Some(self.handle_id(key, value, origin))
	}

	/// Object id for `value` without allocating.
	pub fn id_of(&self, value: &Value) -> Option<&str> {
		self.ids.get(&identity(value)?).map(String::as_str)
	}

	pub fn resolve(&self, object_id: &str) -> Option<Value> {
		self.handles.get(object_id).map(|h| h.value.clone())
	}

	/// Drops both directions of the mapping. Unknown ids are ignored.
	pub fn release(&mut self, object_id: &str) {
		let Some(handle) = self.handles.remove(object_id) else {
			trace!(target = "cdp_bridge::runtime", object_id, "release of unknown object id");
			return;
		};
		if let Some(key) = identity(&handle.value) {
			self.ids.remove(&key);
		}
	}

	/// Releases every handle. The id counter keeps counting.
	pub fn reset(&mut self) {
		self.ids.clear();
		self.handles.clear();
	}

	/// Number of live handles.
	pub fn len(&self) -> usize {
		self.handles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handles.is_empty()
	}

	/// Serializes `value` as a `Runtime.RemoteObject`.
	pub fn format(&mut self, value: &Value, options: FormatOptions<'_>) -> RemoteObject {
		let class = classify(value);
		let mut remote = RemoteObject::of_type(class.kind);
		match value {
			Value::Undefined => {}
			Value::Number(n) => {
				remote.value = number::to_json(*n);
				remote.unserializable_value = number::unserializable(*n).map(str::to_string);
				remote.description = Some(number_to_string(*n));
			}
			Value::Bool(b) => remote.value = Some((*b).into()),
			Value::String(s) => remote.value = Some(s.as_str().into()),
			Value::Symbol(symbol) => {
				remote.object_id = Some(self.handle_id(symbol.addr(), value, None));
				remote.description = Some(symbol.to_display_string());
			}
			Value::Null => {
				remote.subtype = class.subtype;
				remote.value = Some(serde_json::Value::Null);
			}
			Value::Object(object) => {
				remote.subtype = class.subtype;
				remote.object_id = Some(self.handle_id(object.addr(), value, options.origin));
				remote.class_name = Some(class_name(object).to_string());
				remote.description = Some(describe(object));
				if options.preview && class.subtype != Some(RemoteObjectSubtype::Node) {
					remote.preview = Some(build_preview(
						object,
						PreviewOptions {
							origin: options.origin,
							..PreviewOptions::default()
						},
					));
				}
			}
		}
		remote
	}

	/// Lists the properties of the handle's value, or of its prototype when
	/// `own_properties` is false, followed by a synthetic `__proto__` entry
	/// for the listed object's own prototype.
	///
	/// Unknown ids and symbols yield an empty list. A throwing getter leaves
	/// that property without a value.
	pub fn get_properties(&mut self, params: &GetPropertiesParams) -> Vec<PropertyDescriptor> {
		let Some(handle) = self.handles.get(&params.object_id) else {
			debug!(target = "cdp_bridge::runtime", object_id = %params.object_id, "getProperties for unknown object id");
			return Vec::new();
		};
		let Value::Object(object) = handle.value.clone() else {
			return Vec::new();
		};
		let origin = handle.origin.clone().unwrap_or_else(|| object.clone());

		let target = if params.own_properties {
			Some(object.clone())
		} else {
			object.prototype()
		};
		let Some(target) = target else {
			return Vec::new();
		};

		let options = FormatOptions {
			origin: None,
			preview: params.generate_preview,
		};
		let mut descriptors = Vec::new();
		for name in target.own_keys() {
			if name == "__proto__" {
				continue;
			}
			let Some(property) = target.own_property(&name) else {
				continue;
			};
			if params.accessor_properties_only && !property.is_accessor() {
				continue;
			}
			let is_own = params.own_properties || object.has_own(&name);
			let value = match property.read(&origin) {
				Ok(value) => Some(self.format(&value, options)),
				Err(err) => {
					debug!(target = "cdp_bridge::runtime", property = %name, error = %err, "getter threw during enumeration");
					None
				}
			};
			descriptors.push(PropertyDescriptor {
				name,
				configurable: property.configurable(),
				enumerable: property.enumerable(),
				writable: property.writable(),
				is_own,
				value,
			});
		}

		if let Some(prototype) = target.prototype() {
			let value = self.format(
				&Value::Object(prototype),
				FormatOptions {
					origin: Some(&origin),
					preview: false,
				},
			);
			descriptors.push(PropertyDescriptor {
				name: "__proto__".into(),
				configurable: true,
				enumerable: false,
				writable: Some(true),
				is_own: true,
				value: Some(value),
			});
		}
		descriptors
	}
}

fn class_name(object: &Object) -> &str {
	match object.kind() {
		ObjectKind::Function { .. } => "Function",
		ObjectKind::Array => "Array",
		ObjectKind::Error { .. } => "Error",
		_ => object.class_name(),
	}
}

fn describe(object: &Object) -> String {
	match object.kind() {
		ObjectKind::Function { source } => source.clone(),
		ObjectKind::Array => format!("Array({})", object.length().unwrap_or(0)),
		ObjectKind::Error {
			name,
			message,
			stack,
		} => stack.clone().unwrap_or_else(|| format!("{name}: {message}")),
		_ => object.class_name().to_string(),
	}
}
