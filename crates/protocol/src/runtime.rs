//! `Runtime` domain records.

use serde::{Deserialize, Serialize};

/// Primitive classification of a runtime value (`RemoteObject.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectType {
	Undefined,
	Number,
	String,
	Boolean,
	Symbol,
	Function,
	Object,
	/// Only appears in [`PropertyPreview`]s, for properties whose getter threw.
	Accessor,
}

/// Object subtype hint (`RemoteObject.subtype`). Plain objects carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectSubtype {
	Array,
	Null,
	RegExp,
	Date,
	Map,
	Set,
	WeakMap,
	WeakSet,
	Error,
	Proxy,
	Promise,
	ArrayBuffer,
	Iterator,
	Generator,
	Node,
}

/// Mirror object referencing a runtime value.
///
/// Which fields are present depends on the value's classification; see
/// `ObjectRegistry::format` in `cdp-bridge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	#[serde(rename = "type")]
	pub kind: RemoteObjectType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subtype: Option<RemoteObjectSubtype>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub class_name: Option<String>,
	/// Primitive value. `Some(Value::Null)` is emitted as an explicit `null`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<serde_json::Value>,
	/// `NaN`, `Infinity`, `-Infinity` and `-0`, which JSON cannot carry.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub unserializable_value: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub object_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub preview: Option<ObjectPreview>,
}

impl RemoteObject {
	/// Bare descriptor carrying only a type.
	pub fn of_type(kind: RemoteObjectType) -> Self {
		Self {
			kind,
			subtype: None,
			class_name: None,
			value: None,
			unserializable_value: None,
			description: None,
			object_id: None,
			preview: None,
		}
	}
}

/// Bounded summary of an object's own enumerable properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPreview {
	/// `true` when the object has more keys than were sampled.
	pub overflow: bool,
	pub properties: Vec<PropertyPreview>,
}

/// One sampled property of an [`ObjectPreview`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPreview {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: RemoteObjectType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subtype: Option<RemoteObjectSubtype>,
	/// Short textual rendering. Absent when reading the property threw.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
}

/// One entry of a `Runtime.getProperties` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
	pub name: String,
	pub configurable: bool,
	pub enumerable: bool,
	/// Absent for accessor properties.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub writable: Option<bool>,
	pub is_own: bool,
	/// Absent when the getter threw.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<RemoteObject>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn subtypes_serialize_as_flat_lowercase() {
		let names: Vec<String> = [
			RemoteObjectSubtype::WeakMap,
			RemoteObjectSubtype::ArrayBuffer,
			RemoteObjectSubtype::RegExp,
		]
		.iter()
		.map(|s| serde_json::to_string(s).unwrap())
		.collect();
		assert_eq!(names, [r#""weakmap""#, r#""arraybuffer""#, r#""regexp""#]);
	}

	#[test]
	fn explicit_null_value_is_kept() {
		let mut obj = RemoteObject::of_type(RemoteObjectType::Object);
		obj.subtype = Some(RemoteObjectSubtype::Null);
		obj.value = Some(serde_json::Value::Null);
		let json = serde_json::to_string(&obj).unwrap();
		assert_eq!(json, r#"{"type":"object","subtype":"null","value":null}"#);
	}

	#[test]
	fn undefined_carries_only_type() {
		let json = serde_json::to_string(&RemoteObject::of_type(RemoteObjectType::Undefined)).unwrap();
		assert_eq!(json, r#"{"type":"undefined"}"#);
	}
}
