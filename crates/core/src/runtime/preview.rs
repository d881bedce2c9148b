//! Bounded previews of an object's own enumerable properties.

use cdp_bridge_protocol::{ObjectPreview, PropertyPreview, RemoteObjectType};
use tracing::trace;

use super::classify::classify;
use super::value::{Object, ObjectKind, Value};

/// Properties sampled for ordinary objects.
pub const DEFAULT_PREVIEW_LENGTH: usize = 5;

/// Properties sampled for arrays, so their contents stay readable.
pub const ARRAY_PREVIEW_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct PreviewOptions<'a> {
	/// Sample size for non-array objects.
	pub length: usize,
	/// Receiver for getters. Defaults to the previewed object.
	pub origin: Option<&'a Object>,
}

impl Default for PreviewOptions<'_> {
	fn default() -> Self {
		Self {
			length: DEFAULT_PREVIEW_LENGTH,
			origin: None,
		}
	}
}

pub fn build_preview(object: &Object, options: PreviewOptions<'_>) -> ObjectPreview {
	let limit = match object.kind() {
		ObjectKind::Array => ARRAY_PREVIEW_LENGTH,
		_ => options.length,
	};
	let receiver = options.origin.unwrap_or(object);
	let keys: Vec<String> = object
		.own_enumerable_keys()
		.into_iter()
		.filter(|k| k != "__proto__")
		.collect();

	let overflow = keys.len() > limit;
	let properties = keys
		.into_iter()
		.take(limit)
		.map(|name| preview_property(object, name, receiver))
		.collect();

	ObjectPreview {
		overflow,
		properties,
	}
}

fn preview_property(object: &Object, name: String, receiver: &Object) -> PropertyPreview {
	match object.get_own(&name, receiver) {
		Ok(value) => {
			let class = classify(&value);
			PropertyPreview {
				name,
				kind: class.kind,
				subtype: class.subtype,
				value: Some(preview_text(&value)),
			}
		}
		Err(err) => {
			trace!(target = "cdp_bridge::runtime", property = %name, error = %err, "preview getter threw");
			PropertyPreview {
				name,
				kind: RemoteObjectType::Accessor,
				subtype: None,
				value: None,
			}
		}
	}
}

/// Short rendering of a property value inside a preview.
pub fn preview_text(value: &Value) -> String {
	let Value::Object(object) = value else {
		return value.to_display_string();
	};
	match object.kind() {
		ObjectKind::Array => format!("Array({})", object.length().unwrap_or(0)),
		ObjectKind::Date(text) => text.clone(),
		ObjectKind::RegExp { source, flags } => format!("/{source}/{flags}"),
		ObjectKind::Node(node) => format!("#{}", node.node_name()),
		_ => object.class_name().to_string(),
	}
}
