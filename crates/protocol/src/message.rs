//! CDP message envelopes.
//!
//! The relay never looks inside these; only the page-side inspector session
//! decodes [`Command`]s and encodes [`Response`]s and [`Event`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error code for an unknown method.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC error code for params that fail to decode.
pub const INVALID_PARAMS: i64 = -32602;

/// Inspector-to-page command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
	pub id: u64,
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

/// Page-to-inspector reply to a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
	pub id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ResponseError>,
}

impl Response {
	pub fn ok(id: u64, result: Value) -> Self {
		Self {
			id,
			result: Some(result),
			error: None,
		}
	}

	pub fn error(id: u64, code: i64, message: impl Into<String>) -> Self {
		Self {
			id,
			result: None,
			error: Some(ResponseError {
				code,
				message: message.into(),
			}),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
	pub code: i64,
	pub message: String,
}

/// Unsolicited page-to-inspector notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
	pub method: String,
	pub params: Value,
}

impl Event {
	pub fn new(method: impl Into<String>, params: Value) -> Self {
		Self {
			method: method.into(),
			params,
		}
	}
}
