//! Relay endpoint constants and the page listing format.
//!
//! The relay accepts two kinds of WebSocket connection:
//!
//! 1. `/page/{id}?url=&ua=&time=&title=&favicon=` from an inspected page
//! 2. `/devtools/{id}?clientId=` from an inspector targeting page `clientId`
//!
//! and serves the currently connected pages as JSON at [`LIST_PATH`].

use serde::{Deserialize, Serialize};

/// Default relay listen host.
pub const DEFAULT_RELAY_HOST: &str = "127.0.0.1";

/// Default relay listen port.
pub const DEFAULT_RELAY_PORT: u16 = 9222;

/// Path segment for inspected-page connections.
pub const PAGE_SEGMENT: &str = "page";

/// Path segment for inspector connections.
pub const DEVTOOLS_SEGMENT: &str = "devtools";

/// Page listing endpoint.
pub const LIST_PATH: &str = "/json";

/// Descriptive metadata an inspected page sends in its connect query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageQuery {
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub ua: String,
	/// Page-reported connect time, opaque to the relay.
	#[serde(default)]
	pub time: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub favicon: String,
}

/// Query of an inspector connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevtoolsQuery {
	/// Page the inspector wants to attach to.
	#[serde(default)]
	pub client_id: String,
}

/// One connected page, as served by [`LIST_PATH`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageListing {
	pub id: String,
	pub url: String,
	pub title: String,
	pub favicon: String,
	pub user_agent: String,
	/// Page-reported connect time.
	pub time: String,
	/// Milliseconds since the Unix epoch at which the relay accepted the page.
	pub connected_at: u64,
	/// Number of inspectors currently attached.
	pub inspectors: usize,
}

impl PageListing {
	/// Builds the inspector URL path attaching `devtools_id` to this page.
	pub fn devtools_path(&self, devtools_id: &str) -> String {
		format!("/{DEVTOOLS_SEGMENT}/{devtools_id}?clientId={}", self.id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn devtools_query_reads_camel_case_client_id() {
		let q: DevtoolsQuery = serde_json::from_str(r#"{"clientId": "c1"}"#).unwrap();
		assert_eq!(q.client_id, "c1");
	}

	#[test]
	fn page_query_fields_are_optional() {
		let q: PageQuery = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
		assert_eq!(q.url, "https://example.com");
		assert!(q.title.is_empty());
	}
}
