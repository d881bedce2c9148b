//! Page-side inspector session.
//!
//! Owns the registries for one inspected page and answers the `DOM`,
//! `Runtime` and `CSS` commands an inspector sends through the relay. Each
//! registry sits behind its own mutex and no two are held at once.

use std::collections::HashMap;

use cdp_bridge_protocol::message::{INVALID_PARAMS, METHOD_NOT_FOUND};
use cdp_bridge_protocol::{Command, Event, NodeId, NodeRecord, RemoteObject, Response};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value as Json, json};
use tracing::{debug, warn};

use crate::css::{StyleSheet, StyleSheetRegistry};
use crate::dom::{DomEvent, Node, NodeRegistry, NodeRegistryConfig};
use crate::error::{Error, Result};
use crate::runtime::{FormatOptions, GetPropertiesParams, Object, ObjectKind, ObjectRegistry, Value};

/// Generic server error code for failures that are not the caller's fault.
const SERVER_ERROR: i64 = -32000;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetDocumentParams {
	depth: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeParams {
	node_id: NodeId,
	depth: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectIdParams {
	object_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleSheetParams {
	style_sheet_id: String,
}

/// Outcome of one inbound command.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dispatch {
	pub response: Option<Response>,
	/// Events to deliver ahead of the response.
	pub events: Vec<Event>,
}

impl Dispatch {
	/// Serializes events, then the response, as text frames.
	pub fn into_frames(self) -> Result<Vec<String>> {
		let mut frames = self
			.events
			.iter()
			.map(serde_json::to_string)
			.collect::<std::result::Result<Vec<_>, _>>()?;
		if let Some(response) = &self.response {
			frames.push(serde_json::to_string(response)?);
		}
		Ok(frames)
	}
}

pub struct InspectorSession {
	document: RwLock<Node>,
	nodes: Mutex<NodeRegistry>,
	objects: Mutex<ObjectRegistry>,
	style_sheets: Mutex<StyleSheetRegistry>,
	/// One runtime wrapper per resolved node, so a node keeps its object id.
	node_objects: Mutex<HashMap<NodeId, Object>>,
}

impl InspectorSession {
	pub fn new(document: Node, config: NodeRegistryConfig) -> Self {
		Self {
			document: RwLock::new(document),
			nodes: Mutex::new(NodeRegistry::new(config)),
			objects: Mutex::new(ObjectRegistry::new()),
			style_sheets: Mutex::new(StyleSheetRegistry::new()),
			node_objects: Mutex::new(HashMap::new()),
		}
	}

	pub fn document(&self) -> Node {
		self.document.read().clone()
	}

	pub fn nodes(&self) -> MutexGuard<'_, NodeRegistry> {
		self.nodes.lock()
	}

	pub fn objects(&self) -> MutexGuard<'_, ObjectRegistry> {
		self.objects.lock()
	}

	pub fn style_sheets(&self) -> MutexGuard<'_, StyleSheetRegistry> {
		self.style_sheets.lock()
	}

	/// Swaps in a new document after navigation and forgets every id.
	pub fn reset(&self, document: Node) {
		*self.document.write() = document;
		self.nodes.lock().reset();
		self.objects.lock().reset();
		self.style_sheets.lock().reset();
		self.node_objects.lock().clear();
		debug!(target = "cdp_bridge::inspector", "inspector session reset");
	}

	/// Formats `value` with a preview, e.g. for a console message argument.
	pub fn expose(&self, value: &Value) -> RemoteObject {
		self.objects.lock().format(
			value,
			FormatOptions {
				origin: None,
				preview: true,
			},
		)
	}

	/// `CSS.styleSheetAdded` for a sheet attached to the document.
	pub fn style_sheet_added(&self, sheet: &StyleSheet) -> Result<Event> {
		let header = self.style_sheets.lock().header(sheet);
		Ok(Event::new(
			"CSS.styleSheetAdded",
			json!({ "header": serde_json::to_value(header)? }),
		))
	}

	/// Decodes and answers one inbound text frame.
	pub fn handle_message(&self, raw: &str) -> Result<Dispatch> {
		let command: Command = serde_json::from_str(raw).map_err(Error::Malformed)?;
		Ok(self.handle_command(command))
	}

	pub fn handle_command(&self, command: Command) -> Dispatch {
		let Command { id, method, params } = command;
		match self.route(&method, params) {
			Ok((result, events)) => Dispatch {
				response: Some(Response::ok(id, result)),
				events,
			},
			Err(err) => {
				let code = match &err {
					Error::UnknownMethod(_) => METHOD_NOT_FOUND,
					Error::InvalidParams { .. } => INVALID_PARAMS,
					_ => SERVER_ERROR,
				};
				warn!(target = "cdp_bridge::inspector", id, method = %method, error = %err, "command failed");
				Dispatch {
					response: Some(Response::error(id, code, err.to_string())),
					events: Vec::new(),
				}
			}
		}
	}

	fn route(&self, method: &str, params: Json) -> Result<(Json, Vec<Event>)> {
		match method {
			"DOM.getDocument" => {
				let params: GetDocumentParams = decode(method, params)?;
				let document = self.document();
				let mut nodes = self.nodes.lock();
				let root = nodes.serialize(&document, params.depth.unwrap_or(1));
				mark_expanded(&mut nodes, &root);
				Ok((json!({ "root": root }), Vec::new()))
			}
			"DOM.requestChildNodes" => {
				let params: NodeParams = decode(method, params)?;
				let mut nodes = self.nodes.lock();
				let Some(node) = nodes.node(params.node_id) else {
					debug!(target = "cdp_bridge::inspector", node_id = params.node_id, "requestChildNodes for unknown node");
					return Ok((json!({}), Vec::new()));
				};
				let event = nodes.set_child_nodes(&node, params.depth.unwrap_or(1));
				if let DomEvent::SetChildNodes(set) = &event {
					for record in &set.nodes {
						mark_expanded(&mut nodes, record);
					}
				}
				Ok((json!({}), vec![event.into_event()?]))
			}
			"DOM.describeNode" => {
				let params: NodeParams = decode(method, params)?;
				let mut nodes = self.nodes.lock();
				let result = match nodes.node(params.node_id) {
					Some(node) => json!({ "node": nodes.serialize(&node, params.depth.unwrap_or(0)) }),
					None => json!({}),
				};
				Ok((result, Vec::new()))
			}
			"DOM.resolveNode" => {
				let params: NodeParams = decode(method, params)?;
				let node = self.nodes.lock().node(params.node_id);
				let result = match node {
					Some(node) => {
						let wrapper = self
							.node_objects
							.lock()
							.entry(params.node_id)
							.or_insert_with(|| Object::node(&node))
							.clone();
						let object = self
							.objects
							.lock()
							.format(&Value::Object(wrapper), FormatOptions::default());
						json!({ "object": object })
					}
					None => json!({}),
				};
				Ok((result, Vec::new()))
			}
			"DOM.requestNode" => {
				let params: ObjectIdParams = decode(method, params)?;
				let value = self.objects.lock().resolve(&params.object_id);
				let node = match value {
					Some(Value::Object(object)) => match object.kind() {
						ObjectKind::Node(node) => Some(node.clone()),
						_ => None,
					},
					_ => None,
				};
				let result = match node {
					Some(node) => json!({ "nodeId": self.nodes.lock().id_for(&node) }),
					None => json!({}),
				};
				Ok((result, Vec::new()))
			}
			"Runtime.getProperties" => {
				let params: GetPropertiesParams = decode(method, params)?;
				let result = self.objects.lock().get_properties(&params);
				Ok((json!({ "result": result }), Vec::new()))
			}
			"Runtime.releaseObject" => {
				let params: ObjectIdParams = decode(method, params)?;
				self.objects.lock().release(&params.object_id);
				Ok((json!({}), Vec::new()))
			}
			"CSS.getStyleSheetText" => {
				let params: StyleSheetParams = decode(method, params)?;
				let text = self
					.style_sheets
					.lock()
					.sheet(&params.style_sheet_id)
					.map(|sheet| sheet.text())
					.unwrap_or_default();
				Ok((json!({ "text": text }), Vec::new()))
			}
			m if m.ends_with(".enable") || m.ends_with(".disable") => Ok((json!({}), Vec::new())),
			other => Err(Error::UnknownMethod(other.to_string())),
		}
	}
}

fn decode<T: DeserializeOwned>(method: &str, params: Json) -> Result<T> {
	let params = if params.is_null() { json!({}) } else { params };
	serde_json::from_value(params).map_err(|source| Error::InvalidParams {
		method: method.to_string(),
		source,
	})
}

/// Records every node whose children went out in `record`, so later
/// insertions under them are reported as `childNodeInserted`.
fn mark_expanded(nodes: &mut NodeRegistry, record: &NodeRecord) {
	let Some(children) = &record.children else {
		return;
	};
	nodes.mark_children_requested(record.node_id);
	for child in children {
		mark_expanded(nodes, child);
	}
}

#[cfg(test)]
mod tests {
	use cdp_bridge_protocol::message::{INVALID_PARAMS, METHOD_NOT_FOUND};

	use super::*;
	use crate::runtime::Property;

	fn session() -> (InspectorSession, Node) {
		let list = Node::element("ul").with_children([
			Node::element("li").with_children([Node::text("one")]),
			Node::text("  "),
			Node::element("li").with_children([Node::text("two")]),
		]);
		let body = Node::element("body").with_children([list.clone()]);
		let doc = Node::document().with_children([Node::element("html").with_children([body])]);
		(InspectorSession::new(doc, NodeRegistryConfig::new()), list)
	}

	fn call(session: &InspectorSession, id: u64, method: &str, params: Json) -> Dispatch {
		let raw = json!({ "id": id, "method": method, "params": params }).to_string();
		session.handle_message(&raw).unwrap()
	}

	fn result(dispatch: &Dispatch) -> &Json {
		dispatch.response.as_ref().unwrap().result.as_ref().unwrap()
	}

	#[test]
	fn get_document_defaults_to_one_level() {
		let (session, _) = session();
		let dispatch = call(&session, 1, "DOM.getDocument", Json::Null);
		let root = &result(&dispatch)["root"];
		assert_eq!(root["nodeName"], "#document");
		assert_eq!(root["children"][0]["nodeName"], "HTML");
		assert!(root["children"][0].get("children").is_none());
		assert_eq!(dispatch.response.as_ref().unwrap().id, 1);
	}

	#[test]
	fn request_child_nodes_emits_set_child_nodes() {
		let (session, list) = session();
		call(&session, 1, "DOM.getDocument", json!({ "depth": -1 }));
		let list_id = session.nodes().id_of(&list).unwrap();

		let dispatch = call(&session, 2, "DOM.requestChildNodes", json!({ "nodeId": list_id }));
		assert_eq!(result(&dispatch), &json!({}));
		assert_eq!(dispatch.events.len(), 1);
		let event = &dispatch.events[0];
		assert_eq!(event.method, "DOM.setChildNodes");
		assert_eq!(event.params["parentId"], list_id);
		assert_eq!(event.params["nodes"].as_array().unwrap().len(), 2);

		let frames = dispatch.into_frames().unwrap();
		assert!(frames[0].contains("DOM.setChildNodes"));
		assert!(frames[1].contains(r#""id":2"#));
	}

	#[test]
	fn unknown_node_ids_degrade_to_empty_results() {
		let (session, _) = session();
		for method in ["DOM.requestChildNodes", "DOM.describeNode", "DOM.resolveNode"] {
			let dispatch = call(&session, 3, method, json!({ "nodeId": 999 }));
			assert_eq!(result(&dispatch), &json!({}), "{method}");
			assert!(dispatch.events.is_empty());
		}
	}

	#[test]
	fn resolve_node_and_back() {
		let (session, list) = session();
		let list_id = session.nodes().id_for(&list);

		let dispatch = call(&session, 4, "DOM.resolveNode", json!({ "nodeId": list_id }));
		let object = &result(&dispatch)["object"];
		assert_eq!(object["subtype"], "node");
		let object_id = object["objectId"].as_str().unwrap().to_string();

		let dispatch = call(&session, 5, "DOM.requestNode", json!({ "objectId": object_id }));
		assert_eq!(result(&dispatch)["nodeId"], list_id);
	}

	#[test]
	fn resolving_a_node_twice_reuses_its_object_id() {
		let (session, list) = session();
		let list_id = session.nodes().id_for(&list);

		let ids: Vec<Json> = (0..3)
			.map(|i| {
				let dispatch = call(&session, 20 + i, "DOM.resolveNode", json!({ "nodeId": list_id }));
				result(&dispatch)["object"]["objectId"].clone()
			})
			.collect();
		assert_eq!(ids[0], ids[1]);
		assert_eq!(ids[1], ids[2]);
		assert_eq!(session.objects().len(), 1);

		session.reset(session.document());
		let list_id = session.nodes().id_for(&list);
		let dispatch = call(&session, 30, "DOM.resolveNode", json!({ "nodeId": list_id }));
		assert_ne!(result(&dispatch)["object"]["objectId"], ids[0]);
		assert_eq!(session.objects().len(), 1);
	}

	#[test]
	fn runtime_properties_and_release() {
		let (session, _) = session();
		let proto = Object::plain().with("inherited", 1);
		let obj = Object::plain().with("own", "x").with_prototype(&proto);
		obj.define("bad", Property::getter(|_| Err(crate::runtime::Thrown("boom".into()))));

		let remote = session.expose(&Value::Object(obj));
		assert!(remote.preview.is_some());
		let object_id = remote.object_id.unwrap();

		let dispatch = call(
			&session,
			6,
			"Runtime.getProperties",
			json!({ "objectId": object_id, "ownProperties": true, "generatePreview": true }),
		);
		let props = result(&dispatch)["result"].as_array().unwrap().clone();
		let names: Vec<&str> = props.iter().map(|p| p["name"].as_str().unwrap()).collect();
		assert_eq!(names, ["own", "bad", "__proto__"]);
		assert!(props[1].get("value").is_none());

		call(&session, 7, "Runtime.releaseObject", json!({ "objectId": object_id }));
		let dispatch = call(
			&session,
			8,
			"Runtime.getProperties",
			json!({ "objectId": object_id, "ownProperties": true }),
		);
		assert_eq!(result(&dispatch)["result"], json!([]));
	}

	#[test]
	fn style_sheet_text_by_id() {
		let (session, _) = session();
		let sheet = StyleSheet::linked("https://example.com/site.css", "body { margin: 0 }");
		let event = session.style_sheet_added(&sheet).unwrap();
		let id = event.params["header"]["styleSheetId"].as_str().unwrap().to_string();

		let dispatch = call(&session, 9, "CSS.getStyleSheetText", json!({ "styleSheetId": id }));
		assert_eq!(result(&dispatch)["text"], "body { margin: 0 }");
	}

	#[test]
	fn errors_carry_jsonrpc_codes() {
		let (session, _) = session();
		let dispatch = call(&session, 10, "Page.navigate", json!({}));
		let error = dispatch.response.unwrap().error.unwrap();
		assert_eq!(error.code, METHOD_NOT_FOUND);

		let dispatch = call(&session, 11, "Runtime.getProperties", json!({ "objectId": 5 }));
		assert_eq!(dispatch.response.unwrap().error.unwrap().code, INVALID_PARAMS);

		let dispatch = call(&session, 12, "Runtime.enable", Json::Null);
		assert_eq!(result(&dispatch), &json!({}));

		assert!(matches!(session.handle_message("not json"), Err(Error::Malformed(_))));
	}

	#[test]
	fn reset_swaps_document_and_forgets_ids() {
		let (session, list) = session();
		let list_id = session.nodes().id_for(&list);
		let object_id = session.expose(&Value::Object(Object::plain())).object_id.unwrap();

		session.reset(Node::document());

		assert!(session.nodes().node(list_id).is_none());
		assert!(session.objects().resolve(&object_id).is_none());
		let dispatch = call(&session, 13, "DOM.getDocument", json!({ "depth": 0 }));
		assert_eq!(result(&dispatch)["root"]["childNodeCount"], 0);
	}

	#[test]
	fn insertions_after_get_document_are_incremental() {
		let (session, list) = session();
		call(&session, 1, "DOM.getDocument", json!({ "depth": -1 }));

		let item = Node::element("li");
		list.append_child(&item);
		let event = session.nodes().child_inserted(&item).unwrap();
		assert_eq!(event.method(), "DOM.childNodeInserted");
	}
}
