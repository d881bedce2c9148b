//! `DOM` domain records and events.

use serde::{Deserialize, Serialize};

/// Process-local node identifier, unique within one node registry.
pub type NodeId = u64;

pub const ELEMENT_NODE: u16 = 1;
pub const TEXT_NODE: u16 = 3;
pub const COMMENT_NODE: u16 = 8;
pub const DOCUMENT_NODE: u16 = 9;
pub const DOCUMENT_TYPE_NODE: u16 = 10;
pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;

/// Pseudo element kinds the bridge synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudoType {
	Before,
	After,
}

impl PseudoType {
	pub const ALL: [PseudoType; 2] = [PseudoType::Before, PseudoType::After];

	/// Node name reported for the synthesized element, e.g. `::before`.
	pub fn node_name(self) -> &'static str {
		match self {
			PseudoType::Before => "::before",
			PseudoType::After => "::after",
		}
	}
}

/// Serialized DOM node.
///
/// `children` is [`None`] when the node was not expanded, which is distinct
/// from `Some(vec![])` for an expanded node without visible children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
	pub node_id: NodeId,
	pub backend_node_id: NodeId,
	pub node_type: u16,
	pub node_name: String,
	pub local_name: String,
	pub node_value: String,
	pub child_node_count: usize,
	/// Flat `[name, value, name, value, ...]` sequence.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub attributes: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<NodeId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub children: Option<Vec<NodeRecord>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pseudo_elements: Option<Vec<NodeRecord>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pseudo_type: Option<PseudoType>,
}

impl NodeRecord {
	/// Returns the value of attribute `name` from the flat attribute list.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.as_ref()?
			.chunks(2)
			.find(|pair| pair[0] == name)
			.and_then(|pair| pair.get(1))
			.map(String::as_str)
	}
}

/// `DOM.setChildNodes` event params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChildNodes {
	pub parent_id: NodeId,
	pub nodes: Vec<NodeRecord>,
}

/// `DOM.childNodeInserted` event params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildNodeInserted {
	pub parent_node_id: NodeId,
	/// `0` when the node became the first visible child.
	pub previous_node_id: NodeId,
	pub node: NodeRecord,
}

/// `DOM.childNodeRemoved` event params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildNodeRemoved {
	pub parent_node_id: NodeId,
	pub node_id: NodeId,
}

/// `DOM.childNodeCountUpdated` event params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildNodeCountUpdated {
	pub node_id: NodeId,
	pub child_node_count: usize,
}

/// `DOM.attributeModified` event params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeModified {
	pub node_id: NodeId,
	pub name: String,
	pub value: String,
}

/// `DOM.attributeRemoved` event params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRemoved {
	pub node_id: NodeId,
	pub name: String,
}

/// `DOM.characterDataModified` event params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDataModified {
	pub node_id: NodeId,
	pub character_data: String,
}
