//! Incremental `DOM` events for tree mutations.
//!
//! Instrumentation calls these after mutating the tree so inspectors can
//! patch their copy instead of re-requesting a snapshot. Mutations touching
//! nodes the inspector has never seen produce no event.

use cdp_bridge_protocol::dom::{
	AttributeModified, AttributeRemoved, CharacterDataModified, ChildNodeCountUpdated,
	ChildNodeInserted, ChildNodeRemoved, SetChildNodes,
};
use cdp_bridge_protocol::{Event, NodeId};

use super::node::Node;
use super::registry::NodeRegistry;
use crate::error::Result;

/// A `DOM` domain notification.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
	SetChildNodes(SetChildNodes),
	ChildNodeInserted(ChildNodeInserted),
	ChildNodeRemoved(ChildNodeRemoved),
	ChildNodeCountUpdated(ChildNodeCountUpdated),
	AttributeModified(AttributeModified),
	AttributeRemoved(AttributeRemoved),
	CharacterDataModified(CharacterDataModified),
}

impl DomEvent {
	pub fn method(&self) -> &'static str {
		match self {
			DomEvent::SetChildNodes(_) => "DOM.setChildNodes",
			DomEvent::ChildNodeInserted(_) => "DOM.childNodeInserted",
			DomEvent::ChildNodeRemoved(_) => "DOM.childNodeRemoved",
			DomEvent::ChildNodeCountUpdated(_) => "DOM.childNodeCountUpdated",
			DomEvent::AttributeModified(_) => "DOM.attributeModified",
			DomEvent::AttributeRemoved(_) => "DOM.attributeRemoved",
			DomEvent::CharacterDataModified(_) => "DOM.characterDataModified",
		}
	}

	pub fn into_event(self) -> Result<Event> {
		let method = self.method();
		let params = match self {
			DomEvent::SetChildNodes(p) => serde_json::to_value(p)?,
			DomEvent::ChildNodeInserted(p) => serde_json::to_value(p)?,
			DomEvent::ChildNodeRemoved(p) => serde_json::to_value(p)?,
			DomEvent::ChildNodeCountUpdated(p) => serde_json::to_value(p)?,
			DomEvent::AttributeModified(p) => serde_json::to_value(p)?,
			DomEvent::AttributeRemoved(p) => serde_json::to_value(p)?,
			DomEvent::CharacterDataModified(p) => serde_json::to_value(p)?,
		};
		Ok(Event::new(method, params))
	}
}

impl NodeRegistry {
	/// Event for `node` having been inserted under its current parent.
	///
	/// Emits `childNodeInserted` when the parent's children were requested,
	/// otherwise only `childNodeCountUpdated`.
	pub fn child_inserted(&mut self, node: &Node) -> Option<DomEvent> {
		if !self.is_trackable(Some(node)) {
			return None;
		}
		let parent = node.parent()?;
		let parent_node_id = self.id_of(&parent)?;

		if !self.children_requested(parent_node_id) {
			return Some(self.count_updated(&parent, parent_node_id));
		}

		let previous_node_id = match self.previous_trackable_sibling(node) {
			Some(sibling) => self.id_for(&sibling),
			None => 0,
		};
		let record = self.serialize(node, 0);
		Some(DomEvent::ChildNodeInserted(ChildNodeInserted {
			parent_node_id,
			previous_node_id,
			node: record,
		}))
	}

	/// Event for `node` having been detached from `parent`.
	pub fn child_removed(&mut self, parent: &Node, node: &Node) -> Option<DomEvent> {
		let parent_node_id = self.id_of(parent)?;
		if !self.children_requested(parent_node_id) {
			return Some(self.count_updated(parent, parent_node_id));
		}
		let node_id = self.id_of(node)?;
		Some(DomEvent::ChildNodeRemoved(ChildNodeRemoved {
			parent_node_id,
			node_id,
		}))
	}

	/// Event for attribute `name` of `node` having been set or removed.
	pub fn attribute_changed(&self, node: &Node, name: &str) -> Option<DomEvent> {
		let node_id = self.id_of(node)?;
		Some(match node.attribute(name) {
			Some(value) => DomEvent::AttributeModified(AttributeModified {
				node_id,
				name: name.to_string(),
				value,
			}),
			None => DomEvent::AttributeRemoved(AttributeRemoved {
				node_id,
				name: name.to_string(),
			}),
		})
	}

	/// Event for the value of a text or comment node having changed.
	pub fn character_data_modified(&self, node: &Node) -> Option<DomEvent> {
		let node_id = self.id_of(node)?;
		Some(DomEvent::CharacterDataModified(CharacterDataModified {
			node_id,
			character_data: node.node_value(),
		}))
	}

	/// `DOM.setChildNodes` answering a child request for `node`.
	pub fn set_child_nodes(&mut self, node: &Node, depth: i32) -> DomEvent {
		let parent_id = self.id_for(node);
		self.mark_children_requested(parent_id);
		let nodes = self.children_of(node, depth);
		DomEvent::SetChildNodes(SetChildNodes { parent_id, nodes })
	}

	fn count_updated(&self, parent: &Node, node_id: NodeId) -> DomEvent {
		let child_node_count = parent
			.children()
			.iter()
			.filter(|c| self.is_trackable(Some(c)))
			.count();
		DomEvent::ChildNodeCountUpdated(ChildNodeCountUpdated {
			node_id,
			child_node_count,
		})
	}
}
