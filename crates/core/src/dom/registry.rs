//! Node identity registry.
//!
//! Assigns stable integer ids to live nodes and serializes subtrees into
//! [`NodeRecord`]s. Ids are allocated from a per-registry counter and never
//! reused; the maps only grow until [`NodeRegistry::reset`].

use std::collections::{HashMap, HashSet};

use cdp_bridge_protocol::dom::ELEMENT_NODE;
use cdp_bridge_protocol::{NodeId, NodeRecord, PseudoType};
use tracing::trace;

use super::node::{Node, WeakNode};

/// Configuration for a [`NodeRegistry`].
#[derive(Debug, Clone, Default)]
pub struct NodeRegistryConfig {
	/// Elements carrying any of these classes are hidden from the inspector,
	/// together with their subtrees.
	pub ignored_classes: Vec<String>,
}

impl NodeRegistryConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn ignore_class(mut self, class: impl Into<String>) -> Self {
		self.ignored_classes.push(class.into());
		self
	}
}

pub struct NodeRegistry {
	config: NodeRegistryConfig,
	last_id: NodeId,
	/// Keyed by node address. The weak entries in `nodes` keep each
	/// allocation pinned, so an address is never reused while mapped.
	ids: HashMap<usize, NodeId>,
	nodes: HashMap<NodeId, WeakNode>,
	/// Synthesized pseudo elements, kept apart from the node key space.
	pseudo_ids: HashMap<(NodeId, PseudoType), NodeId>,
	requested_children: HashSet<NodeId>,
}

impl Default for NodeRegistry {
	fn default() -> Self {
		Self::new(NodeRegistryConfig::default())
	}
}

impl NodeRegistry {
	pub fn new(config: NodeRegistryConfig) -> Self {
		Self {
			config,
			last_id: 0,
			ids: HashMap::new(),
			nodes: HashMap::new(),
			pseudo_ids: HashMap::new(),
			requested_children: HashSet::new(),
		}
	}

	pub fn config(&self) -> &NodeRegistryConfig {
		&self.config
	}

	fn allocate(&mut self) -> NodeId {
		self.last_id += 1;
		self.last_id
	}

	/// Whether `node` should be visible to an inspector.
	///
	/// Missing nodes, elements carrying an ignored class and whitespace-only
	/// text nodes are not.
	pub fn is_trackable(&self, node: Option<&Node>) -> bool {
		let Some(node) = node else {
			return false;
		};
		if node.is_element() {
			let classes = node.class_list();
			if classes
				.iter()
				.any(|c| self.config.ignored_classes.contains(c))
			{
				return false;
			}
		}
		if node.is_text() && node.node_value().trim().is_empty() {
			return false;
		}
		true
	}

	/// Returns the id of `node`, allocating one on first sight.
	pub fn id_for(&mut self, node: &Node) -> NodeId {
		if let Some(&id) = self.ids.get(&node.addr()) {
			return id;
		}
		let id = self.allocate();
		self.ids.insert(node.addr(), id);
		self.nodes.insert(id, node.downgrade());
		trace!(target = "cdp_bridge::dom", node_id = id, name = node.node_name(), "assigned node id");
		id
	}

	/// Returns the id of `node` without allocating.
	pub fn id_of(&self, node: &Node) -> Option<NodeId> {
		self.ids.get(&node.addr()).copied()
	}

	/// Resolves an id back to its node, if the node is still alive.
	pub fn node(&self, id: NodeId) -> Option<Node> {
		self.nodes.get(&id).and_then(WeakNode::upgrade)
	}

	/// Serializes `node` and `depth` levels of its visible descendants.
	///
	/// `depth == 0` leaves `children` absent. A negative depth expands the
	/// whole subtree.
	pub fn serialize(&mut self, node: &Node, depth: i32) -> NodeRecord {
		let node_id = self.id_for(node);
		let parent_id = node.parent().map(|parent| self.id_for(&parent));

		let child_node_count = node
			.children()
			.iter()
			.filter(|c| self.is_trackable(Some(c)))
			.count();
		let children = (depth != 0).then(|| self.children_of(node, depth));

		let (attributes, pseudo_elements) = if node.is_element() {
			let attributes = node
				.attributes()
				.into_iter()
				.flat_map(|(name, value)| [name, value])
				.collect();
			let pseudo = self.pseudo_elements(node, node_id);
			(Some(attributes), (!pseudo.is_empty()).then_some(pseudo))
		} else {
			(None, None)
		};

		NodeRecord {
			node_id,
			backend_node_id: node_id,
			node_type: node.node_type(),
			node_name: node.node_name().to_string(),
			local_name: node.local_name().to_string(),
			node_value: node.node_value(),
			child_node_count,
			attributes,
			parent_id,
			children,
			pseudo_elements,
			pseudo_type: None,
		}
	}

	/// Serializes the visible children of `node`, each at `depth - 1`.
	pub fn children_of(&mut self, node: &Node, depth: i32) -> Vec<NodeRecord> {
		let next = if depth < 0 { depth } else { depth - 1 };
		let visible: Vec<Node> = node
			.children()
			.into_iter()
			.filter(|c| self.is_trackable(Some(c)))
			.collect();
		visible.iter().map(|c| self.serialize(c, next)).collect()
	}

	fn pseudo_elements(&mut self, host: &Node, host_id: NodeId) -> Vec<NodeRecord> {
		let mut records = Vec::new();
		for pseudo in PseudoType::ALL {
			match host.pseudo_content(pseudo) {
				Some(content) if content != "none" => {}
				_ => continue,
			}
			let id = match self.pseudo_ids.get(&(host_id, pseudo)) {
				Some(&id) => id,
				None => {
					let id = self.allocate();
					self.pseudo_ids.insert((host_id, pseudo), id);
					id
				}
			};
			records.push(NodeRecord {
				node_id: id,
				backend_node_id: id,
				node_type: ELEMENT_NODE,
				node_name: pseudo.node_name().to_string(),
				local_name: String::new(),
				node_value: String::new(),
				child_node_count: 0,
				attributes: None,
				parent_id: Some(host_id),
				children: None,
				pseudo_elements: None,
				pseudo_type: Some(pseudo),
			});
		}
		records
	}

	/// Nearest preceding sibling that is visible to the inspector.
	pub fn previous_trackable_sibling(&self, node: &Node) -> Option<Node> {
		let mut current = node.previous_sibling();
		while let Some(sibling) = current {
			if self.is_trackable(Some(&sibling)) {
				return Some(sibling);
			}
			current = sibling.previous_sibling();
		}
		None
	}

	/// Records that the inspector has requested the children of `id`.
	/// Returns `false` if they were already requested.
	pub fn mark_children_requested(&mut self, id: NodeId) -> bool {
		self.requested_children.insert(id)
	}

	pub fn children_requested(&self, id: NodeId) -> bool {
		self.requested_children.contains(&id)
	}

	/// Number of nodes that have been assigned an id.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Drops every id mapping. Ids allocated afterwards continue from the
	/// previous counter value.
	pub fn reset(&mut self) {
		self.ids.clear();
		self.nodes.clear();
		self.pseudo_ids.clear();
		self.requested_children.clear();
	}
}
