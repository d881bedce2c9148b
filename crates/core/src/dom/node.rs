//! Live DOM tree owned by the inspected page.
//!
//! [`Node`] is a shared handle; clones refer to the same node and
//! [`Node::ptr_eq`] is the identity the registries key on.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use cdp_bridge_protocol::dom::{
	COMMENT_NODE, DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE, DOCUMENT_TYPE_NODE, ELEMENT_NODE,
	TEXT_NODE,
};
use cdp_bridge_protocol::PseudoType;
use parking_lot::RwLock;

struct NodeInner {
	node_type: u16,
	node_name: String,
	local_name: String,
	value: RwLock<String>,
	attributes: RwLock<Vec<(String, String)>>,
	parent: RwLock<Weak<NodeInner>>,
	children: RwLock<Vec<Node>>,
	/// Resolved `content` of `::before` / `::after`.
	pseudo_content: RwLock<HashMap<PseudoType, String>>,
}

#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

/// Non-owning reference to a [`Node`].
#[derive(Clone, Default)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
	pub fn upgrade(&self) -> Option<Node> {
		self.0.upgrade().map(Node)
	}
}

impl Node {
	fn new(node_type: u16, node_name: String, local_name: String, value: String) -> Self {
		Node(Arc::new(NodeInner {
			node_type,
			node_name,
			local_name,
			value: RwLock::new(value),
			attributes: RwLock::new(Vec::new()),
			parent: RwLock::new(Weak::new()),
			children: RwLock::new(Vec::new()),
			pseudo_content: RwLock::new(HashMap::new()),
		}))
	}

	pub fn document() -> Self {
		Self::new(DOCUMENT_NODE, "#document".into(), String::new(), String::new())
	}

	/// Creates an HTML element. The node name is the upper-cased tag.
	pub fn element(tag: &str) -> Self {
		Self::new(
			ELEMENT_NODE,
			tag.to_ascii_uppercase(),
			tag.to_ascii_lowercase(),
			String::new(),
		)
	}

	pub fn text(data: &str) -> Self {
		Self::new(TEXT_NODE, "#text".into(), String::new(), data.into())
	}

	pub fn comment(data: &str) -> Self {
		Self::new(COMMENT_NODE, "#comment".into(), String::new(), data.into())
	}

	pub fn doctype(name: &str) -> Self {
		Self::new(DOCUMENT_TYPE_NODE, name.into(), String::new(), String::new())
	}

	pub fn fragment() -> Self {
		Self::new(
			DOCUMENT_FRAGMENT_NODE,
			"#document-fragment".into(),
			String::new(),
			String::new(),
		)
	}

	/// Builder form of [`set_attribute`](Self::set_attribute).
	pub fn with_attribute(self, name: &str, value: &str) -> Self {
		self.set_attribute(name, value);
		self
	}

	/// Builder form of [`append_child`](Self::append_child).
	pub fn with_children(self, children: impl IntoIterator<Item = Node>) -> Self {
		for child in children {
			self.append_child(&child);
		}
		self
	}

	/// Builder form of [`set_pseudo_content`](Self::set_pseudo_content).
	pub fn with_pseudo_content(self, pseudo: PseudoType, content: &str) -> Self {
		self.set_pseudo_content(pseudo, Some(content));
		self
	}

	pub fn ptr_eq(&self, other: &Node) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	pub(crate) fn addr(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}

	pub fn downgrade(&self) -> WeakNode {
		WeakNode(Arc::downgrade(&self.0))
	}

	pub fn node_type(&self) -> u16 {
		self.0.node_type
	}

	pub fn is_element(&self) -> bool {
		self.0.node_type == ELEMENT_NODE
	}

	pub fn is_text(&self) -> bool {
		self.0.node_type == TEXT_NODE
	}

	pub fn node_name(&self) -> &str {
		&self.0.node_name
	}

	pub fn local_name(&self) -> &str {
		&self.0.local_name
	}

	pub fn node_value(&self) -> String {
		self.0.value.read().clone()
	}

	pub fn set_node_value(&self, value: &str) {
		*self.0.value.write() = value.to_string();
	}

	/// Attributes in document order.
	pub fn attributes(&self) -> Vec<(String, String)> {
		self.0.attributes.read().clone()
	}

	pub fn attribute(&self, name: &str) -> Option<String> {
		self.0
			.attributes
			.read()
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.clone())
	}

	pub fn set_attribute(&self, name: &str, value: &str) {
		let mut attrs = self.0.attributes.write();
		match attrs.iter_mut().find(|(n, _)| n == name) {
			Some(slot) => slot.1 = value.to_string(),
			None => attrs.push((name.to_string(), value.to_string())),
		}
	}

	/// Returns `true` if the attribute was present.
	pub fn remove_attribute(&self, name: &str) -> bool {
		let mut attrs = self.0.attributes.write();
		let before = attrs.len();
		attrs.retain(|(n, _)| n != name);
		attrs.len() != before
	}

	/// Whitespace-separated tokens of the `class` attribute.
	pub fn class_list(&self) -> Vec<String> {
		self.attribute("class")
			.map(|c| c.split_whitespace().map(str::to_string).collect())
			.unwrap_or_default()
	}

	pub fn parent(&self) -> Option<Node> {
		self.0.parent.read().upgrade().map(Node)
	}

	pub fn children(&self) -> Vec<Node> {
		self.0.children.read().clone()
	}

	pub fn child_count(&self) -> usize {
		self.0.children.read().len()
	}

	/// Appends `child`, detaching it from its current parent first.
	pub fn append_child(&self, child: &Node) {
		self.insert_before(child, None);
	}

	/// Inserts `child` before `reference`, or at the end when `reference` is
	/// [`None`] or not a child of this node.
	pub fn insert_before(&self, child: &Node, reference: Option<&Node>) {
		child.detach();
		*child.0.parent.write() = Arc::downgrade(&self.0);
		let mut children = self.0.children.write();
		let index = reference
			.and_then(|r| children.iter().position(|c| c.ptr_eq(r)))
			.unwrap_or(children.len());
		children.insert(index, child.clone());
	}

	/// Returns `true` if `child` was a child of this node.
	pub fn remove_child(&self, child: &Node) -> bool {
		let removed = {
			let mut children = self.0.children.write();
			let before = children.len();
			children.retain(|c| !c.ptr_eq(child));
			children.len() != before
		};
		if removed {
			*child.0.parent.write() = Weak::new();
		}
		removed
	}

	fn detach(&self) {
		if let Some(parent) = self.parent() {
			parent.remove_child(self);
		}
	}

	pub fn previous_sibling(&self) -> Option<Node> {
		let parent = self.parent()?;
		let children = parent.0.children.read();
		let index = children.iter().position(|c| c.ptr_eq(self))?;
		index.checked_sub(1).map(|i| children[i].clone())
	}

	pub fn next_sibling(&self) -> Option<Node> {
		let parent = self.parent()?;
		let children = parent.0.children.read();
		let index = children.iter().position(|c| c.ptr_eq(self))?;
		children.get(index + 1).cloned()
	}

	/// Resolved `content` of the given pseudo element, if any was set.
	pub fn pseudo_content(&self, pseudo: PseudoType) -> Option<String> {
		self.0.pseudo_content.read().get(&pseudo).cloned()
	}

	/// Sets or clears the resolved pseudo element `content`.
	pub fn set_pseudo_content(&self, pseudo: PseudoType, content: Option<&str>) {
		let mut styles = self.0.pseudo_content.write();
		match content {
			Some(content) => {
				styles.insert(pseudo, content.to_string());
			}
			None => {
				styles.remove(&pseudo);
			}
		}
	}
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("node_type", &self.0.node_type)
			.field("node_name", &self.0.node_name)
			.field("children", &self.child_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn append_moves_child_between_parents() {
		let a = Node::element("div");
		let b = Node::element("div");
		let child = Node::element("span");

		a.append_child(&child);
		b.append_child(&child);

		assert_eq!(a.child_count(), 0);
		assert_eq!(b.child_count(), 1);
		assert!(child.parent().unwrap().ptr_eq(&b));
	}

	#[test]
	fn insert_before_places_child_at_reference() {
		let first = Node::element("a");
		let last = Node::element("b");
		let parent = Node::element("div").with_children([first.clone(), last.clone()]);
		let middle = Node::element("c");

		parent.insert_before(&middle, Some(&last));

		assert!(middle.previous_sibling().unwrap().ptr_eq(&first));
		assert!(middle.next_sibling().unwrap().ptr_eq(&last));
		assert!(first.previous_sibling().is_none());
	}

	#[test]
	fn attributes_keep_insertion_order_and_update_in_place() {
		let el = Node::element("div")
			.with_attribute("id", "x")
			.with_attribute("class", "a  b");
		el.set_attribute("id", "y");

		assert_eq!(
			el.attributes(),
			vec![("id".into(), "y".into()), ("class".into(), "a  b".into())]
		);
		assert_eq!(el.class_list(), vec!["a", "b"]);
		assert!(el.remove_attribute("id"));
		assert!(!el.remove_attribute("id"));
	}

	#[test]
	fn element_names_are_normalized() {
		let el = Node::element("Section");
		assert_eq!(el.node_name(), "SECTION");
		assert_eq!(el.local_name(), "section");
	}
}
