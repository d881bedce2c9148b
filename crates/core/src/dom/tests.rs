use cdp_bridge_protocol::PseudoType;
use cdp_bridge_protocol::dom::{DOCUMENT_NODE, TEXT_NODE};

use super::*;

/// `<html><body><div id=main class=box>hi</div>\n  <span></span><div class=overlay></div></body></html>`
fn sample() -> (Node, Node, Node, Node) {
	let main = Node::element("div")
		.with_attribute("id", "main")
		.with_attribute("class", "box")
		.with_children([Node::text("hi")]);
	let span = Node::element("span");
	let body = Node::element("body").with_children([
		main.clone(),
		Node::text("\n  "),
		span.clone(),
		Node::element("div").with_attribute("class", "debug overlay"),
	]);
	let doc = Node::document().with_children([Node::element("html").with_children([body.clone()])]);
	(doc, body, main, span)
}

fn registry() -> NodeRegistry {
	NodeRegistry::new(NodeRegistryConfig::new().ignore_class("overlay"))
}

#[test]
fn id_for_is_idempotent_and_distinct() {
	let (doc, body, main, span) = sample();
	let mut reg = registry();

	let main_id = reg.id_for(&main);
	assert_eq!(reg.id_for(&main), main_id);
	assert_eq!(reg.id_for(&main.clone()), main_id);

	let ids = [reg.id_for(&doc), reg.id_for(&body), main_id, reg.id_for(&span)];
	let mut unique = ids.to_vec();
	unique.sort_unstable();
	unique.dedup();
	assert_eq!(unique.len(), ids.len());
	assert!(reg.node(main_id).unwrap().ptr_eq(&main));
}

#[test]
fn identity_is_by_reference_not_by_value() {
	let mut reg = registry();
	let a = Node::element("p");
	let b = Node::element("p");
	assert_ne!(reg.id_for(&a), reg.id_for(&b));
}

#[test]
fn trackability_filters_hidden_nodes() {
	let reg = registry();
	assert!(!reg.is_trackable(None));
	assert!(!reg.is_trackable(Some(&Node::text(" \n\t"))));
	assert!(reg.is_trackable(Some(&Node::text(" x "))));
	assert!(reg.is_trackable(Some(&Node::comment(""))));
	assert!(!reg.is_trackable(Some(
		&Node::element("div").with_attribute("class", "a overlay")
	)));
	assert!(reg.is_trackable(Some(
		&Node::element("div").with_attribute("class", "overlay-ish")
	)));
}

#[test]
fn depth_zero_omits_children() {
	let (_, body, _, _) = sample();
	let mut reg = registry();

	let record = reg.serialize(&body, 0);
	assert!(record.children.is_none());
	assert_eq!(record.child_node_count, 2);
}

#[test]
fn depth_bounds_expansion_and_counts_only_visible_children() {
	let (_, body, main, span) = sample();
	let mut reg = registry();

	let record = reg.serialize(&body, 1);
	let children = record.children.as_ref().unwrap();
	assert_eq!(children.len(), record.child_node_count);
	assert_eq!(children.len(), 2);
	assert_eq!(children[0].node_id, reg.id_of(&main).unwrap());
	assert_eq!(children[1].node_id, reg.id_of(&span).unwrap());
	assert!(children.iter().all(|c| c.children.is_none()));
	assert!(children.iter().all(|c| c.parent_id == Some(record.node_id)));

	let deep = reg.serialize(&body, 2);
	let main_record = &deep.children.unwrap()[0];
	let text = &main_record.children.as_ref().unwrap()[0];
	assert_eq!(text.node_type, TEXT_NODE);
	assert_eq!(text.node_value, "hi");
	assert!(text.children.is_none());
	assert!(text.attributes.is_none());
}

#[test]
fn negative_depth_expands_everything() {
	let (doc, _, _, _) = sample();
	let mut reg = registry();

	let record = reg.serialize(&doc, -1);
	assert_eq!(record.node_type, DOCUMENT_NODE);
	assert!(record.parent_id.is_none());
	let html = &record.children.unwrap()[0];
	let body = &html.children.as_ref().unwrap()[0];
	let main = &body.children.as_ref().unwrap()[0];
	assert_eq!(main.children.as_ref().unwrap().len(), 1);
}

#[test]
fn whitespace_text_never_serialized() {
	let (doc, _, _, _) = sample();
	let mut reg = registry();

	fn walk(record: &cdp_bridge_protocol::NodeRecord) {
		for child in record.children.iter().flatten() {
			if child.node_type == TEXT_NODE {
				assert!(!child.node_value.trim().is_empty());
			}
			walk(child);
		}
	}
	walk(&reg.serialize(&doc, -1));
}

#[test]
fn attributes_are_flattened_pairs() {
	let (_, _, main, _) = sample();
	let mut reg = registry();

	let record = reg.serialize(&main, 0);
	assert_eq!(
		record.attributes.as_deref(),
		Some(&["id".to_string(), "main".into(), "class".into(), "box".into()][..])
	);
	assert_eq!(record.attribute("id"), Some("main"));
}

#[test]
fn pseudo_elements_synthesized_only_for_real_content() {
	let mut reg = registry();
	let el = Node::element("q")
		.with_pseudo_content(PseudoType::Before, "\"<<\"")
		.with_pseudo_content(PseudoType::After, "none");

	let record = reg.serialize(&el, 0);
	let pseudo = record.pseudo_elements.as_ref().unwrap();
	assert_eq!(pseudo.len(), 1);
	assert_eq!(pseudo[0].node_name, "::before");
	assert_eq!(pseudo[0].pseudo_type, Some(PseudoType::Before));
	assert_eq!(pseudo[0].parent_id, Some(record.node_id));
	assert_eq!(pseudo[0].child_node_count, 0);
	assert!(pseudo[0].attributes.is_none());
	assert_ne!(pseudo[0].node_id, record.node_id);

	let again = reg.serialize(&el, 0);
	assert_eq!(again.pseudo_elements.unwrap()[0].node_id, pseudo[0].node_id);
	assert!(reg.node(pseudo[0].node_id).is_none());

	let plain = reg.serialize(&Node::element("p"), 0);
	assert!(plain.pseudo_elements.is_none());
}

#[test]
fn previous_trackable_sibling_skips_hidden_nodes() {
	let (_, body, main, span) = sample();
	let reg = registry();

	assert!(reg.previous_trackable_sibling(&span).unwrap().ptr_eq(&main));
	assert!(reg.previous_trackable_sibling(&main).is_none());
	let overlay = body.children().pop().unwrap();
	assert!(reg.previous_trackable_sibling(&overlay).unwrap().ptr_eq(&span));
}

#[test]
fn reset_forgets_ids_without_reusing_them() {
	let (_, body, _, _) = sample();
	let mut reg = registry();

	let before = reg.id_for(&body);
	reg.mark_children_requested(before);
	reg.reset();

	assert!(reg.is_empty());
	assert!(reg.node(before).is_none());
	assert!(!reg.children_requested(before));
	assert!(reg.id_for(&body) > before);
}

#[test]
fn dropped_node_no_longer_resolves() {
	let mut reg = registry();
	let id = {
		let temp = Node::element("div");
		reg.id_for(&temp)
	};
	assert!(reg.node(id).is_none());
}

#[test]
fn insertion_under_requested_parent_reports_previous_sibling() {
	let (_, body, _, span) = sample();
	let mut reg = registry();

	let event = reg.set_child_nodes(&body, 1);
	let DomEvent::SetChildNodes(set) = event else {
		panic!("expected setChildNodes");
	};
	assert_eq!(set.nodes.len(), 2);

	let inserted = Node::element("em");
	body.insert_before(&inserted, span.next_sibling().as_ref());
	let Some(DomEvent::ChildNodeInserted(ev)) = reg.child_inserted(&inserted) else {
		panic!("expected childNodeInserted");
	};
	assert_eq!(ev.parent_node_id, set.parent_id);
	assert_eq!(ev.previous_node_id, reg.id_of(&span).unwrap());
	assert_eq!(ev.node.node_name, "EM");

	let first = Node::element("b");
	body.insert_before(&first, body.children().first());
	let Some(DomEvent::ChildNodeInserted(ev)) = reg.child_inserted(&first) else {
		panic!("expected childNodeInserted");
	};
	assert_eq!(ev.previous_node_id, 0);
}

#[test]
fn insertion_under_unexpanded_parent_only_updates_count() {
	let (_, body, main, _) = sample();
	let mut reg = registry();
	reg.serialize(&body, 0);

	let added = Node::element("i");
	main.append_child(&added);
	assert!(reg.child_inserted(&added).is_none(), "main was never seen");

	let added = Node::element("i");
	body.append_child(&added);
	let Some(DomEvent::ChildNodeCountUpdated(ev)) = reg.child_inserted(&added) else {
		panic!("expected childNodeCountUpdated");
	};
	assert_eq!(ev.child_node_count, 3);

	let blank = Node::text("   ");
	body.append_child(&blank);
	assert!(reg.child_inserted(&blank).is_none());
}

#[test]
fn removal_and_attribute_events() {
	let (_, body, main, span) = sample();
	let mut reg = registry();
	reg.set_child_nodes(&body, 1);

	body.remove_child(&span);
	let event = reg.child_removed(&body, &span).unwrap();
	assert_eq!(event.method(), "DOM.childNodeRemoved");

	main.set_attribute("title", "t");
	let Some(DomEvent::AttributeModified(ev)) = reg.attribute_changed(&main, "title") else {
		panic!("expected attributeModified");
	};
	assert_eq!(ev.value, "t");
	main.remove_attribute("title");
	let event = reg.attribute_changed(&main, "title").unwrap();
	assert_eq!(event.method(), "DOM.attributeRemoved");

	let params = event.into_event().unwrap().params;
	assert_eq!(params["name"], "title");
	assert_eq!(params["nodeId"], reg.id_of(&main).unwrap());
}
