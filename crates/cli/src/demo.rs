//! Sample page served by `cdp-bridge demo`.

use cdp_bridge::css::StyleSheet;
use cdp_bridge::{Node, NodeRegistryConfig};
use cdp_bridge_protocol::PseudoType;

/// Class hidden from inspectors on the demo page.
pub const OVERLAY_CLASS: &str = "cdp-bridge-overlay";

pub fn registry_config() -> NodeRegistryConfig {
	NodeRegistryConfig::new().ignore_class(OVERLAY_CLASS)
}

/// A small document with a bit of everything the inspector renders.
pub fn sample_document() -> Node {
	let head = Node::element("head").with_children([
		Node::element("title").with_children([Node::text("cdp-bridge demo")]),
		Node::element("link")
			.with_attribute("rel", "stylesheet")
			.with_attribute("href", "/demo.css"),
	]);
	let list = Node::element("ul").with_attribute("id", "items").with_children([
		Node::element("li").with_children([Node::text("first")]),
		Node::text("\n  "),
		Node::element("li")
			.with_attribute("class", "current")
			.with_pseudo_content(PseudoType::Before, "\"> \"")
			.with_children([Node::text("second")]),
	]);
	let body = Node::element("body").with_children([
		Node::comment(" rendered by cdp-bridge "),
		Node::element("h1").with_children([Node::text("Hello from cdp-bridge")]),
		list,
		Node::element("div").with_attribute("class", OVERLAY_CLASS),
	]);
	Node::document().with_children([
		Node::doctype("html"),
		Node::element("html").with_children([head, body]),
	])
}

pub fn sample_style_sheets() -> Vec<StyleSheet> {
	vec![
		StyleSheet::linked("/demo.css", "body { font-family: sans-serif; }\n"),
		StyleSheet::inline(".current { font-weight: bold; }\n"),
	]
}
