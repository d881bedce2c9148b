//! Style sheet identity.
//!
//! Same scheme as the node registry: ids from a counter that is never
//! rewound, weak references back to the sheets.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use cdp_bridge_protocol::{StyleSheetHeader, StyleSheetId, StyleSheetOrigin};
use parking_lot::RwLock;

struct StyleSheetInner {
	href: Option<String>,
	title: String,
	text: RwLock<String>,
}

/// A style sheet attached to the inspected document.
#[derive(Clone)]
pub struct StyleSheet(Arc<StyleSheetInner>);

impl StyleSheet {
	/// Sheet loaded from `href`.
	pub fn linked(href: &str, text: &str) -> Self {
		Self::new(Some(href.to_string()), text)
	}

	/// Sheet from a `<style>` element.
	pub fn inline(text: &str) -> Self {
		Self::new(None, text)
	}

	fn new(href: Option<String>, text: &str) -> Self {
		StyleSheet(Arc::new(StyleSheetInner {
			href,
			title: String::new(),
			text: RwLock::new(text.to_string()),
		}))
	}

	pub fn href(&self) -> Option<&str> {
		self.0.href.as_deref()
	}

	pub fn text(&self) -> String {
		self.0.text.read().clone()
	}

	pub fn set_text(&self, text: &str) {
		*self.0.text.write() = text.to_string();
	}

	pub fn ptr_eq(&self, other: &StyleSheet) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	fn addr(&self) -> usize {
		Arc::as_ptr(&self.0) as usize
	}
}

#[derive(Default)]
pub struct StyleSheetRegistry {
	last_id: u64,
	ids: HashMap<usize, StyleSheetId>,
	sheets: HashMap<StyleSheetId, Weak<StyleSheetInner>>,
}

impl StyleSheetRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn id_for(&mut self, sheet: &StyleSheet) -> StyleSheetId {
		if let Some(id) = self.ids.get(&sheet.addr()) {
			return id.clone();
		}
		self.last_id += 1;
		let id = self.last_id.to_string();
		self.ids.insert(sheet.addr(), id.clone());
		self.sheets.insert(id.clone(), Arc::downgrade(&sheet.0));
		id
	}

	pub fn sheet(&self, id: &str) -> Option<StyleSheet> {
		self.sheets.get(id)?.upgrade().map(StyleSheet)
	}

	/// `CSS.styleSheetAdded` header for `sheet`.
	pub fn header(&mut self, sheet: &StyleSheet) -> StyleSheetHeader {
		StyleSheetHeader {
			style_sheet_id: self.id_for(sheet),
			source_url: sheet.href().unwrap_or_default().to_string(),
			origin: StyleSheetOrigin::Regular,
			title: sheet.0.title.clone(),
			is_inline: sheet.href().is_none(),
			length: sheet.text().len(),
		}
	}

	pub fn reset(&mut self) {
		self.ids.clear();
		self.sheets.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_are_stable_per_sheet() {
		let mut reg = StyleSheetRegistry::new();
		let a = StyleSheet::linked("https://example.com/a.css", "body{}");
		let b = StyleSheet::inline("p{color:red}");

		let id_a = reg.id_for(&a);
		assert_eq!(reg.id_for(&a.clone()), id_a);
		assert_ne!(reg.id_for(&b), id_a);
		assert!(reg.sheet(&id_a).unwrap().ptr_eq(&a));
	}

	#[test]
	fn header_describes_sheet() {
		let mut reg = StyleSheetRegistry::new();
		let sheet = StyleSheet::inline("p{color:red}");
		let header = reg.header(&sheet);
		assert!(header.is_inline);
		assert_eq!(header.length, 12);
		assert!(header.source_url.is_empty());

		let json = serde_json::to_value(&header).unwrap();
		assert_eq!(json["sourceURL"], "");
		assert_eq!(json["origin"], "regular");
	}

	#[test]
	fn reset_does_not_rewind_ids() {
		let mut reg = StyleSheetRegistry::new();
		let sheet = StyleSheet::inline("");
		let first = reg.id_for(&sheet);
		reg.reset();
		assert!(reg.sheet(&first).is_none());
		assert_ne!(reg.id_for(&sheet), first);
	}
}
