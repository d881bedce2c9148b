//! `CSS` domain records.

use serde::{Deserialize, Serialize};

pub type StyleSheetId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleSheetOrigin {
	Regular,
	Inspector,
	UserAgent,
}

/// `CSS.styleSheetAdded` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheetHeader {
	pub style_sheet_id: StyleSheetId,
	#[serde(rename = "sourceURL")]
	pub source_url: String,
	pub origin: StyleSheetOrigin,
	pub title: String,
	pub is_inline: bool,
	pub length: usize,
}
