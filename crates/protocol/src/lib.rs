//! Wire types for the CDP introspection bridge.
//!
//! Everything here is plain serde data shaped after the Chrome DevTools
//! Protocol. The registries in `cdp-bridge` produce these records and the
//! relay carries them as opaque text frames.
//!
//! # Main Types
//!
//! - [`NodeRecord`] - serialized DOM node (`DOM.Node`)
//! - [`RemoteObject`] - serialized runtime value (`Runtime.RemoteObject`)
//! - [`PropertyDescriptor`] - one entry of a `Runtime.getProperties` result
//! - [`Command`], [`Response`], [`Event`] - message envelopes
//! - [`PageListing`] - one row of the relay's page list

pub mod css;
pub mod dom;
pub mod message;
pub mod relay;
pub mod runtime;

pub use css::{StyleSheetHeader, StyleSheetId, StyleSheetOrigin};
pub use dom::{NodeId, NodeRecord, PseudoType};
pub use message::{Command, Event, Response, ResponseError};
pub use relay::PageListing;
pub use runtime::{
	ObjectPreview, PropertyDescriptor, PropertyPreview, RemoteObject, RemoteObjectSubtype,
	RemoteObjectType,
};
