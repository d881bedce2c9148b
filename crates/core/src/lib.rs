//! Identity registries for CDP inspection of an in-process page.
//!
//! [`NodeRegistry`] hands out stable node ids for a [`Node`] tree and
//! serializes subtrees; [`ObjectRegistry`] hands out object ids for runtime
//! [`Value`]s and enumerates their properties. [`InspectorSession`] puts both
//! behind a CDP command dispatcher for one inspected page.

pub mod css;
pub mod dom;
pub mod error;
pub mod inspector;
pub mod runtime;

pub use css::{StyleSheet, StyleSheetRegistry};
pub use dom::{DomEvent, Node, NodeRegistry, NodeRegistryConfig, WeakNode};
pub use error::{Error, Result};
pub use inspector::{Dispatch, InspectorSession};
pub use runtime::{FormatOptions, GetPropertiesParams, Object, ObjectKind, ObjectRegistry, Property, Symbol, Thrown, Value};
