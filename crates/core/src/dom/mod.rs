//! DOM side of the bridge: the live tree and its identity registry.

mod mutation;
mod node;
mod registry;

#[cfg(test)]
mod tests;

pub use mutation::DomEvent;
pub use node::{Node, WeakNode};
pub use registry::{NodeRegistry, NodeRegistryConfig};
