//! Path-mounted resource provider resolution tree.
//!
//! Maps an arbitrary hierarchical path to one of many independently
//! registered backend providers. Providers mount at path prefixes; a
//! lookup walks the mount trie, tries providers from the deepest matching
//! node upward in priority order, and synthesizes placeholder resources so
//! traversal can continue through mount-point gaps.
//!
//! # Concurrency
//!
//! Readers never lock: every node publishes its handle list and child map
//! as [`arc_swap`] snapshots. Mount and unmount are serialized by a single
//! writer mutex and install replacement snapshots atomically, so a
//! concurrent reader sees either the fully-old or fully-new state.
//!
//! # Failure policy
//!
//! A provider failure during single-path resolution is fail-closed: the
//! whole lookup reports absence rather than falling through to a
//! lower-precedence provider it was meant to shadow. Write operations
//! surface errors; security vetoes are silent absence.

mod error;
mod handle;
mod node;
mod path;
mod priority;
mod query;
mod security;
mod tree;

pub use canopy_spi as spi;
pub use error::TreeError;
pub use handle::{ProviderHandle, ProviderKind};
pub use node::PathNode;
pub use path::{name, parent, split};
pub use priority::Priority;
pub use query::{FindResources, QueryResources};
pub use security::{SecureChildren, SecurityContext};
pub use tree::{Children, ProviderTree};

#[cfg(test)]
pub(crate) mod fixtures;
