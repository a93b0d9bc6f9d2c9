//! Service provider interfaces for the canopy resource tree.
//!
//! Backend providers (repositories, databases, bundle resources, synthetic
//! trees) implement the traits in this crate and are mounted into the tree
//! by the surrounding service layer. The tree itself lives in `canopy-tree`
//! and only ever talks to providers through these interfaces.

mod error;
mod provider;
mod resource;
mod security;
mod value;

pub use error::ProviderError;
pub use provider::{
	AttributeMapIter, ModifyingProvider, ProviderFactory, QueryProvider, ResourceIter,
	ResourceProvider,
};
pub use resource::{Resource, SYNTHETIC_RESOURCE_TYPE};
pub use security::{FORBIDDEN_ATTRIBUTE, SecurityFilter};
pub use value::{AttributeMap, Value};
