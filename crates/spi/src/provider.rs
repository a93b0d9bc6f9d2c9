//! Provider-facing traits.
//!
//! # Role
//!
//! These are the interfaces the resolution tree consumes. A provider is
//! registered at one or more mount paths and answers `get_resource` calls
//! for paths at or below its mount point. The optional capabilities
//! (mutation, query, attributes, adaptation) default to "not supported".

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::error::ProviderError;
use crate::resource::Resource;
use crate::value::{AttributeMap, Value};

/// Children listing produced by a provider, consumed lazily.
pub type ResourceIter = Box<dyn Iterator<Item = Resource> + Send>;

/// Query result rows produced by a provider, consumed lazily.
pub type AttributeMapIter = Box<dyn Iterator<Item = AttributeMap> + Send>;

/// A backend answering for resources at and below its mount path.
///
/// Implementations must be thread-safe: the tree shares them by reference
/// across any number of concurrent resolutions.
pub trait ResourceProvider: Send + Sync {
	/// Returns the resource at `path`, or `Ok(None)` if this provider has
	/// nothing there.
	fn get_resource(&self, path: &str) -> Result<Option<Resource>, ProviderError>;

	/// Lists the children of `parent`, or `Ok(None)` if the parent is
	/// unknown to this provider.
	fn list_children(&self, parent: &Resource) -> Result<Option<ResourceIter>, ProviderError> {
		let _ = parent;
		Ok(None)
	}

	/// Returns the query capability of this provider, if any.
	fn query_provider(&self) -> Option<&dyn QueryProvider> {
		None
	}

	/// Returns the mutation capability of this provider, if any.
	fn modifying(&self) -> Option<&dyn ModifyingProvider> {
		None
	}

	/// Names of the attributes this provider exposes.
	fn attribute_names(&self) -> Vec<String> {
		Vec::new()
	}

	/// Returns the named attribute, if this provider exposes it.
	fn attribute(&self, name: &str) -> Option<Value> {
		let _ = name;
		None
	}

	/// Adapts this provider to an arbitrary target type.
	///
	/// The returned box must downcast to the type identified by `target`.
	fn adapt(&self, target: TypeId) -> Option<Box<dyn Any>> {
		let _ = target;
		None
	}
}

/// Mutation capability of a provider.
pub trait ModifyingProvider {
	/// Creates a resource at `path` with the given properties.
	fn create(&self, path: &str, properties: AttributeMap) -> Result<Resource, ProviderError>;

	/// Deletes the resource at `path`.
	fn delete(&self, path: &str) -> Result<(), ProviderError>;

	/// Copies the subtree at `src` to `dst`.
	fn copy(&self, src: &str, dst: &str) -> Result<(), ProviderError>;

	/// Moves the subtree at `src` to `dst`.
	fn rename(&self, src: &str, dst: &str) -> Result<(), ProviderError>;

	/// Persists all pending changes.
	fn commit(&self) -> Result<(), ProviderError>;

	/// Discards all pending changes.
	fn revert(&self);

	/// Returns true if there are unpersisted changes.
	fn has_changes(&self) -> bool;
}

/// Query capability of a provider.
pub trait QueryProvider {
	/// Returns true if this provider can execute queries in `language`.
	fn supports_language(&self, language: &str) -> bool;

	/// Executes `query` and streams matching resources.
	fn find_resources(&self, query: &str, language: &str) -> Result<ResourceIter, ProviderError>;

	/// Executes `query` and streams raw result rows.
	fn query_resources(
		&self,
		query: &str,
		language: &str,
	) -> Result<AttributeMapIter, ProviderError>;
}

/// Factory for providers that authenticate lazily.
///
/// The tree calls `provider` on first use of the registration and caches
/// the result; a failed login surfaces as a [`ProviderError::Login`].
pub trait ProviderFactory: Send + Sync {
	/// Authenticates and returns the provider for this registration.
	fn provider(&self) -> Result<Arc<dyn ResourceProvider>, ProviderError>;
}
