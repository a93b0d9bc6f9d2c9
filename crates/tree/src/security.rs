//! Security filtering applied around raw provider calls.
//!
//! Two layers, always consulted in the same order: the provider-level
//! filter (only for handles registered with security enabled) and the
//! application-level filter (for every handle, when configured). Either
//! layer can veto, which is indistinguishable from absence to the caller.

use std::sync::Arc;

use canopy_spi::{Resource, ResourceIter, SecurityFilter};

/// The optional security layers configured for a tree.
#[derive(Clone, Default)]
pub struct SecurityContext {
	/// Consulted only for handles registered with security enabled.
	pub provider_filter: Option<Arc<dyn SecurityFilter>>,
	/// Consulted for every handle when configured.
	pub app_filter: Option<Arc<dyn SecurityFilter>>,
}

impl SecurityContext {
	/// Applies both read layers to a found resource.
	///
	/// `provider_layer` reflects the handle's security flag; the
	/// application layer is applied unconditionally.
	pub(crate) fn filter_readable(
		&self,
		provider_layer: bool,
		resource: Resource,
	) -> Option<Resource> {
		let mut resource = resource;
		if provider_layer {
			if let Some(filter) = &self.provider_filter {
				resource = filter.filter_readable(resource)?;
			}
		}
		if let Some(filter) = &self.app_filter {
			resource = filter.filter_readable(resource)?;
		}
		Some(resource)
	}

	/// Returns true if both layers allow creating at `path`.
	pub(crate) fn allows_create(&self, provider_layer: bool, path: &str) -> bool {
		if provider_layer {
			if let Some(filter) = &self.provider_filter {
				if !filter.can_create(path) {
					return false;
				}
			}
		}
		match &self.app_filter {
			Some(filter) => filter.can_create(path),
			None => true,
		}
	}

	/// Returns true if both layers allow deleting `resource`.
	pub(crate) fn allows_delete(&self, provider_layer: bool, resource: &Resource) -> bool {
		if provider_layer {
			if let Some(filter) = &self.provider_filter {
				if !filter.can_delete(resource) {
					return false;
				}
			}
		}
		match &self.app_filter {
			Some(filter) => filter.can_delete(resource),
			None => true,
		}
	}
}

/// Lazily security-filtered stream of resources.
///
/// Pulls from the underlying provider iterator one item at a time and
/// drops vetoed entries without buffering the listing.
pub struct SecureChildren {
	inner: ResourceIter,
	security: SecurityContext,
	provider_layer: bool,
}

impl SecureChildren {
	pub(crate) fn new(inner: ResourceIter, security: SecurityContext, provider_layer: bool) -> Self {
		Self {
			inner,
			security,
			provider_layer,
		}
	}
}

impl Iterator for SecureChildren {
	type Item = Resource;

	fn next(&mut self) -> Option<Resource> {
		loop {
			let candidate = self.inner.next()?;
			if let Some(resource) = self
				.security
				.filter_readable(self.provider_layer, candidate)
			{
				return Some(resource);
			}
		}
	}
}
