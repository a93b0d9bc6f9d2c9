//! Per-registration wrapper around one backend provider.
//!
//! # Role
//!
//! A handle pairs a provider with its resolution priority and its mount
//! path, and routes every read through the security layers. Handles are
//! created at mount time, owned by the node they are mounted on, and
//! compared by registration identity.

use std::cmp::Ordering;
use std::sync::Arc;

use canopy_spi::{ProviderError, ProviderFactory, Resource, ResourceProvider};
use parking_lot::Mutex;

use crate::priority::Priority;
use crate::security::{SecureChildren, SecurityContext};

/// Where the handle's provider comes from.
pub enum ProviderKind {
	/// A ready-to-use provider handed over at registration.
	Direct(Arc<dyn ResourceProvider>),
	/// A factory that authenticates on first use; the resulting provider
	/// is cached for the lifetime of the registration.
	Factory {
		factory: Arc<dyn ProviderFactory>,
		cache: Mutex<Option<Arc<dyn ResourceProvider>>>,
	},
}

/// One registered provider plus its ordering and security configuration.
pub struct ProviderHandle {
	priority: Priority,
	security_enabled: bool,
	mount_path: String,
	kind: ProviderKind,
}

impl ProviderHandle {
	pub(crate) fn new(
		priority: Priority,
		security_enabled: bool,
		mount_path: String,
		kind: ProviderKind,
	) -> Self {
		Self {
			priority,
			security_enabled,
			mount_path,
			kind,
		}
	}

	/// The ordering key assigned at registration.
	pub fn priority(&self) -> Priority {
		self.priority
	}

	/// The globally-unique id assigned at registration.
	pub fn registration_id(&self) -> u64 {
		self.priority.registration_id
	}

	/// The absolute path this handle is mounted at.
	pub fn mount_path(&self) -> &str {
		&self.mount_path
	}

	/// Whether the provider-level security layer applies to this handle.
	pub fn security_enabled(&self) -> bool {
		self.security_enabled
	}

	/// Returns the wrapped provider, authenticating a factory on first use.
	pub fn provider(&self) -> Result<Arc<dyn ResourceProvider>, ProviderError> {
		match &self.kind {
			ProviderKind::Direct(provider) => Ok(provider.clone()),
			ProviderKind::Factory { factory, cache } => {
				let mut slot = cache.lock();
				if let Some(provider) = &*slot {
					return Ok(provider.clone());
				}
				let provider = factory.provider()?;
				*slot = Some(provider.clone());
				Ok(provider)
			}
		}
	}

	/// Fetches the resource at `path` and routes it through both security
	/// layers. A veto turns a found resource into `Ok(None)`.
	pub fn get_resource(
		&self,
		security: &SecurityContext,
		path: &str,
	) -> Result<Option<Resource>, ProviderError> {
		let provider = self.provider()?;
		let Some(resource) = provider.get_resource(path)? else {
			return Ok(None);
		};
		Ok(security.filter_readable(self.security_enabled, resource))
	}

	/// Lists the children of `parent` as a lazily filtered stream, or
	/// `Ok(None)` if the provider does not know the parent.
	pub fn list_children(
		&self,
		security: &SecurityContext,
		parent: &Resource,
	) -> Result<Option<SecureChildren>, ProviderError> {
		let provider = self.provider()?;
		let Some(children) = provider.list_children(parent)? else {
			return Ok(None);
		};
		Ok(Some(SecureChildren::new(
			children,
			security.clone(),
			self.security_enabled,
		)))
	}

	/// Runs the provider's query and wraps the result stream in read
	/// security filtering.
	pub fn find_resources(
		&self,
		security: &SecurityContext,
		query: &str,
		language: &str,
	) -> Result<SecureChildren, ProviderError> {
		let provider = self.provider()?;
		let query_provider = provider
			.query_provider()
			.ok_or(ProviderError::Unsupported {
				operation: "find_resources",
			})?;
		let results = query_provider.find_resources(query, language)?;
		Ok(SecureChildren::new(
			results,
			security.clone(),
			self.security_enabled,
		))
	}

	/// Returns true if both security layers allow creating at `path`.
	pub fn can_create(&self, security: &SecurityContext, path: &str) -> bool {
		security.allows_create(self.security_enabled, path)
	}

	/// Returns true if both security layers allow deleting `resource`.
	pub fn can_delete(&self, security: &SecurityContext, resource: &Resource) -> bool {
		security.allows_delete(self.security_enabled, resource)
	}

	/// Returns true if the wrapped provider can execute queries in
	/// `language`. A factory that fails to authenticate is reported as
	/// not supporting anything.
	pub fn supports_language(&self, language: &str) -> bool {
		match self.provider() {
			Ok(provider) => provider
				.query_provider()
				.is_some_and(|q| q.supports_language(language)),
			Err(err) => {
				tracing::warn!(
					"provider at {} unavailable for query probing: {err}",
					self.mount_path
				);
				false
			}
		}
	}

	/// Returns true if the wrapped provider has mutation capability.
	///
	/// Probing a factory handle authenticates it; a login failure means
	/// the handle is skipped, not that resolution fails.
	pub fn supports_modifying(&self) -> bool {
		match self.provider() {
			Ok(provider) => provider.modifying().is_some(),
			Err(err) => {
				tracing::warn!(
					"provider at {} unavailable for write probing: {err}",
					self.mount_path
				);
				false
			}
		}
	}
}

impl PartialEq for ProviderHandle {
	fn eq(&self, other: &Self) -> bool {
		self.registration_id() == other.registration_id()
	}
}

impl Eq for ProviderHandle {}

impl Ord for ProviderHandle {
	fn cmp(&self, other: &Self) -> Ordering {
		self.priority.cmp(&other.priority)
	}
}

impl PartialOrd for ProviderHandle {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl std::fmt::Debug for ProviderHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProviderHandle")
			.field("priority", &self.priority)
			.field("mount_path", &self.mount_path)
			.field("security_enabled", &self.security_enabled)
			.finish()
	}
}
