//! The provider tree: registration surface, path resolution, and the
//! cross-cutting operations that visit every registered provider.
//!
//! # Role
//!
//! This is the single owner of the mount-path trie and of the flat
//! registration-order index used by the aggregate operations. Readers
//! never lock: they work against per-node snapshots. Writers are
//! serialized by one mutex and install replacement snapshots atomically.

use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use canopy_spi::{
	AttributeMap, FORBIDDEN_ATTRIBUTE, ProviderFactory, Resource, ResourceProvider, Value,
};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::error::TreeError;
use crate::handle::{ProviderHandle, ProviderKind};
use crate::node::PathNode;
use crate::path::split;
use crate::priority::Priority;
use crate::query::{FindResources, QueryResources};
use crate::security::{SecureChildren, SecurityContext};

/// The root of the mount-path trie plus the flat handle index.
pub struct ProviderTree {
	root: Arc<PathNode>,
	/// All live handles in registration order, for cross-cutting iteration.
	index: ArcSwap<Vec<Arc<ProviderHandle>>>,
	security: SecurityContext,
	/// Serializes mount/unmount; never taken by readers.
	write_lock: Mutex<()>,
	next_id: AtomicU64,
}

impl ProviderTree {
	/// Creates an empty tree with no security layers configured.
	pub fn new() -> Self {
		Self::with_security(SecurityContext::default())
	}

	/// Creates an empty tree with the given security layers.
	pub fn with_security(security: SecurityContext) -> Self {
		Self {
			root: Arc::new(PathNode::root()),
			index: ArcSwap::from_pointee(Vec::new()),
			security,
			write_lock: Mutex::new(()),
			next_id: AtomicU64::new(1),
		}
	}

	/// The root node of the trie.
	pub fn root(&self) -> &Arc<PathNode> {
		&self.root
	}

	// ---- registration ----------------------------------------------------

	/// Mounts a ready-to-use provider at `path`.
	pub fn mount_provider(
		&self,
		path: &str,
		provider: Arc<dyn ResourceProvider>,
		rank: i32,
		security_enabled: bool,
	) -> Priority {
		self.mount(path, ProviderKind::Direct(provider), rank, security_enabled)
	}

	/// Mounts a lazily-authenticated provider factory at `path`.
	pub fn mount_factory(
		&self,
		path: &str,
		factory: Arc<dyn ProviderFactory>,
		rank: i32,
		security_enabled: bool,
	) -> Priority {
		let kind = ProviderKind::Factory {
			factory,
			cache: Mutex::new(None),
		};
		self.mount(path, kind, rank, security_enabled)
	}

	/// Mounts a provider registration, assigning its registration id.
	///
	/// Walks the segment chain from the root, creating missing nodes, and
	/// inserts the handle at the resulting leaf. The assigned [`Priority`]
	/// is returned; its registration id is the token for [`unmount`].
	///
	/// [`unmount`]: ProviderTree::unmount
	pub fn mount(
		&self,
		path: &str,
		kind: ProviderKind,
		rank: i32,
		security_enabled: bool,
	) -> Priority {
		let priority = Priority::new(rank, self.next_id.fetch_add(1, Ordering::Relaxed));
		let handle = Arc::new(ProviderHandle::new(
			priority,
			security_enabled,
			normalize_mount_path(path),
			kind,
		));

		let _guard = self.write_lock.lock();
		let node = self.extend_chain(handle.mount_path());
		if node.add_handle(handle.clone()) {
			let mut index: Vec<Arc<ProviderHandle>> = (**self.index.load()).clone();
			index.push(handle);
			self.index.store(Arc::new(index));
		}
		tracing::debug!("mounted provider {priority:?} at {path}");
		priority
	}

	/// Unmounts the registration with the given id.
	///
	/// Returns false when no such registration is live. The node the
	/// handle was mounted on is kept even if it ends up empty; it is
	/// recreated lazily on remount and the synthetic fallback relies on
	/// existing chains staying walkable.
	pub fn unmount(&self, registration_id: u64) -> bool {
		let _guard = self.write_lock.lock();

		let index = self.index.load();
		let Some(handle) = index
			.iter()
			.find(|h| h.registration_id() == registration_id)
			.cloned()
		else {
			tracing::warn!("unable to unmount {registration_id}, no matching registration");
			return false;
		};

		let segments = split(handle.mount_path());
		let chain = self.root.collect_matching(&segments);
		let node = if segments.is_empty() {
			Some(self.root.clone())
		} else if chain.len() == segments.len() {
			chain.last().cloned()
		} else {
			None
		};
		let removed = match node {
			Some(node) => node.remove_handle(registration_id),
			None => false,
		};
		if !removed {
			tracing::warn!(
				"unable to unmount {registration_id} at {}, no matching entry",
				handle.mount_path()
			);
			return false;
		}

		let next: Vec<Arc<ProviderHandle>> = index
			.iter()
			.filter(|h| h.registration_id() != registration_id)
			.cloned()
			.collect();
		self.index.store(Arc::new(next));
		tracing::debug!("unmounted provider {registration_id}");
		true
	}

	/// Walks the chain for `path`, creating missing nodes. Caller must
	/// hold the writer lock.
	fn extend_chain(&self, path: &str) -> Arc<PathNode> {
		let mut current = self.root.clone();
		for segment in split(path) {
			let next = match current.child(segment) {
				Some(child) => child,
				None => {
					let full_path = if current.full_path() == "/" {
						format!("/{segment}")
					} else {
						format!("{}/{segment}", current.full_path())
					};
					let child = Arc::new(PathNode::new(segment.to_owned(), full_path));
					current.link_child(child.clone());
					child
				}
			};
			current = next;
		}
		current
	}

	// ---- resolution ------------------------------------------------------

	/// Resolves `path` to a resource.
	///
	/// Nodes along the matched chain are tried deepest-first, each node's
	/// handles in priority order; root-mounted catch-all handles are tried
	/// last. If nothing answers but the chain fully matches a handleless
	/// node, a synthetic placeholder keeps the path traversable. A
	/// provider failure aborts the whole attempt and reports absence.
	pub fn resolve(&self, path: &str) -> Option<Resource> {
		match self.resolve_inner(path) {
			Ok(resource) => resource,
			Err(err) => {
				tracing::warn!("resolution of {path} failed, reporting absence: {err}");
				None
			}
		}
	}

	fn resolve_inner(&self, path: &str) -> Result<Option<Resource>, canopy_spi::ProviderError> {
		if !path.starts_with('/') {
			tracing::debug!("not absolute: {path}");
			return Ok(None);
		}
		let segments = split(path);
		let chain = self.root.collect_matching(&segments);

		for node in chain.iter().rev() {
			for handle in node.handles().iter() {
				if let Some(resource) = handle.get_resource(&self.security, path)? {
					tracing::debug!("resolved {path} at {}", node.full_path());
					return Ok(Some(resource));
				}
			}
		}

		// Handles mounted at the root answer for any path.
		for handle in self.root.handles().iter() {
			if let Some(resource) = handle.get_resource(&self.security, path)? {
				tracing::debug!("resolved {path} at /");
				return Ok(Some(resource));
			}
		}

		// A fully matched chain ending in a handleless node means a
		// provider is mounted somewhere below: keep the path traversable.
		if !segments.is_empty() && chain.len() == segments.len() {
			if let Some(last) = chain.last() {
				if last.handles().is_empty() {
					tracing::debug!("synthesized {path}");
					return Ok(Some(Resource::synthetic(path)));
				}
			}
		}

		tracing::debug!("no resource for {path}");
		Ok(None)
	}

	/// Returns the highest-precedence handle along `path` whose provider
	/// supports mutation. There is no synthetic fallback for writes.
	pub fn resolve_for_write(&self, path: &str) -> Result<Arc<ProviderHandle>, TreeError> {
		let segments = split(path);
		let chain = self.root.collect_matching(&segments);

		for node in chain.iter().rev() {
			for handle in node.handles().iter() {
				if handle.supports_modifying() {
					return Ok(handle.clone());
				}
			}
		}
		for handle in self.root.handles().iter() {
			if handle.supports_modifying() {
				return Ok(handle.clone());
			}
		}
		Err(TreeError::Unsupported {
			operation: "write",
			path: path.to_owned(),
		})
	}

	/// Creates a resource at `path` through the responsible provider.
	pub fn create(&self, path: &str, properties: AttributeMap) -> Result<Resource, TreeError> {
		let handle = self.resolve_for_write(path)?;
		if !handle.can_create(&self.security, path) {
			return Err(TreeError::Unsupported {
				operation: "create",
				path: path.to_owned(),
			});
		}
		let provider = handle.provider()?;
		let modifying = provider.modifying().ok_or_else(|| TreeError::Unsupported {
			operation: "create",
			path: path.to_owned(),
		})?;
		Ok(modifying.create(path, properties)?)
	}

	/// Deletes `resource` through the responsible provider.
	pub fn delete(&self, resource: &Resource) -> Result<(), TreeError> {
		let handle = self.resolve_for_write(&resource.path)?;
		if !handle.can_delete(&self.security, resource) {
			return Err(TreeError::Unsupported {
				operation: "delete",
				path: resource.path.clone(),
			});
		}
		let provider = handle.provider()?;
		let modifying = provider.modifying().ok_or_else(|| TreeError::Unsupported {
			operation: "delete",
			path: resource.path.clone(),
		})?;
		Ok(modifying.delete(&resource.path)?)
	}

	/// Lists the children of `parent`: the first matching provider's
	/// listing (lazily security-filtered), followed by placeholders for
	/// child mount points the listing did not cover.
	pub fn list_children(&self, parent: &Resource) -> Children {
		let segments = split(&parent.path);
		let chain = self.root.collect_matching(&segments);

		let mut inner = None;
		'outer: for node in chain.iter().rev().chain(std::iter::once(&self.root)) {
			for handle in node.handles().iter() {
				match handle.list_children(&self.security, parent) {
					Ok(Some(children)) => {
						inner = Some(children);
						break 'outer;
					}
					Ok(None) => {}
					Err(err) => {
						tracing::warn!(
							"children listing of {} failed, reporting empty: {err}",
							parent.path
						);
						break 'outer;
					}
				}
			}
		}

		// Child mount points of the parent node stay visible even when no
		// provider lists them.
		let parent_node = if segments.is_empty() {
			Some(self.root.clone())
		} else if chain.len() == segments.len() {
			chain.last().cloned()
		} else {
			None
		};
		let mut mount_children: Vec<Arc<PathNode>> = parent_node
			.map(|node| node.children().values().cloned().collect())
			.unwrap_or_default();
		mount_children.sort_by(|a, b| a.segment().cmp(b.segment()));

		Children {
			inner,
			mount_children: mount_children.into_iter(),
			security: self.security.clone(),
			visited: FxHashSet::default(),
		}
	}

	// ---- cross-cutting aggregation ---------------------------------------

	/// Asks every registered provider, in registration order, for an
	/// adaptation to `T`; the first success wins.
	pub fn adapt_to<T: 'static>(&self) -> Option<T> {
		let target = TypeId::of::<T>();
		for handle in self.index.load().iter() {
			let provider = match handle.provider() {
				Ok(provider) => provider,
				Err(err) => {
					tracing::warn!(
						"provider at {} unavailable for adaptation: {err}",
						handle.mount_path()
					);
					continue;
				}
			};
			if let Some(adapted) = provider.adapt(target) {
				match adapted.downcast::<T>() {
					Ok(value) => return Some(*value),
					Err(_) => {
						tracing::warn!(
							"provider at {} returned a mistyped adaptation",
							handle.mount_path()
						);
					}
				}
			}
		}
		None
	}

	/// Streams query results from every provider supporting `language`.
	pub fn find_resources(&self, query: &str, language: &str) -> FindResources {
		FindResources::new(
			self.eligible_handles(language),
			self.security.clone(),
			query.to_owned(),
			language.to_owned(),
		)
	}

	/// Streams raw query rows from every provider supporting `language`.
	pub fn query_resources(&self, query: &str, language: &str) -> QueryResources {
		QueryResources::new(
			self.eligible_handles(language),
			query.to_owned(),
			language.to_owned(),
		)
	}

	fn eligible_handles(&self, language: &str) -> Vec<Arc<ProviderHandle>> {
		self.index
			.load()
			.iter()
			.filter(|h| h.supports_language(language))
			.cloned()
			.collect()
	}

	/// Union of attribute names across all providers, in registration
	/// order, deduplicated. The reserved credential attribute is never
	/// reported.
	pub fn attribute_names(&self) -> Vec<String> {
		let mut seen = FxHashSet::default();
		let mut names = Vec::new();
		for handle in self.index.load().iter() {
			let provider = match handle.provider() {
				Ok(provider) => provider,
				Err(_) => continue,
			};
			for name in provider.attribute_names() {
				if name != FORBIDDEN_ATTRIBUTE && seen.insert(name.clone()) {
					names.push(name);
				}
			}
		}
		names
	}

	/// First match for the named attribute across all providers, in
	/// registration order. The reserved credential attribute always reads
	/// as absent.
	pub fn attribute(&self, name: &str) -> Option<Value> {
		if name == FORBIDDEN_ATTRIBUTE {
			return None;
		}
		for handle in self.index.load().iter() {
			let provider = match handle.provider() {
				Ok(provider) => provider,
				Err(_) => continue,
			};
			if let Some(value) = provider.attribute(name) {
				return Some(value);
			}
		}
		None
	}
}

impl Default for ProviderTree {
	fn default() -> Self {
		Self::new()
	}
}

/// Children stream produced by [`ProviderTree::list_children`].
///
/// Yields the provider listing first, then a placeholder (or resolved
/// resource) for each child mount point the listing did not already name.
pub struct Children {
	inner: Option<SecureChildren>,
	mount_children: std::vec::IntoIter<Arc<PathNode>>,
	security: SecurityContext,
	visited: FxHashSet<String>,
}

impl Iterator for Children {
	type Item = Resource;

	fn next(&mut self) -> Option<Resource> {
		if let Some(inner) = &mut self.inner {
			if let Some(resource) = inner.next() {
				self.visited.insert(resource.name().to_owned());
				return Some(resource);
			}
			self.inner = None;
		}
		loop {
			let node = self.mount_children.next()?;
			if !self.visited.insert(node.segment().to_owned()) {
				continue;
			}
			// A provider mounted directly on the child node answers for
			// it; otherwise it is pure traversal scaffolding.
			for handle in node.handles().iter() {
				match handle.get_resource(&self.security, node.full_path()) {
					Ok(Some(resource)) => return Some(resource),
					Ok(None) => {}
					Err(err) => {
						tracing::warn!(
							"child lookup of {} failed, synthesizing: {err}",
							node.full_path()
						);
						break;
					}
				}
			}
			return Some(Resource::synthetic(node.full_path()));
		}
	}
}

/// Normalizes a mount path to an absolute path with no trailing slash.
fn normalize_mount_path(path: &str) -> String {
	let segments = split(path);
	if segments.is_empty() {
		return "/".to_owned();
	}
	let mut normalized = String::with_capacity(path.len() + 1);
	for segment in segments {
		normalized.push('/');
		normalized.push_str(segment);
	}
	normalized
}
