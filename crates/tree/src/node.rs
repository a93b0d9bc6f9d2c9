//! Trie node keyed by one path segment.
//!
//! # Role
//!
//! A node holds the handles mounted exactly at its full path, sorted by
//! priority, and the child nodes for the next path segment. Both
//! collections are published through [`ArcSwap`] snapshots: readers load a
//! snapshot and never lock, writers (which the tree serializes) build a
//! replacement and install it with a single swap.
//!
//! # Invariants
//!
//! - The handle vector is always sorted by [`Priority`].
//! - Child keys are non-empty segments containing no `/`.
//! - Nodes are never pruned when their handle list empties; the synthetic
//!   fallback depends on the chain for a deep mount staying walkable.

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;

use crate::handle::ProviderHandle;

type HandleVec = Vec<Arc<ProviderHandle>>;
type ChildMap = FxHashMap<String, Arc<PathNode>>;

/// One node in the mount-path trie.
pub struct PathNode {
	segment: String,
	full_path: String,
	handles: ArcSwap<HandleVec>,
	children: ArcSwap<ChildMap>,
}

impl PathNode {
	/// Creates the root node, whose full path is `/`.
	pub fn root() -> Self {
		Self::new(String::new(), "/".to_owned())
	}

	pub(crate) fn new(segment: String, full_path: String) -> Self {
		Self {
			segment,
			full_path,
			handles: ArcSwap::from_pointee(Vec::new()),
			children: ArcSwap::from_pointee(ChildMap::default()),
		}
	}

	/// The path segment this node is keyed by (empty for the root).
	pub fn segment(&self) -> &str {
		&self.segment
	}

	/// The absolute path this node represents.
	pub fn full_path(&self) -> &str {
		&self.full_path
	}

	/// Current handle snapshot, sorted by priority.
	pub fn handles(&self) -> Arc<HandleVec> {
		self.handles.load_full()
	}

	/// Current children snapshot.
	pub fn children(&self) -> Arc<ChildMap> {
		self.children.load_full()
	}

	/// Looks up the child for one segment.
	pub fn child(&self, segment: &str) -> Option<Arc<PathNode>> {
		self.children.load().get(segment).cloned()
	}

	/// Links a child node. Caller must hold the tree's writer lock.
	pub(crate) fn link_child(&self, child: Arc<PathNode>) {
		let mut next: ChildMap = (**self.children.load()).clone();
		next.insert(child.segment.clone(), child);
		self.children.store(Arc::new(next));
	}

	/// Inserts a handle, keeping the vector sorted. Returns false if a
	/// handle with the same registration id is already present.
	///
	/// Caller must hold the tree's writer lock.
	pub(crate) fn add_handle(&self, handle: Arc<ProviderHandle>) -> bool {
		let current = self.handles.load();
		if current
			.iter()
			.any(|h| h.registration_id() == handle.registration_id())
		{
			return false;
		}
		tracing::debug!("adding provider {handle:?} at {}", self.full_path);
		let mut next: HandleVec = (**current).clone();
		next.push(handle);
		next.sort_unstable_by(|a, b| a.priority().cmp(&b.priority()));
		self.handles.store(Arc::new(next));
		true
	}

	/// Removes the handle with the given registration id. Returns false
	/// if no such handle is mounted here.
	///
	/// Caller must hold the tree's writer lock.
	pub(crate) fn remove_handle(&self, registration_id: u64) -> bool {
		let current = self.handles.load();
		let next: HandleVec = current
			.iter()
			.filter(|h| h.registration_id() != registration_id)
			.cloned()
			.collect();
		if next.len() == current.len() {
			return false;
		}
		tracing::debug!("removing provider {registration_id} at {}", self.full_path);
		self.handles.store(Arc::new(next));
		true
	}

	/// Walks the children for each segment in turn and collects the nodes
	/// actually traversed, stopping at the first missing child. The
	/// starting node itself is not included.
	pub fn collect_matching(&self, segments: &[&str]) -> Vec<Arc<PathNode>> {
		let mut matched = Vec::with_capacity(segments.len());
		let mut current = self.children.load_full();
		for segment in segments {
			let Some(child) = current.get(*segment).cloned() else {
				break;
			};
			current = child.children.load_full();
			matched.push(child);
		}
		matched
	}
}

impl std::fmt::Debug for PathNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PathNode")
			.field("full_path", &self.full_path)
			.field("handles", &self.handles.load().len())
			.field("children", &self.children.load().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::direct_handle;

	#[test]
	fn add_handle_keeps_priority_order() {
		let node = PathNode::root();
		assert!(node.add_handle(direct_handle(10, 2)));
		assert!(node.add_handle(direct_handle(20, 3)));
		assert!(node.add_handle(direct_handle(10, 1)));

		let ids: Vec<u64> = node.handles().iter().map(|h| h.registration_id()).collect();
		assert_eq!(ids, vec![3, 1, 2]);
	}

	#[test]
	fn duplicate_registration_is_a_noop() {
		let node = PathNode::root();
		assert!(node.add_handle(direct_handle(0, 7)));
		assert!(!node.add_handle(direct_handle(0, 7)));
		assert_eq!(node.handles().len(), 1);
	}

	#[test]
	fn remove_handle_reports_absence() {
		let node = PathNode::root();
		node.add_handle(direct_handle(0, 7));
		assert!(node.remove_handle(7));
		assert!(!node.remove_handle(7));
		assert!(node.handles().is_empty());
	}

	#[test]
	fn snapshot_survives_mutation() {
		let node = PathNode::root();
		node.add_handle(direct_handle(0, 1));
		let before = node.handles();
		node.add_handle(direct_handle(0, 2));
		// The old snapshot is untouched; a new one was installed.
		assert_eq!(before.len(), 1);
		assert_eq!(node.handles().len(), 2);
	}

	#[test]
	fn collect_matching_stops_at_missing_child() {
		let root = PathNode::root();
		let a = Arc::new(PathNode::new("a".into(), "/a".into()));
		let b = Arc::new(PathNode::new("b".into(), "/a/b".into()));
		a.link_child(b);
		root.link_child(a);

		let matched = root.collect_matching(&["a", "b", "c"]);
		let paths: Vec<&str> = matched.iter().map(|n| n.full_path()).collect();
		assert_eq!(paths, vec!["/a", "/a/b"]);
	}
}
