use crate::value::AttributeMap;

/// Resource type assigned to placeholder resources synthesized by the tree.
///
/// Callers use this to distinguish "real but empty" resources from pure
/// traversal scaffolding between the root and a deep mount point.
pub const SYNTHETIC_RESOURCE_TYPE: &str = "sling:syntheticResourceProviderResource";

/// A resolved resource: an absolute path, a type, and its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
	pub path: String,
	pub resource_type: String,
	pub properties: AttributeMap,
}

impl Resource {
	/// Creates a resource with no properties.
	pub fn new(path: impl Into<String>, resource_type: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			resource_type: resource_type.into(),
			properties: AttributeMap::default(),
		}
	}

	/// Creates a resource carrying the given properties.
	pub fn with_properties(
		path: impl Into<String>,
		resource_type: impl Into<String>,
		properties: AttributeMap,
	) -> Self {
		Self {
			path: path.into(),
			resource_type: resource_type.into(),
			properties,
		}
	}

	/// Creates a placeholder resource for a path no provider answers for.
	pub fn synthetic(path: impl Into<String>) -> Self {
		Self::new(path, SYNTHETIC_RESOURCE_TYPE)
	}

	/// Returns true if this resource was synthesized by the tree.
	pub fn is_synthetic(&self) -> bool {
		self.resource_type == SYNTHETIC_RESOURCE_TYPE
	}

	/// Returns the last segment of the resource path.
	pub fn name(&self) -> &str {
		self.path.rsplit('/').next().unwrap_or("")
	}
}
