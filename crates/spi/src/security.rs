use crate::resource::Resource;

/// Attribute name never reported or served by attribute aggregation,
/// regardless of what any provider claims to expose.
pub const FORBIDDEN_ATTRIBUTE: &str = "user.password";

/// Read/write gate consulted around provider calls.
///
/// A filter can veto an operation outright or rewrite a found resource
/// before it is handed to the caller. A veto is indistinguishable from
/// absence to the caller so existence information does not leak.
pub trait SecurityFilter: Send + Sync {
	/// Returns true if a resource may be created at the given path.
	fn can_create(&self, path: &str) -> bool;

	/// Returns true if the given resource may be deleted.
	fn can_delete(&self, resource: &Resource) -> bool;

	/// Passes, rewrites, or vetoes a resource found by a provider.
	///
	/// Returning `None` hides the resource.
	fn filter_readable(&self, resource: Resource) -> Option<Resource>;
}
