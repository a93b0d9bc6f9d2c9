use canopy_spi::ProviderError;

/// Errors surfaced by the write-path operations of the tree.
///
/// Read-path absence and security vetoes are not errors; they are `None`.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
	/// No mounted provider can perform the operation at this path, or a
	/// security layer refused it.
	#[error("unsupported: {operation} at '{path}'")]
	Unsupported {
		operation: &'static str,
		path: String,
	},

	/// The selected provider failed while performing the operation.
	#[error(transparent)]
	Provider(#[from] ProviderError),
}
