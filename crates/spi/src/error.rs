/// Failure raised by a backend provider call.
///
/// The tree treats these as opaque: a failing provider is logged and the
/// resolution attempt reports absence rather than propagating the cause.
/// Write operations surface the error to the caller instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
	/// The provider's backend could not be reached or answered abnormally.
	#[error("backend failure: {reason}")]
	Backend { reason: String },

	/// A factory-style provider failed to authenticate.
	#[error("login failed: {reason}")]
	Login { reason: String },

	/// The operation is not supported by this provider.
	#[error("unsupported provider operation: {operation}")]
	Unsupported { operation: &'static str },
}

impl ProviderError {
	/// Shorthand for a backend failure with the given reason.
	pub fn backend(reason: impl Into<String>) -> Self {
		Self::Backend {
			reason: reason.into(),
		}
	}

	/// Shorthand for a login failure with the given reason.
	pub fn login(reason: impl Into<String>) -> Self {
		Self::Login {
			reason: reason.into(),
		}
	}
}
