use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A strongly-typed attribute or property value.
///
/// Providers report attributes and resource properties through this enum
/// instead of an untyped object map, so callers never downcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Bool(bool),
	Long(i64),
	Double(f64),
	String(String),
}

impl Value {
	/// Returns the contained boolean, if this is a `Bool`.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Returns the contained integer, if this is a `Long`.
	pub fn as_long(&self) -> Option<i64> {
		match self {
			Self::Long(n) => Some(*n),
			_ => None,
		}
	}

	/// Returns the contained string, if this is a `String`.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Self::Long(n)
	}
}

impl From<f64> for Value {
	fn from(n: f64) -> Self {
		Self::Double(n)
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Self::String(s)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Self::String(s.to_owned())
	}
}

/// Property and attribute container keyed by name.
pub type AttributeMap = FxHashMap<String, Value>;
