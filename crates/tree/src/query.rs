//! Streaming merges across every query-capable provider.
//!
//! Both iterators here are single-pass and non-restartable: each eligible
//! handle's result stream is drained to exhaustion before the next handle
//! is even queried, so callers consuming partial results never pay for
//! later backends. A failing backend is logged and skipped; queries span
//! independent backends and one outage must not hide the others' results.

use std::sync::Arc;

use canopy_spi::{AttributeMap, AttributeMapIter, Resource};

use crate::handle::ProviderHandle;
use crate::security::{SecureChildren, SecurityContext};

/// Lazy merge of `find_resources` results across eligible handles.
pub struct FindResources {
	handles: std::vec::IntoIter<Arc<ProviderHandle>>,
	current: Option<SecureChildren>,
	security: SecurityContext,
	query: String,
	language: String,
}

impl FindResources {
	pub(crate) fn new(
		handles: Vec<Arc<ProviderHandle>>,
		security: SecurityContext,
		query: String,
		language: String,
	) -> Self {
		Self {
			handles: handles.into_iter(),
			current: None,
			security,
			query,
			language,
		}
	}
}

impl Iterator for FindResources {
	type Item = Resource;

	fn next(&mut self) -> Option<Resource> {
		loop {
			if let Some(current) = &mut self.current {
				if let Some(resource) = current.next() {
					return Some(resource);
				}
				self.current = None;
			}
			let handle = self.handles.next()?;
			match handle.find_resources(&self.security, &self.query, &self.language) {
				Ok(results) => self.current = Some(results),
				Err(err) => {
					tracing::warn!(
						"query against provider at {} failed, skipping: {err}",
						handle.mount_path()
					);
				}
			}
		}
	}
}

/// Lazy merge of raw `query_resources` rows across eligible handles.
pub struct QueryResources {
	handles: std::vec::IntoIter<Arc<ProviderHandle>>,
	current: Option<AttributeMapIter>,
	query: String,
	language: String,
}

impl QueryResources {
	pub(crate) fn new(handles: Vec<Arc<ProviderHandle>>, query: String, language: String) -> Self {
		Self {
			handles: handles.into_iter(),
			current: None,
			query,
			language,
		}
	}
}

impl Iterator for QueryResources {
	type Item = AttributeMap;

	fn next(&mut self) -> Option<AttributeMap> {
		loop {
			if let Some(current) = &mut self.current {
				if let Some(row) = current.next() {
					return Some(row);
				}
				self.current = None;
			}
			let handle = self.handles.next()?;
			let rows = handle
				.provider()
				.and_then(|provider| match provider.query_provider() {
					Some(query_provider) => {
						query_provider.query_resources(&self.query, &self.language)
					}
					None => Err(canopy_spi::ProviderError::Unsupported {
						operation: "query_resources",
					}),
				});
			match rows {
				Ok(rows) => self.current = Some(rows),
				Err(err) => {
					tracing::warn!(
						"query against provider at {} failed, skipping: {err}",
						handle.mount_path()
					);
				}
			}
		}
	}
}
