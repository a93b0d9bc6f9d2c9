//! Shared test doubles for tree-level tests.

use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use canopy_spi::{
	AttributeMap, AttributeMapIter, ModifyingProvider, ProviderError, ProviderFactory,
	QueryProvider, Resource, ResourceIter, ResourceProvider, SecurityFilter, Value,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::handle::{ProviderHandle, ProviderKind};
use crate::priority::Priority;

/// Shared record of which providers were consulted, in order.
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn call_log() -> CallLog {
	Arc::new(Mutex::new(Vec::new()))
}

/// Scriptable provider. Serves `Resource`s whose type equals the provider
/// label, so tests can tell which provider answered.
#[derive(Default)]
pub(crate) struct MockProvider {
	label: String,
	paths: Vec<String>,
	children: FxHashMap<String, Vec<Resource>>,
	attributes: Vec<(String, Value)>,
	languages: Vec<String>,
	query_results: Vec<Resource>,
	query_rows: Vec<AttributeMap>,
	adaptation: Option<String>,
	writable: bool,
	fail_reads: bool,
	fail_queries: bool,
	log: Option<CallLog>,
}

impl MockProvider {
	pub(crate) fn new(label: &str) -> Self {
		Self {
			label: label.to_owned(),
			..Self::default()
		}
	}

	/// Answers `get_resource` for this exact path.
	pub(crate) fn serving(mut self, path: &str) -> Self {
		self.paths.push(path.to_owned());
		self
	}

	pub(crate) fn with_children(mut self, parent: &str, names: &[&str]) -> Self {
		let children = names
			.iter()
			.map(|n| Resource::new(format!("{parent}/{n}"), self.label.clone()))
			.collect();
		self.children.insert(parent.to_owned(), children);
		self
	}

	pub(crate) fn with_attribute(mut self, name: &str, value: Value) -> Self {
		self.attributes.push((name.to_owned(), value));
		self
	}

	pub(crate) fn with_language(mut self, language: &str) -> Self {
		self.languages.push(language.to_owned());
		self
	}

	pub(crate) fn with_query_result(mut self, path: &str) -> Self {
		self.query_results
			.push(Resource::new(path, self.label.clone()));
		self
	}

	pub(crate) fn with_query_row(mut self, key: &str, value: Value) -> Self {
		let mut row = AttributeMap::default();
		row.insert(key.to_owned(), value);
		self.query_rows.push(row);
		self
	}

	pub(crate) fn adapting_to(mut self, value: &str) -> Self {
		self.adaptation = Some(value.to_owned());
		self
	}

	pub(crate) fn writable(mut self) -> Self {
		self.writable = true;
		self
	}

	pub(crate) fn failing(mut self) -> Self {
		self.fail_reads = true;
		self
	}

	pub(crate) fn failing_queries(mut self) -> Self {
		self.fail_queries = true;
		self
	}

	pub(crate) fn logged(mut self, log: &CallLog) -> Self {
		self.log = Some(log.clone());
		self
	}

	fn record(&self, call: &str) {
		if let Some(log) = &self.log {
			log.lock().push(format!("{}:{call}", self.label));
		}
	}
}

impl ResourceProvider for MockProvider {
	fn get_resource(&self, path: &str) -> Result<Option<Resource>, ProviderError> {
		self.record(path);
		if self.fail_reads {
			return Err(ProviderError::backend("scripted failure"));
		}
		if self.paths.iter().any(|p| p == path) {
			Ok(Some(Resource::new(path, self.label.clone())))
		} else {
			Ok(None)
		}
	}

	fn list_children(&self, parent: &Resource) -> Result<Option<ResourceIter>, ProviderError> {
		if self.fail_reads {
			return Err(ProviderError::backend("scripted failure"));
		}
		match self.children.get(&parent.path) {
			Some(children) => Ok(Some(Box::new(children.clone().into_iter()))),
			None => Ok(None),
		}
	}

	fn query_provider(&self) -> Option<&dyn QueryProvider> {
		if self.languages.is_empty() {
			None
		} else {
			Some(self)
		}
	}

	fn modifying(&self) -> Option<&dyn ModifyingProvider> {
		if self.writable { Some(self) } else { None }
	}

	fn attribute_names(&self) -> Vec<String> {
		self.attributes.iter().map(|(n, _)| n.clone()).collect()
	}

	fn attribute(&self, name: &str) -> Option<Value> {
		self.attributes
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.clone())
	}

	fn adapt(&self, target: TypeId) -> Option<Box<dyn Any>> {
		if target == TypeId::of::<String>() {
			self.adaptation
				.as_ref()
				.map(|s| Box::new(s.clone()) as Box<dyn Any>)
		} else {
			None
		}
	}
}

impl QueryProvider for MockProvider {
	fn supports_language(&self, language: &str) -> bool {
		self.languages.iter().any(|l| l == language)
	}

	fn find_resources(&self, query: &str, _language: &str) -> Result<ResourceIter, ProviderError> {
		self.record(&format!("find:{query}"));
		if self.fail_queries {
			return Err(ProviderError::backend("scripted query failure"));
		}
		Ok(Box::new(self.query_results.clone().into_iter()))
	}

	fn query_resources(
		&self,
		query: &str,
		_language: &str,
	) -> Result<AttributeMapIter, ProviderError> {
		self.record(&format!("query:{query}"));
		if self.fail_queries {
			return Err(ProviderError::backend("scripted query failure"));
		}
		Ok(Box::new(self.query_rows.clone().into_iter()))
	}
}

impl ModifyingProvider for MockProvider {
	fn create(&self, path: &str, _properties: AttributeMap) -> Result<Resource, ProviderError> {
		self.record(&format!("create:{path}"));
		Ok(Resource::new(path, self.label.clone()))
	}

	fn delete(&self, path: &str) -> Result<(), ProviderError> {
		self.record(&format!("delete:{path}"));
		Ok(())
	}

	fn copy(&self, _src: &str, _dst: &str) -> Result<(), ProviderError> {
		Ok(())
	}

	fn rename(&self, _src: &str, _dst: &str) -> Result<(), ProviderError> {
		Ok(())
	}

	fn commit(&self) -> Result<(), ProviderError> {
		Ok(())
	}

	fn revert(&self) {}

	fn has_changes(&self) -> bool {
		false
	}
}

/// Factory that counts logins and can be scripted to fail them.
pub(crate) struct MockFactory {
	provider: Arc<MockProvider>,
	fail_login: bool,
	logins: AtomicUsize,
}

impl MockFactory {
	pub(crate) fn new(provider: MockProvider) -> Self {
		Self {
			provider: Arc::new(provider),
			fail_login: false,
			logins: AtomicUsize::new(0),
		}
	}

	pub(crate) fn failing_login(mut self) -> Self {
		self.fail_login = true;
		self
	}

	pub(crate) fn login_count(&self) -> usize {
		self.logins.load(Ordering::Relaxed)
	}
}

impl ProviderFactory for MockFactory {
	fn provider(&self) -> Result<Arc<dyn ResourceProvider>, ProviderError> {
		if self.fail_login {
			return Err(ProviderError::login("scripted login failure"));
		}
		self.logins.fetch_add(1, Ordering::Relaxed);
		Ok(self.provider.clone())
	}
}

/// Security filter vetoing an explicit set of paths.
#[derive(Default)]
pub(crate) struct PathVeto {
	denied: Vec<String>,
}

impl PathVeto {
	pub(crate) fn denying(paths: &[&str]) -> Self {
		Self {
			denied: paths.iter().map(|p| (*p).to_owned()).collect(),
		}
	}

	fn allows(&self, path: &str) -> bool {
		!self.denied.iter().any(|d| d == path)
	}
}

impl SecurityFilter for PathVeto {
	fn can_create(&self, path: &str) -> bool {
		self.allows(path)
	}

	fn can_delete(&self, resource: &Resource) -> bool {
		self.allows(&resource.path)
	}

	fn filter_readable(&self, resource: Resource) -> Option<Resource> {
		self.allows(&resource.path).then_some(resource)
	}
}

/// Handle over an inert provider, for node-level tests.
pub(crate) fn direct_handle(rank: i32, id: u64) -> Arc<ProviderHandle> {
	Arc::new(ProviderHandle::new(
		Priority::new(rank, id),
		false,
		"/".to_owned(),
		ProviderKind::Direct(Arc::new(MockProvider::new("inert"))),
	))
}
