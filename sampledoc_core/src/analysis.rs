use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;

use tracing::debug;

use crate::SampleDocResult;
use crate::SourceSetId;

/// Package scope returned by [`ResolutionFacade::resolve_package`]. Link
/// targets are resolved relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageContext {
	pub name: String,
}

/// A resolved symbol. The `index` is private to the facade that produced it
/// and is only meaningful when handed back to the same facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
	pub fq_name: String,
	pub index: usize,
}

/// Body of a function declaration as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationBody {
	/// `{ ... }` including the braces.
	Block(String),
	/// The expression after `=`.
	Expression(String),
}

/// Source text of a resolved declaration, the "declaration handle" the
/// snippet extraction works on. Handles are transient: they live for one
/// sample and are never stored in the page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
	pub fq_name: String,
	pub file: PathBuf,
	/// 1-indexed line of the declaration.
	pub line: usize,
	/// Full import list of the containing file, verbatim.
	pub import_list: Option<String>,
	pub body: Option<DeclarationBody>,
	/// The complete declaration text.
	pub text: String,
}

/// Symbol resolution for a single source set.
///
/// Implementations own whatever analysis state they need; it is released
/// through [`ResolutionFacade::dispose`] when the owning [`AnalysisSession`]
/// is dropped.
pub trait ResolutionFacade: Send + Sync {
	fn resolve_package(&self, package: &str) -> Option<PackageContext>;

	/// Resolve a dotted path the way a documentation link is resolved. All
	/// candidates are returned in declaration order.
	fn resolve_link_target(&self, package: &PackageContext, path: &[&str]) -> Vec<Symbol>;

	fn declaration_of(&self, symbol: &Symbol) -> Option<SourceNode>;

	fn dispose(&self) {}
}

/// Produces the analysis session for one run of the samples phase.
pub trait AnalysisProvider: Send + Sync {
	fn open(&self) -> impl Future<Output = SampleDocResult<AnalysisSession>> + Send;
}

/// The analysis state of one samples phase: one facade per source set.
///
/// Dropping the session disposes every facade exactly once, whichever way the
/// phase ends.
#[derive(Default)]
pub struct AnalysisSession {
	facades: BTreeMap<SourceSetId, Box<dyn ResolutionFacade>>,
}

impl AnalysisSession {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, source_set: SourceSetId, facade: Box<dyn ResolutionFacade>) {
		if let Some(previous) = self.facades.insert(source_set, facade) {
			previous.dispose();
		}
	}

	#[must_use]
	pub fn with_facade(mut self, source_set: SourceSetId, facade: impl ResolutionFacade + 'static) -> Self {
		self.insert(source_set, Box::new(facade));
		self
	}

	pub fn facade(&self, source_set: &SourceSetId) -> Option<&dyn ResolutionFacade> {
		self.facades.get(source_set).map(|facade| facade.as_ref())
	}

	pub fn source_sets(&self) -> impl Iterator<Item = &SourceSetId> {
		self.facades.keys()
	}

	pub fn len(&self) -> usize {
		self.facades.len()
	}

	pub fn is_empty(&self) -> bool {
		self.facades.is_empty()
	}
}

impl std::fmt::Debug for AnalysisSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AnalysisSession")
			.field("source_sets", &self.facades.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl Drop for AnalysisSession {
	fn drop(&mut self) {
		for (source_set, facade) in std::mem::take(&mut self.facades) {
			debug!(source_set = %source_set, "disposing analysis");
			facade.dispose();
		}
	}
}
