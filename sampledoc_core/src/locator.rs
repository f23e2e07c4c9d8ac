use crate::LocateError;
use crate::SourceSetId;
use crate::analysis::AnalysisSession;
use crate::analysis::SourceNode;

/// Finds the source declaration behind a `@sample` reference.
#[derive(Debug, Clone, Copy)]
pub struct SourceLocator<'a> {
	session: &'a AnalysisSession,
}

impl<'a> SourceLocator<'a> {
	pub fn new(session: &'a AnalysisSession) -> Self {
		Self { session }
	}

	/// Resolve `qualified_name` within `source_set`.
	///
	/// The first segment of the name selects the package scope, the whole
	/// dotted path is then resolved as a link from that scope and the first
	/// candidate wins.
	pub fn locate(
		&self,
		source_set: &SourceSetId,
		qualified_name: &str,
	) -> Result<SourceNode, LocateError> {
		let facade = self
			.session
			.facade(source_set)
			.ok_or_else(|| LocateError::SourceSetNotAnalyzed(source_set.clone()))?;

		let package_name = qualified_name.split('.').next().unwrap_or(qualified_name);
		let package = facade.resolve_package(package_name).ok_or_else(|| {
			LocateError::PackageNotFound {
				package: package_name.to_string(),
				sample: qualified_name.to_string(),
			}
		})?;

		let path: Vec<&str> = qualified_name.split('.').collect();
		let symbol = facade
			.resolve_link_target(&package, &path)
			.into_iter()
			.next()
			.ok_or_else(|| LocateError::SymbolNotFound(qualified_name.to_string()))?;

		facade
			.declaration_of(&symbol)
			.ok_or_else(|| LocateError::SourceUnavailable(symbol.fq_name))
	}
}
