use std::sync::Arc;

use tracing::info;
use tracing::instrument;

use crate::SampleDocError;
use crate::SampleDocResult;
use crate::analysis::AnalysisProvider;
use crate::page::PageNode;
use crate::snippet::SampleTemplate;
use crate::transformer::SamplesTransformer;
use crate::transformer::TransformOutcome;

/// Run the samples phase for a whole documentation build.
///
/// The analysis session is opened first, then the sequential page fold runs
/// as a single task on the runtime's blocking pool and this future resolves
/// once it has finished. The session moves into that task and is dropped
/// there, so its facades are released whether the fold completes or panics.
#[instrument(skip_all)]
pub async fn run_samples_phase<P, T>(
	provider: &P,
	transformer: Arc<SamplesTransformer<T>>,
	root: Arc<PageNode>,
) -> SampleDocResult<TransformOutcome>
where
	P: AnalysisProvider,
	T: SampleTemplate + 'static,
{
	let session = provider.open().await?;
	info!(source_sets = session.len(), "analysis session opened");

	let outcome = tokio::task::spawn_blocking(move || {
		let outcome = transformer.transform(&root, &session);
		drop(session);
		outcome
	})
	.await
	.map_err(|e| SampleDocError::PhaseAborted(e.to_string()))?;

	info!(
		resolved = outcome.report.resolved,
		unresolved = outcome.report.unresolved.len(),
		"samples phase complete"
	);
	Ok(outcome)
}
