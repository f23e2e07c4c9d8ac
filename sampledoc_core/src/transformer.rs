use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::LocateError;
use crate::SourceSetId;
use crate::analysis::AnalysisSession;
use crate::config::KOTLIN_PLAYGROUND_SCRIPT;
use crate::config::SampleDocConfig;
use crate::content::ContentCodeBlock;
use crate::content::ContentKind;
use crate::content::ContentNode;
use crate::content::ContentText;
use crate::content::Dci;
use crate::content::NodeMeta;
use crate::content::Style;
use crate::locator::SourceLocator;
use crate::page::ContentPage;
use crate::page::PageNode;
use crate::page::transform_content_pages;
use crate::rewriter::ContentRewriter;
use crate::snippet::PlaygroundTemplate;
use crate::snippet::SampleTemplate;
use crate::snippet::sample_body;
use crate::snippet::sample_imports;

/// How embedded samples are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOptions {
	/// Language tag of the generated code blocks.
	pub language: String,
	/// Resource appended to a page for every sample embedded into it.
	pub runner_script: String,
}

impl Default for SampleOptions {
	fn default() -> Self {
		Self {
			language: "kotlin".to_string(),
			runner_script: KOTLIN_PLAYGROUND_SCRIPT.to_string(),
		}
	}
}

impl SampleOptions {
	pub fn from_config(config: Option<&SampleDocConfig>) -> Self {
		config.map_or_else(Self::default, |config| {
			Self {
				language: config.samples.language.clone(),
				runner_script: config.samples.runner_script.clone(),
			}
		})
	}
}

/// A sample that could not be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedSample {
	/// Name of the page documenting the sample.
	pub page: String,
	pub source_set: SourceSetId,
	pub sample: String,
	pub reason: LocateError,
}

/// What happened during one run of the samples phase. Failures are collected
/// instead of aborting so that a single run reports every problem.
#[derive(Debug, Default)]
pub struct TransformReport {
	/// Samples that were located and spliced into their page.
	pub resolved: usize,
	pub unresolved: Vec<UnresolvedSample>,
	/// Marker text nodes replaced by code blocks.
	pub replaced_nodes: usize,
	/// Distinct content nodes of unknown type that were passed through, on
	/// pages that embed samples.
	pub unrecognized_nodes: usize,
	/// Pages that received at least one sample.
	pub pages_rewritten: usize,
}

impl TransformReport {
	/// Returns true if every referenced sample was resolved.
	pub fn is_ok(&self) -> bool {
		self.unresolved.is_empty()
	}
}

/// The rewritten page tree together with its report.
#[derive(Debug)]
pub struct TransformOutcome {
	pub root: Arc<PageNode>,
	pub report: TransformReport,
}

/// Embeds `@sample` functions into the pages that reference them.
#[derive(Debug, Clone)]
pub struct SamplesTransformer<T = PlaygroundTemplate> {
	template: T,
	options: SampleOptions,
}

impl SamplesTransformer<PlaygroundTemplate> {
	pub fn new(options: SampleOptions) -> Self {
		Self::with_template(PlaygroundTemplate, options)
	}
}

impl Default for SamplesTransformer<PlaygroundTemplate> {
	fn default() -> Self {
		Self::new(SampleOptions::default())
	}
}

impl<T: SampleTemplate> SamplesTransformer<T> {
	pub fn with_template(template: T, options: SampleOptions) -> Self {
		Self { template, options }
	}

	pub fn options(&self) -> &SampleOptions {
		&self.options
	}

	/// Rewrite every content page of `root` that references samples.
	///
	/// Pages without samples, and pages whose samples all fail to resolve,
	/// are returned as the same allocation.
	pub fn transform(&self, root: &Arc<PageNode>, session: &AnalysisSession) -> TransformOutcome {
		let locator = SourceLocator::new(session);
		let mut report = TransformReport::default();
		let root = transform_content_pages(root, &mut |node, page| {
			self.transform_page(node, page, &locator, &mut report)
		});

		debug!(
			resolved = report.resolved,
			unresolved = report.unresolved.len(),
			pages = report.pages_rewritten,
			"samples phase finished"
		);
		TransformOutcome { root, report }
	}

	fn transform_page(
		&self,
		node: &Arc<PageNode>,
		page: &ContentPage,
		locator: &SourceLocator<'_>,
		report: &mut TransformReport,
	) -> Arc<PageNode> {
		let samples: Vec<(&SourceSetId, &str)> = page
			.documentables
			.iter()
			.flat_map(|documentable| documentable.sample_references())
			.collect();
		if samples.is_empty() {
			return Arc::clone(node);
		}

		let mut content = Arc::clone(&page.content);
		let mut embedded_resources = page.embedded_resources.clone();
		let mut changed = false;
		// Every rewrite walks the whole content, so each one sees the same
		// unrecognized nodes.
		let mut unrecognized = 0;

		for (source_set, sample) in samples {
			let declaration = match locator.locate(source_set, sample) {
				Ok(declaration) => declaration,
				Err(reason) => {
					warn!(
						page = %page.name,
						source_set = %source_set,
						sample,
						"{reason}"
					);
					report.unresolved.push(UnresolvedSample {
						page: page.name.clone(),
						source_set: source_set.clone(),
						sample: sample.to_string(),
						reason,
					});
					continue;
				}
			};

			let snippet = self
				.template
				.build(&sample_imports(&declaration), &sample_body(&declaration));
			let code = self.sample_code_block(page, snippet);

			let mut rewriter = ContentRewriter::new(sample, code).log_unrecognized(!changed);
			content = rewriter.rewrite(&content);
			embedded_resources.push(self.options.runner_script.clone());
			changed = true;

			report.resolved += 1;
			report.replaced_nodes += rewriter.replaced();
			unrecognized = unrecognized.max(rewriter.unrecognized());
			debug!(
				page = %page.name,
				sample,
				file = %declaration.file.display(),
				line = declaration.line,
				replaced = rewriter.replaced(),
				"embedded sample"
			);
		}

		report.unrecognized_nodes += unrecognized;
		if !changed {
			return Arc::clone(node);
		}

		report.pages_rewritten += 1;
		Arc::new(PageNode::Content(ContentPage {
			content,
			embedded_resources,
			..page.clone()
		}))
	}

	/// The runnable code block for one sample, attributed to the page's
	/// symbols and shown on every source set the page content covers.
	fn sample_code_block(&self, page: &ContentPage, snippet: String) -> ContentCodeBlock {
		let dci = Dci::new(page.dri.iter().cloned(), ContentKind::Sample);
		let source_sets = page.content.source_sets();
		let text = ContentText::new(
			snippet,
			NodeMeta {
				dci: dci.clone(),
				source_sets: source_sets.clone(),
				..NodeMeta::default()
			},
		);

		ContentCodeBlock {
			children: vec![Arc::new(ContentNode::Text(text))],
			language: self.options.language.clone(),
			meta: NodeMeta {
				dci,
				source_sets,
				..NodeMeta::default()
			}
			.with_style([Style::RunnableSample, Style::Monospace]),
		}
	}
}
