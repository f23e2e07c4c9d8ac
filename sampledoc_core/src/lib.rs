//! `sampledoc_core` embeds runnable code samples into generated API
//! documentation. A documented symbol can reference a sample function with
//! `@sample com.example.samples.greeting`; the samples phase finds that
//! function in the project sources and swaps the reference on the page for a
//! runnable snippet built from the function's body and its file's imports.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Page tree (JSON)
//!   → Analysis session (one resolution facade per source set, opened once)
//!   → Samples transformer (folds over every content page)
//!       → Source locator (sample name → declaration)
//!       → Snippet builder (imports + main wrapper + sample body)
//!       → Content rewriter (marker text → runnable code block)
//!   → Page tree with samples embedded, plus a transform report
//! ```
//!
//! ## Modules
//!
//! - [`content`] - The immutable content tree shown on a page. Children are shared through `Arc` so rewrites only rebuild the path to a change.
//! - [`page`] - Pages, documentables and their `@sample` tags.
//! - [`analysis`] - The resolution facade contract and the session that owns one facade per source set.
//! - [`source_index`] - A resolution facade backed by an index of Kotlin sources on disk.
//! - [`config`] - Configuration loading from `sampledoc.toml`.
//!
//! ## Key Types
//!
//! - [`SamplesTransformer`] - Rewrites the content pages that reference samples.
//! - [`SourceLocator`] - Resolves a fully qualified sample name to its source.
//! - [`ContentRewriter`] - Replaces marker text leaves with a code block.
//! - [`TransformReport`] - What was resolved, skipped and passed through.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use sampledoc_core::IndexedAnalysis;
//! use sampledoc_core::PageNode;
//! use sampledoc_core::SampleDocConfig;
//! use sampledoc_core::SampleOptions;
//! use sampledoc_core::SamplesTransformer;
//! use sampledoc_core::run_samples_phase;
//!
//! # async fn run(root: Arc<PageNode>) -> sampledoc_core::SampleDocResult<()> {
//! let config = SampleDocConfig::load(Path::new("."))?.unwrap_or_default();
//! let provider = IndexedAnalysis::from_config(Path::new("."), &config)?;
//! let transformer = Arc::new(SamplesTransformer::new(SampleOptions::from_config(Some(&config))));
//!
//! let outcome = run_samples_phase(&provider, transformer, root).await?;
//! for unresolved in &outcome.report.unresolved {
//!     eprintln!("{}: {}", unresolved.sample, unresolved.reason);
//! }
//! # Ok(())
//! # }
//! ```

pub use analysis::*;
pub use config::*;
pub use content::*;
pub use documentable::*;
pub use error::*;
pub use identifiers::*;
pub use locator::*;
pub use page::*;
pub use phase::*;
pub use rewriter::*;
pub use snippet::*;
pub use source_index::*;
pub use transformer::*;

pub mod analysis;
pub mod config;
pub mod content;
mod documentable;
#[allow(unused_assignments)]
mod error;
mod identifiers;
mod locator;
pub mod page;
mod phase;
mod rewriter;
mod snippet;
pub mod source_index;
mod transformer;

#[cfg(test)]
mod __fixtures;
