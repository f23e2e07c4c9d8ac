use miette::Diagnostic;
use thiserror::Error;

use crate::SourceSetId;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SampleDocError {
	#[error(transparent)]
	#[diagnostic(code(sampledoc::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(sampledoc::config_parse),
		help("check that sampledoc.toml is valid TOML with [samples], [runtime] and/or [[source_sets]] sections")
	)]
	ConfigParse(String),

	#[error("invalid pattern `{pattern}`: {reason}")]
	#[diagnostic(code(sampledoc::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("failed to read page tree: {0}")]
	#[diagnostic(
		code(sampledoc::page_tree),
		help("the page tree must be a JSON document whose root is a page node")
	)]
	PageTree(#[from] serde_json::Error),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(sampledoc::file_too_large),
		help("increase `max_file_size` in sampledoc.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("the samples phase did not complete: {0}")]
	#[diagnostic(code(sampledoc::phase_aborted))]
	PhaseAborted(String),
}

/// Why a single sample reference could not be turned into a source
/// declaration. None of these abort the phase: the sample is skipped and its
/// marker text stays in the page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LocateError {
	#[error("no analysis available for source set `{0}`")]
	SourceSetNotAnalyzed(SourceSetId),

	#[error("cannot resolve package `{package}` for sample `{sample}`")]
	PackageNotFound { package: String, sample: String },

	#[error("cannot find a declaration corresponding to `{0}`")]
	SymbolNotFound(String),

	#[error("declaration `{0}` has no accessible source")]
	SourceUnavailable(String),
}

pub type SampleDocResult<T> = Result<T, SampleDocError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
