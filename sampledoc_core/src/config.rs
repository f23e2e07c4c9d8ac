use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SampleDocError;
use crate::SampleDocResult;
use crate::SourceSetId;

/// Default maximum sample source file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"sampledoc.toml",
	".sampledoc.toml",
	".config/sampledoc.toml",
];

/// Glob patterns scanned for sample sources when a source set lists none.
pub const DEFAULT_INCLUDE_PATTERNS: [&str; 2] = ["**/*.kt", "**/*.kts"];

/// Script the interactive sample runner needs on every page that embeds a
/// sample.
pub const KOTLIN_PLAYGROUND_SCRIPT: &str =
	"https://unpkg.com/kotlin-playground@1/dist/playground.min.js";

/// Configuration loaded from a `sampledoc.toml` file.
///
/// ```toml
/// max_file_size = 10485760
///
/// [samples]
/// language = "kotlin"
/// runner_script = "https://unpkg.com/kotlin-playground@1/dist/playground.min.js"
///
/// [runtime]
/// worker_threads = 4
/// max_blocking_threads = 8
///
/// [[source_sets]]
/// id = "jvm"
/// roots = ["samples/jvm"]
/// include = ["**/*.kt"]
/// exclude = ["generated/"]
/// ```
#[derive(Debug, Deserialize)]
pub struct SampleDocConfig {
	/// How embedded samples are rendered.
	#[serde(default)]
	pub samples: SamplesConfig,
	/// Worker pool limits for the samples phase.
	#[serde(default)]
	pub runtime: RuntimeConfig,
	/// Where to find sample sources, per source set.
	#[serde(default)]
	pub source_sets: Vec<SourceSetConfig>,
	/// Maximum size in bytes of a sample source file. Larger files are an
	/// error.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
}

impl Default for SampleDocConfig {
	fn default() -> Self {
		Self {
			samples: SamplesConfig::default(),
			runtime: RuntimeConfig::default(),
			source_sets: Vec::new(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplesConfig {
	/// Language tag of the generated code blocks.
	#[serde(default = "default_language")]
	pub language: String,
	/// Resource appended to every page that received a sample.
	#[serde(default = "default_runner_script")]
	pub runner_script: String,
}

impl Default for SamplesConfig {
	fn default() -> Self {
		Self {
			language: default_language(),
			runner_script: default_runner_script(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
	/// Async worker threads. Defaults to the number of CPUs.
	#[serde(default)]
	pub worker_threads: Option<usize>,
	/// Upper bound on the blocking pool that indexes sources and runs the
	/// sample fold.
	#[serde(default = "default_max_blocking_threads")]
	pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			worker_threads: None,
			max_blocking_threads: default_max_blocking_threads(),
		}
	}
}

/// Sample sources of one source set.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSetConfig {
	pub id: SourceSetId,
	/// Files or directories holding sample sources, relative to the project
	/// root.
	#[serde(default)]
	pub roots: Vec<PathBuf>,
	/// Glob patterns (relative to each root) selecting files to index.
	/// Defaults to [`DEFAULT_INCLUDE_PATTERNS`].
	#[serde(default)]
	pub include: Vec<String>,
	/// Gitignore-style patterns for files and directories to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl SourceSetConfig {
	/// The include patterns in effect for this source set.
	pub fn include_patterns(&self) -> Vec<String> {
		if self.include.is_empty() {
			DEFAULT_INCLUDE_PATTERNS.iter().map(ToString::to_string).collect()
		} else {
			self.include.clone()
		}
	}
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

fn default_language() -> String {
	"kotlin".to_string()
}

fn default_runner_script() -> String {
	KOTLIN_PLAYGROUND_SCRIPT.to_string()
}

fn default_max_blocking_threads() -> usize {
	8
}

impl SampleDocConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> SampleDocResult<Option<SampleDocConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> SampleDocResult<SampleDocConfig> {
		let config: SampleDocConfig =
			toml::from_str(content).map_err(|e| SampleDocError::ConfigParse(e.to_string()))?;

		let mut seen = std::collections::HashSet::new();
		for source_set in &config.source_sets {
			if !seen.insert(&source_set.id) {
				return Err(SampleDocError::ConfigParse(format!(
					"source set `{}` is configured more than once",
					source_set.id
				)));
			}
		}

		Ok(config)
	}

	pub fn source_set(&self, id: &SourceSetId) -> Option<&SourceSetConfig> {
		self.source_sets.iter().find(|source_set| &source_set.id == id)
	}
}
