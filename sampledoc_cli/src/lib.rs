use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Embed runnable code samples into generated documentation pages.",
	long_about = "sampledoc replaces `@sample` references in a documentation page tree with \
	              runnable code snippets built from the referenced sample functions.\n\nSample \
	              sources are configured per source set in `sampledoc.toml`.\n\nQuick \
	              start:\n  sampledoc list --input pages.json       Show every sample \
	              reference\n  sampledoc check --input pages.json      Verify every sample \
	              resolves\n  sampledoc transform --input pages.json  Write the tree with \
	              samples embedded"
)]
pub struct SampleDocCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Embed every referenced sample into the page tree.
	///
	/// Reads the page tree, resolves each `@sample` reference against the
	/// sample sources configured in `sampledoc.toml` and writes the rewritten
	/// tree as JSON. Samples that cannot be resolved are reported as warnings
	/// and keep their reference text.
	Transform {
		/// Page tree to read, as JSON.
		#[arg(long, short)]
		input: PathBuf,

		/// File to write the rewritten page tree to. Defaults to stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Check that every sample reference resolves.
	///
	/// Runs the samples phase without writing anything. Exits with a non-zero
	/// status code if any sample could not be resolved, which makes it
	/// suitable for CI pipelines.
	Check {
		/// Page tree to read, as JSON.
		#[arg(long, short)]
		input: PathBuf,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List every sample reference in the page tree.
	List {
		/// Page tree to read, as JSON.
		#[arg(long, short)]
		input: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each unresolved entry
	/// includes the page, source set, sample name and reason.
	Json,
}
