use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use owo_colors::OwoColorize;
use sampledoc_cli::Commands;
use sampledoc_cli::OutputFormat;
use sampledoc_cli::SampleDocCli;
use sampledoc_core::IndexedAnalysis;
use sampledoc_core::PageNode;
use sampledoc_core::SampleDocConfig;
use sampledoc_core::SampleDocError;
use sampledoc_core::SampleDocResult;
use sampledoc_core::SampleOptions;
use sampledoc_core::SamplesTransformer;
use sampledoc_core::TransformOutcome;
use sampledoc_core::run_samples_phase;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SampleDocCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Transform { input, output }) => run_transform(&args, input, output.as_deref()),
		Some(Commands::Check { input, format }) => run_check(&args, input, *format),
		Some(Commands::List { input }) => run_list(input),
		None => {
			eprintln!("No subcommand specified. Run `sampledoc --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<SampleDocError>() {
			Ok(sampledoc_err) => {
				let report: miette::Report = (*sampledoc_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `SAMPLEDOC_LOG` takes an `EnvFilter` directive and wins over
/// `--verbose`.
fn init_logging(verbose: bool, use_color: bool) {
	let default_level = if verbose { "info" } else { "warn" };
	let filter = EnvFilter::try_from_env("SAMPLEDOC_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &SampleDocCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn read_page_tree(input: &Path) -> SampleDocResult<PageNode> {
	let content = std::fs::read_to_string(input)?;
	Ok(serde_json::from_str(&content)?)
}

/// Build a runtime bounded by the `[runtime]` config section and run the
/// samples phase on it.
fn run_phase(args: &SampleDocCli, input: &Path) -> SampleDocResult<TransformOutcome> {
	let root = resolve_root(args);
	let config = SampleDocConfig::load(&root)?.unwrap_or_default();
	debug!(
		root = %root.display(),
		source_sets = config.source_sets.len(),
		"loaded configuration"
	);

	let tree = Arc::new(read_page_tree(input)?);
	let provider = IndexedAnalysis::from_config(&root, &config)?;
	let transformer = Arc::new(SamplesTransformer::new(SampleOptions::from_config(Some(
		&config,
	))));

	let mut builder = tokio::runtime::Builder::new_multi_thread();
	builder
		.thread_name("sampledoc-worker")
		.max_blocking_threads(config.runtime.max_blocking_threads.max(1));
	if let Some(worker_threads) = config.runtime.worker_threads {
		builder.worker_threads(worker_threads.max(1));
	}
	let runtime = builder.build()?;

	runtime.block_on(run_samples_phase(&provider, transformer, tree))
}

fn run_transform(
	args: &SampleDocCli,
	input: &Path,
	output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
	let outcome = run_phase(args, input)?;
	let json = serde_json::to_string_pretty(outcome.root.as_ref()).map_err(SampleDocError::PageTree)?;

	match output {
		Some(path) => {
			std::fs::write(path, format!("{json}\n")).map_err(SampleDocError::Io)?;
			println!(
				"{} {} sample(s) into {} page(s), wrote {}",
				colored!("Embedded", green),
				outcome.report.resolved,
				outcome.report.pages_rewritten,
				path.display()
			);
		}
		None => println!("{json}"),
	}

	if !outcome.report.is_ok() {
		eprintln!(
			"{} {} sample(s) could not be resolved",
			colored!("warning:", yellow),
			outcome.report.unresolved.len()
		);
	}

	Ok(())
}

fn run_check(
	args: &SampleDocCli,
	input: &Path,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let outcome = run_phase(args, input)?;
	let report = &outcome.report;

	match format {
		OutputFormat::Json => {
			let unresolved: Vec<serde_json::Value> = report
				.unresolved
				.iter()
				.map(|entry| {
					serde_json::json!({
						"page": entry.page,
						"sourceSet": entry.source_set,
						"sample": entry.sample,
						"reason": entry.reason.to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": report.is_ok(),
				"resolved": report.resolved,
				"unresolved": unresolved,
				"unrecognizedNodes": report.unrecognized_nodes,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if report.is_ok() {
				println!(
					"Check passed: all {} sample(s) resolved.",
					report.resolved
				);
			} else {
				println!(
					"{} {} of {} sample(s) could not be resolved:\n",
					colored!("Check failed:", red),
					report.unresolved.len(),
					report.resolved + report.unresolved.len()
				);
				for entry in &report.unresolved {
					println!(
						"  {} {} ({}) on page {}",
						colored!("✗", red),
						colored!(entry.sample, bold),
						entry.source_set,
						entry.page
					);
					println!("    {}", entry.reason);
				}
			}
			if report.unrecognized_nodes > 0 {
				println!(
					"{} {} unrecognized content node(s) were passed through unchanged",
					colored!("note:", yellow),
					report.unrecognized_nodes
				);
			}
		}
	}

	if !report.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn run_list(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let tree = read_page_tree(input)?;
	let mut references = 0;
	let mut pages = 0;

	for page in tree.content_pages() {
		let samples: Vec<_> = page
			.documentables
			.iter()
			.flat_map(|documentable| documentable.sample_references())
			.collect();
		if samples.is_empty() {
			continue;
		}

		pages += 1;
		println!("{}", colored!(page.name, bold));
		for (source_set, sample) in samples {
			references += 1;
			println!("  {:<12} {sample}", source_set.as_str());
		}
	}

	if references == 0 {
		println!("No sample references found.");
	} else {
		println!("\n{references} sample reference(s) across {pages} page(s)");
	}

	Ok(())
}
