mod common;

use clap::Parser;
use sampledoc_cli::Commands;
use sampledoc_cli::OutputFormat;
use sampledoc_cli::SampleDocCli;
use sampledoc_core::AnyEmptyResult;
use serde_json::Value;

#[test]
fn check_passes_when_every_sample_resolves() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), &[common::GREET])?;

	let mut cmd = common::sampledoc_cmd();
	let _ = cmd
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.arg("--input")
		.arg(tmp.path().join("pages.json"))
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Check passed: all 1 sample(s) resolved.",
		));

	Ok(())
}

#[test]
fn check_fails_when_a_sample_is_unresolved() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), &[common::GREET, "samples.GreeterSamples.wave"])?;

	let mut cmd = common::sampledoc_cmd();
	let _ = cmd
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.arg("--input")
		.arg(tmp.path().join("pages.json"))
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Check failed: 1 of 2 sample(s)"))
		.stdout(predicates::str::contains("samples.GreeterSamples.wave (jvm) on page page1"))
		.stdout(predicates::str::contains(
			"cannot find a declaration corresponding to `samples.GreeterSamples.wave`",
		));

	Ok(())
}

#[test]
fn check_json_output_lists_unresolved_samples() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), &["missing.Thing.run"])?;

	let mut cmd = common::sampledoc_cmd();
	let assert = cmd
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.arg("--input")
		.arg(tmp.path().join("pages.json"))
		.arg("--format")
		.arg("json")
		.assert()
		.code(1);

	let output: Value = serde_json::from_slice(&assert.get_output().stdout)?;
	assert_eq!(output["ok"], false);
	assert_eq!(output["resolved"], 0);
	assert_eq!(
		output["unresolved"],
		serde_json::json!([{
			"page": "page0",
			"sourceSet": "jvm",
			"sample": "missing.Thing.run",
			"reason": "cannot resolve package `missing` for sample `missing.Thing.run`",
		}])
	);

	Ok(())
}

#[test]
fn check_without_config_reports_unanalyzed_source_sets() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), &[common::GREET])?;
	std::fs::remove_file(tmp.path().join("sampledoc.toml"))?;

	let mut cmd = common::sampledoc_cmd();
	let _ = cmd
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.arg("--input")
		.arg(tmp.path().join("pages.json"))
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"no analysis available for source set `jvm`",
		));

	Ok(())
}

#[test]
fn check_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), &[common::GREET])?;
	std::fs::write(
		tmp.path().join("sampledoc.toml"),
		"[[source_sets]]\nid = \"jvm\"\n\n[[source_sets]]\nid = \"jvm\"\n",
	)?;

	let mut cmd = common::sampledoc_cmd();
	let _ = cmd
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.arg("--input")
		.arg(tmp.path().join("pages.json"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("sampledoc::config_parse"));

	Ok(())
}

#[test]
fn check_format_defaults_to_text() {
	let cli = SampleDocCli::parse_from(["sampledoc", "check", "--input", "pages.json"]);
	match cli.command {
		Some(Commands::Check { format, input }) => {
			assert!(matches!(format, OutputFormat::Text));
			assert_eq!(input, std::path::PathBuf::from("pages.json"));
		}
		_ => panic!("expected Check command"),
	}

	let cli = SampleDocCli::parse_from([
		"sampledoc",
		"check",
		"-i",
		"pages.json",
		"--format",
		"json",
	]);
	assert!(matches!(
		cli.command,
		Some(Commands::Check {
			format: OutputFormat::Json,
			..
		})
	));
}
