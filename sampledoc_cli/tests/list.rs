mod common;

use predicates::prelude::PredicateBooleanExt;
use sampledoc_core::AnyEmptyResult;

#[test]
fn list_prints_every_sample_reference() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), &[common::GREET, "missing.Thing.run"])?;

	let mut cmd = common::sampledoc_cmd();
	let _ = cmd
		.arg("list")
		.arg("--input")
		.arg(tmp.path().join("pages.json"))
		.assert()
		.success()
		.stdout(predicates::str::contains("page0"))
		.stdout(predicates::str::contains(format!("  jvm          {}", common::GREET)))
		.stdout(predicates::str::contains("missing.Thing.run"))
		.stdout(predicates::str::contains(
			"2 sample reference(s) across 2 page(s)",
		));

	Ok(())
}

#[test]
fn list_without_samples() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), &[])?;

	let mut cmd = common::sampledoc_cmd();
	let _ = cmd
		.arg("list")
		.arg("--input")
		.arg(tmp.path().join("pages.json"))
		.assert()
		.success()
		.stdout(predicates::str::contains("No sample references found."))
		.stdout(predicates::str::contains("page0").not());

	Ok(())
}

#[test]
fn missing_subcommand_exits_with_usage_hint() {
	let mut cmd = common::sampledoc_cmd();
	let _ = cmd
		.assert()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));
}
