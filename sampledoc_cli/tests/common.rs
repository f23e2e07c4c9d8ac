#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;
use sampledoc_core::AnyEmptyResult;

pub const GREET: &str = "samples.GreeterSamples.greet";

pub const GREETING_SOURCE: &str = r#"package samples

import com.example.Greeter

class GreeterSamples {
    fun greet() {
        println(Greeter("World").greet())
    }
}
"#;

pub const CONFIG: &str = r#"[[source_sets]]
id = "jvm"
roots = ["samples"]
"#;

pub fn sampledoc_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("sampledoc"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("SAMPLEDOC_LOG");
	cmd
}

/// A page tree with one page per sample name, each page documenting its
/// sample for the `jvm` source set and holding the reference text in its
/// content.
pub fn page_tree(samples: &[&str]) -> serde_json::Value {
	let pages: Vec<serde_json::Value> = samples
		.iter()
		.enumerate()
		.map(|(index, sample)| {
			serde_json::json!({
				"type": "content",
				"name": format!("page{index}"),
				"dri": [format!("com.example/Greeter/page{index}/")],
				"content": {
					"type": "group",
					"sourceSets": ["jvm"],
					"children": [
						{ "type": "text", "text": "Says hello.", "sourceSets": ["jvm"] },
						{ "type": "text", "text": sample, "sourceSets": ["jvm"] }
					]
				},
				"documentables": [{
					"dri": format!("com.example/Greeter/page{index}/"),
					"name": format!("page{index}"),
					"documentation": {
						"jvm": { "children": [{ "tag": "sample", "name": sample }] }
					}
				}]
			})
		})
		.collect();

	serde_json::json!({
		"type": "rendererSpecific",
		"name": "root",
		"children": pages,
	})
}

/// Lay out a project with the greeting sample sources, its config and a page
/// tree referencing `samples`.
pub fn write_project(root: &Path, samples: &[&str]) -> AnyEmptyResult {
	std::fs::create_dir_all(root.join("samples"))?;
	std::fs::write(root.join("samples/GreeterSamples.kt"), GREETING_SOURCE)?;
	std::fs::write(root.join("sampledoc.toml"), CONFIG)?;
	std::fs::write(
		root.join("pages.json"),
		serde_json::to_string_pretty(&page_tree(samples))?,
	)?;
	Ok(())
}
