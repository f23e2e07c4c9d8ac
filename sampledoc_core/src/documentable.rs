use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::Dri;
use crate::SourceSetId;

/// A documented symbol together with its parsed doc comment for every source
/// set it is declared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Documentable {
	pub dri: Dri,
	pub name: String,
	#[serde(default)]
	pub documentation: BTreeMap<SourceSetId, DocumentationNode>,
}

impl Documentable {
	/// Every `(source set, sample name)` pair referenced by this symbol's
	/// documentation, in source set order and then tag order.
	pub fn sample_references(&self) -> impl Iterator<Item = (&SourceSetId, &str)> {
		self.documentation.iter().flat_map(|(source_set, doc)| {
			doc.samples().map(move |name| (source_set, name))
		})
	}
}

/// The tags of one doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationNode {
	#[serde(default)]
	pub children: Vec<TagWrapper>,
}

impl DocumentationNode {
	pub fn new(children: impl IntoIterator<Item = TagWrapper>) -> Self {
		Self {
			children: children.into_iter().collect(),
		}
	}

	/// Names referenced by `@sample` tags, in document order.
	pub fn samples(&self) -> impl Iterator<Item = &str> {
		self.children.iter().filter_map(|tag| {
			match tag {
				TagWrapper::Sample { name } => Some(name.as_str()),
				_ => None,
			}
		})
	}
}

/// A single doc comment tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "camelCase")]
#[non_exhaustive]
pub enum TagWrapper {
	Description { text: String },
	/// `@sample com.example.samples.greet`: points at a function whose body is
	/// shown as a runnable example.
	Sample { name: String },
	See { name: String, text: String },
	Param { name: String, text: String },
	Return { text: String },
	Throws { name: String, text: String },
	Property { name: String, text: String },
	Since { text: String },
	Author { text: String },
	Suppress,
}
