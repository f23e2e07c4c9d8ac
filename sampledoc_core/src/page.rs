use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::ContentNode;
use crate::Dri;
use crate::documentable::Documentable;

/// A node of the page tree handed over by the page builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageNode {
	/// A documentation page with renderable content.
	Content(ContentPage),
	/// A page the renderer emits on its own terms (search index, styles,
	/// navigation). It is never rewritten but its children are visited.
	RendererSpecific(RendererSpecificPage),
}

impl PageNode {
	pub fn name(&self) -> &str {
		match self {
			Self::Content(page) => &page.name,
			Self::RendererSpecific(page) => &page.name,
		}
	}

	pub fn children(&self) -> &[Arc<PageNode>] {
		match self {
			Self::Content(page) => &page.children,
			Self::RendererSpecific(page) => &page.children,
		}
	}

	#[must_use]
	fn with_children(&self, children: Vec<Arc<PageNode>>) -> Self {
		match self {
			Self::Content(page) => {
				Self::Content(ContentPage {
					children,
					..page.clone()
				})
			}
			Self::RendererSpecific(page) => {
				Self::RendererSpecific(RendererSpecificPage {
					children,
					..page.clone()
				})
			}
		}
	}

	/// Iterate over every content page of the tree, depth first, parents
	/// before children.
	pub fn content_pages(&self) -> Vec<&ContentPage> {
		let mut pages = Vec::new();
		self.collect_content_pages(&mut pages);
		pages
	}

	fn collect_content_pages<'a>(&'a self, pages: &mut Vec<&'a ContentPage>) {
		if let Self::Content(page) = self {
			pages.push(page);
		}
		for child in self.children() {
			child.collect_content_pages(pages);
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
	pub name: String,
	#[serde(default)]
	pub dri: BTreeSet<Dri>,
	pub content: Arc<ContentNode>,
	#[serde(default)]
	pub documentables: Vec<Arc<Documentable>>,
	/// Scripts and stylesheets the renderer must include for this page.
	#[serde(default)]
	pub embedded_resources: Vec<String>,
	#[serde(default)]
	pub children: Vec<Arc<PageNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererSpecificPage {
	pub name: String,
	#[serde(default)]
	pub strategy: String,
	#[serde(default)]
	pub children: Vec<Arc<PageNode>>,
}

/// Apply `transform` to every content page of the tree, bottom up.
///
/// A page is rebuilt only when `transform` returned a different page for it or
/// one of its descendants changed; everything else keeps its original
/// allocation, so an untouched tree comes back pointer-identical.
pub fn transform_content_pages<F>(root: &Arc<PageNode>, transform: &mut F) -> Arc<PageNode>
where
	F: FnMut(&Arc<PageNode>, &ContentPage) -> Arc<PageNode>,
{
	let original_children = root.children();
	let children: Vec<Arc<PageNode>> = original_children
		.iter()
		.map(|child| transform_content_pages(child, transform))
		.collect();
	let children_changed = children
		.iter()
		.zip(original_children)
		.any(|(new, old)| !Arc::ptr_eq(new, old));

	let node = if children_changed {
		Arc::new(root.with_children(children))
	} else {
		Arc::clone(root)
	};

	if let PageNode::Content(page) = node.as_ref() {
		return transform(&node, page);
	}

	node
}
