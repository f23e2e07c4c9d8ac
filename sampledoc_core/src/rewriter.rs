use std::sync::Arc;

use tracing::error;

use crate::content::ContentCodeBlock;
use crate::content::ContentCodeInline;
use crate::content::ContentDivergentGroup;
use crate::content::ContentDivergentInstance;
use crate::content::ContentDriLink;
use crate::content::ContentEmbeddedResource;
use crate::content::ContentGroup;
use crate::content::ContentHeader;
use crate::content::ContentList;
use crate::content::ContentNode;
use crate::content::ContentResolvedLink;
use crate::content::ContentTable;
use crate::content::PlatformHintedContent;

/// Replace every text leaf whose text equals `target` with `replacement`.
///
/// Matching is on literal text only, so a marker that occurs twice is
/// replaced twice, each time by its own copy of `replacement`. Subtrees
/// without a match are returned as the same allocation.
pub fn replace_text(
	tree: &Arc<ContentNode>,
	target: &str,
	replacement: ContentCodeBlock,
) -> Arc<ContentNode> {
	ContentRewriter::new(target, replacement).rewrite(tree)
}

/// Depth-first rewriter over the content tree that swaps marker text leaves
/// for a code block.
///
/// Every node on the path from the root to a replaced leaf is rebuilt as the
/// same variant with the same non-child fields; all other nodes are shared
/// with the input tree.
#[derive(Debug)]
pub struct ContentRewriter<'a> {
	target: &'a str,
	replacement: ContentNode,
	replaced: usize,
	unrecognized: usize,
	log_unrecognized: bool,
}

impl<'a> ContentRewriter<'a> {
	pub fn new(target: &'a str, replacement: ContentCodeBlock) -> Self {
		Self {
			target,
			replacement: ContentNode::CodeBlock(replacement),
			replaced: 0,
			unrecognized: 0,
			log_unrecognized: true,
		}
	}

	/// Whether unrecognized nodes are logged as errors. They are counted
	/// either way.
	#[must_use]
	pub fn log_unrecognized(mut self, log: bool) -> Self {
		self.log_unrecognized = log;
		self
	}

	/// Number of text leaves replaced so far.
	pub fn replaced(&self) -> usize {
		self.replaced
	}

	/// Number of unrecognized nodes passed through so far.
	pub fn unrecognized(&self) -> usize {
		self.unrecognized
	}

	pub fn rewrite(&mut self, tree: &Arc<ContentNode>) -> Arc<ContentNode> {
		self.rewrite_node(tree).unwrap_or_else(|| Arc::clone(tree))
	}

	/// Returns `None` when nothing below `node` changed.
	fn rewrite_node(&mut self, node: &ContentNode) -> Option<Arc<ContentNode>> {
		let rewritten = match node {
			ContentNode::Header(header) => {
				ContentNode::Header(ContentHeader {
					children: self.rewrite_children(&header.children)?,
					..header.clone()
				})
			}
			ContentNode::DivergentGroup(group) => {
				let children = rewrite_all(&group.children, |instance| {
					self.rewrite_instance(instance).map(Arc::new)
				})?;
				ContentNode::DivergentGroup(ContentDivergentGroup {
					children,
					..group.clone()
				})
			}
			ContentNode::DivergentInstance(instance) => {
				ContentNode::DivergentInstance(self.rewrite_instance(instance)?)
			}
			ContentNode::CodeBlock(block) => {
				ContentNode::CodeBlock(ContentCodeBlock {
					children: self.rewrite_children(&block.children)?,
					..block.clone()
				})
			}
			ContentNode::CodeInline(code) => {
				ContentNode::CodeInline(ContentCodeInline {
					children: self.rewrite_children(&code.children)?,
					..code.clone()
				})
			}
			ContentNode::DriLink(link) => {
				ContentNode::DriLink(ContentDriLink {
					children: self.rewrite_children(&link.children)?,
					..link.clone()
				})
			}
			ContentNode::ResolvedLink(link) => {
				ContentNode::ResolvedLink(ContentResolvedLink {
					children: self.rewrite_children(&link.children)?,
					..link.clone()
				})
			}
			ContentNode::EmbeddedResource(resource) => {
				ContentNode::EmbeddedResource(ContentEmbeddedResource {
					children: self.rewrite_children(&resource.children)?,
					..resource.clone()
				})
			}
			ContentNode::Table(table) => ContentNode::Table(self.rewrite_table(table)?),
			ContentNode::List(list) => {
				ContentNode::List(ContentList {
					children: self.rewrite_children(&list.children)?,
					..list.clone()
				})
			}
			ContentNode::Group(group) => ContentNode::Group(self.rewrite_group(group)?),
			ContentNode::PlatformHinted(hinted) => {
				ContentNode::PlatformHinted(PlatformHintedContent {
					inner: self.rewrite_node(&hinted.inner)?,
					source_sets: hinted.source_sets.clone(),
				})
			}
			ContentNode::Text(text) => {
				if text.text != self.target {
					return None;
				}
				self.replaced += 1;
				return Some(Arc::new(self.replacement.clone()));
			}
			ContentNode::BreakLine(_) => return None,
			ContentNode::Unrecognized(unknown) => {
				self.unrecognized += 1;
				if self.log_unrecognized {
					error!(
						kind = unknown.kind().unwrap_or("<untyped>"),
						sample = self.target,
						"could not recognize content node while embedding sample"
					);
				}
				return None;
			}
		};

		Some(Arc::new(rewritten))
	}

	fn rewrite_children(&mut self, children: &[Arc<ContentNode>]) -> Option<Vec<Arc<ContentNode>>> {
		rewrite_all(children, |child| self.rewrite_node(child))
	}

	fn rewrite_group(&mut self, group: &ContentGroup) -> Option<ContentGroup> {
		Some(ContentGroup {
			children: self.rewrite_children(&group.children)?,
			meta: group.meta.clone(),
		})
	}

	fn rewrite_instance(
		&mut self,
		instance: &ContentDivergentInstance,
	) -> Option<ContentDivergentInstance> {
		let before = instance
			.before
			.as_ref()
			.and_then(|node| self.rewrite_node(node));
		let divergent = self.rewrite_node(&instance.divergent);
		let after = instance
			.after
			.as_ref()
			.and_then(|node| self.rewrite_node(node));

		if before.is_none() && divergent.is_none() && after.is_none() {
			return None;
		}

		Some(ContentDivergentInstance {
			before: before.or_else(|| instance.before.clone()),
			divergent: divergent.unwrap_or_else(|| Arc::clone(&instance.divergent)),
			after: after.or_else(|| instance.after.clone()),
			meta: instance.meta.clone(),
		})
	}

	fn rewrite_table(&mut self, table: &ContentTable) -> Option<ContentTable> {
		let header = rewrite_all(&table.header, |row| self.rewrite_group(row).map(Arc::new));
		let caption = table
			.caption
			.as_ref()
			.and_then(|caption| self.rewrite_node(caption));
		let children = rewrite_all(&table.children, |row| self.rewrite_group(row).map(Arc::new));

		if header.is_none() && caption.is_none() && children.is_none() {
			return None;
		}

		Some(ContentTable {
			header: header.unwrap_or_else(|| table.header.clone()),
			caption: caption.or_else(|| table.caption.clone()),
			children: children.unwrap_or_else(|| table.children.clone()),
			meta: table.meta.clone(),
		})
	}
}

/// Rewrite every item, returning `None` when no item changed. Unchanged items
/// keep their allocation in the returned list.
fn rewrite_all<T>(
	items: &[Arc<T>],
	mut rewrite: impl FnMut(&T) -> Option<Arc<T>>,
) -> Option<Vec<Arc<T>>> {
	let mut rewritten: Option<Vec<Arc<T>>> = None;

	for (index, item) in items.iter().enumerate() {
		let new_item = rewrite(item.as_ref());
		if let Some(items_so_far) = rewritten.as_mut() {
			items_so_far.push(new_item.unwrap_or_else(|| Arc::clone(item)));
		} else if let Some(new_item) = new_item {
			let mut items_so_far = items[..index].to_vec();
			items_so_far.push(new_item);
			rewritten = Some(items_so_far);
		}
	}

	rewritten
}
