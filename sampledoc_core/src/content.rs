use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::Dri;
use crate::SourceSetId;

/// What a piece of content represents on the page. Renderers use the kind to
/// decide placement; the samples phase tags its code blocks with
/// [`ContentKind::Sample`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
	#[default]
	Main,
	Comment,
	BriefComment,
	Symbol,
	Sample,
	Source,
	Functions,
	Properties,
	Classlikes,
	Packages,
	Parameters,
	Empty,
}

/// Display style attached to a content node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Style {
	Bold,
	Italic,
	Strong,
	Monospace,
	Block,
	Paragraph,
	Span,
	RowTitle,
	TabbedContent,
	RunnableSample,
	Footnote,
}

/// Dokka-style "DCI": the symbols a node documents together with its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dci {
	#[serde(default)]
	pub dri: BTreeSet<Dri>,
	#[serde(default)]
	pub kind: ContentKind,
}

impl Dci {
	pub fn new(dri: impl IntoIterator<Item = Dri>, kind: ContentKind) -> Self {
		Self {
			dri: dri.into_iter().collect(),
			kind,
		}
	}
}

/// Non-child fields shared by every content node. The rewriter never touches
/// these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
	#[serde(default)]
	pub dci: Dci,
	#[serde(default)]
	pub source_sets: BTreeSet<SourceSetId>,
	#[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
	pub style: BTreeSet<Style>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub extra: BTreeMap<String, String>,
}

impl NodeMeta {
	pub fn new(kind: ContentKind, source_sets: impl IntoIterator<Item = SourceSetId>) -> Self {
		Self {
			dci: Dci::new([], kind),
			source_sets: source_sets.into_iter().collect(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_style(mut self, style: impl IntoIterator<Item = Style>) -> Self {
		self.style.extend(style);
		self
	}
}

/// A node of the immutable page content tree.
///
/// Children are shared through [`Arc`], so a rewritten tree reuses every
/// subtree that did not change. The set of variants is closed for this crate;
/// nodes whose `type` is unknown deserialize into
/// [`ContentNode::Unrecognized`] and are carried through untouched. A known
/// `type` with invalid fields is a deserialization error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentNode {
	Header(ContentHeader),
	DivergentGroup(ContentDivergentGroup),
	DivergentInstance(ContentDivergentInstance),
	CodeBlock(ContentCodeBlock),
	CodeInline(ContentCodeInline),
	DriLink(ContentDriLink),
	ResolvedLink(ContentResolvedLink),
	EmbeddedResource(ContentEmbeddedResource),
	Table(ContentTable),
	List(ContentList),
	Group(ContentGroup),
	PlatformHinted(PlatformHintedContent),
	Text(ContentText),
	BreakLine(ContentBreakLine),
	#[serde(untagged)]
	Unrecognized(UnrecognizedContent),
}

impl ContentNode {
	/// The serialized tag of this node, used in diagnostics.
	pub fn kind_name(&self) -> &str {
		match self {
			Self::Header(_) => "header",
			Self::DivergentGroup(_) => "divergentGroup",
			Self::DivergentInstance(_) => "divergentInstance",
			Self::CodeBlock(_) => "codeBlock",
			Self::CodeInline(_) => "codeInline",
			Self::DriLink(_) => "driLink",
			Self::ResolvedLink(_) => "resolvedLink",
			Self::EmbeddedResource(_) => "embeddedResource",
			Self::Table(_) => "table",
			Self::List(_) => "list",
			Self::Group(_) => "group",
			Self::PlatformHinted(_) => "platformHinted",
			Self::Text(_) => "text",
			Self::BreakLine(_) => "breakLine",
			Self::Unrecognized(unknown) => unknown.kind().unwrap_or("<untyped>"),
		}
	}

	/// Source sets this node applies to. Platform hinted wrappers report their
	/// own set; unrecognized nodes report none.
	pub fn source_sets(&self) -> BTreeSet<SourceSetId> {
		match self {
			Self::PlatformHinted(hinted) => hinted.source_sets.clone(),
			Self::Unrecognized(_) => BTreeSet::new(),
			other => other.meta().map(|meta| meta.source_sets.clone()).unwrap_or_default(),
		}
	}

	pub fn meta(&self) -> Option<&NodeMeta> {
		match self {
			Self::Header(node) => Some(&node.meta),
			Self::DivergentGroup(node) => Some(&node.meta),
			Self::DivergentInstance(node) => Some(&node.meta),
			Self::CodeBlock(node) => Some(&node.meta),
			Self::CodeInline(node) => Some(&node.meta),
			Self::DriLink(node) => Some(&node.meta),
			Self::ResolvedLink(node) => Some(&node.meta),
			Self::EmbeddedResource(node) => Some(&node.meta),
			Self::Table(node) => Some(&node.meta),
			Self::List(node) => Some(&node.meta),
			Self::Group(node) => Some(&node.meta),
			Self::Text(node) => Some(&node.meta),
			Self::BreakLine(node) => Some(&node.meta),
			Self::PlatformHinted(_) | Self::Unrecognized(_) => None,
		}
	}

	/// Collect the text of every [`ContentText`] leaf in document order.
	pub fn texts(&self) -> Vec<&str> {
		let mut texts = Vec::new();
		self.collect_texts(&mut texts);
		texts
	}

	fn collect_texts<'a>(&'a self, texts: &mut Vec<&'a str>) {
		fn visit<'a>(children: &'a [Arc<ContentNode>], texts: &mut Vec<&'a str>) {
			for child in children {
				child.collect_texts(texts);
			}
		}

		match self {
			Self::Header(node) => visit(&node.children, texts),
			Self::CodeBlock(node) => visit(&node.children, texts),
			Self::CodeInline(node) => visit(&node.children, texts),
			Self::DriLink(node) => visit(&node.children, texts),
			Self::ResolvedLink(node) => visit(&node.children, texts),
			Self::EmbeddedResource(node) => visit(&node.children, texts),
			Self::List(node) => visit(&node.children, texts),
			Self::Group(node) => visit(&node.children, texts),
			Self::DivergentGroup(node) => {
				for instance in &node.children {
					instance.collect_texts(texts);
				}
			}
			Self::DivergentInstance(node) => node.collect_texts(texts),
			Self::Table(node) => {
				for row in &node.header {
					visit(&row.children, texts);
				}
				if let Some(caption) = &node.caption {
					caption.collect_texts(texts);
				}
				for row in &node.children {
					visit(&row.children, texts);
				}
			}
			Self::PlatformHinted(node) => node.inner.collect_texts(texts),
			Self::Text(node) => texts.push(&node.text),
			Self::BreakLine(_) | Self::Unrecognized(_) => {}
		}
	}
}

macro_rules! content_node_variants {
	($($tag:literal => $variant:ident($node:ty)),+ $(,)?) => {
		$(
			impl From<$node> for ContentNode {
				fn from(node: $node) -> Self {
					Self::$variant(node)
				}
			}
		)+

		impl<'de> Deserialize<'de> for ContentNode {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: Deserializer<'de>,
			{
				let value = serde_json::Value::deserialize(deserializer)?;
				let Some(kind) = value
					.get("type")
					.and_then(serde_json::Value::as_str)
					.map(str::to_owned)
				else {
					return Ok(Self::Unrecognized(UnrecognizedContent(value)));
				};

				match kind.as_str() {
					$(
						$tag => {
							serde_json::from_value(value)
								.map(Self::$variant)
								.map_err(|e| {
									<D::Error as serde::de::Error>::custom(format!(
										"invalid `{}` content node: {e}",
										$tag
									))
								})
						}
					)+
					_ => Ok(Self::Unrecognized(UnrecognizedContent(value))),
				}
			}
		}
	};
}

content_node_variants! {
	"header" => Header(ContentHeader),
	"divergentGroup" => DivergentGroup(ContentDivergentGroup),
	"divergentInstance" => DivergentInstance(ContentDivergentInstance),
	"codeBlock" => CodeBlock(ContentCodeBlock),
	"codeInline" => CodeInline(ContentCodeInline),
	"driLink" => DriLink(ContentDriLink),
	"resolvedLink" => ResolvedLink(ContentResolvedLink),
	"embeddedResource" => EmbeddedResource(ContentEmbeddedResource),
	"table" => Table(ContentTable),
	"list" => List(ContentList),
	"group" => Group(ContentGroup),
	"platformHinted" => PlatformHinted(PlatformHintedContent),
	"text" => Text(ContentText),
	"breakLine" => BreakLine(ContentBreakLine),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentHeader {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	pub level: u8,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

/// Per-source-set variants of the same content, e.g. one signature per
/// platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDivergentGroup {
	#[serde(default)]
	pub children: Vec<Arc<ContentDivergentInstance>>,
	pub group_id: String,
	#[serde(default)]
	pub implicitly_sourced: bool,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDivergentInstance {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub before: Option<Arc<ContentNode>>,
	pub divergent: Arc<ContentNode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub after: Option<Arc<ContentNode>>,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

impl ContentDivergentInstance {
	fn collect_texts<'a>(&'a self, texts: &mut Vec<&'a str>) {
		if let Some(before) = &self.before {
			before.collect_texts(texts);
		}
		self.divergent.collect_texts(texts);
		if let Some(after) = &self.after {
			after.collect_texts(texts);
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCodeBlock {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	#[serde(default)]
	pub language: String,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCodeInline {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	#[serde(default)]
	pub language: String,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

/// Link to another documented symbol, resolved by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDriLink {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	pub address: Dri,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

/// Link with an already known URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResolvedLink {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	pub address: String,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEmbeddedResource {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	pub address: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub alt_text: Option<String>,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTable {
	#[serde(default)]
	pub header: Vec<Arc<ContentGroup>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub caption: Option<Arc<ContentNode>>,
	/// Table rows.
	#[serde(default)]
	pub children: Vec<Arc<ContentGroup>>,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentList {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	#[serde(default)]
	pub ordered: bool,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGroup {
	#[serde(default)]
	pub children: Vec<Arc<ContentNode>>,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

impl ContentGroup {
	pub fn new(children: impl IntoIterator<Item = ContentNode>, meta: NodeMeta) -> Self {
		Self {
			children: children.into_iter().map(Arc::new).collect(),
			meta,
		}
	}
}

/// Wrapper telling the renderer which source sets its inner content belongs
/// to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformHintedContent {
	pub inner: Arc<ContentNode>,
	#[serde(default)]
	pub source_sets: BTreeSet<SourceSetId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentText {
	pub text: String,
	#[serde(flatten)]
	pub meta: NodeMeta,
}

impl ContentText {
	pub fn new(text: impl Into<String>, meta: NodeMeta) -> Self {
		Self {
			text: text.into(),
			meta,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBreakLine {
	#[serde(flatten)]
	pub meta: NodeMeta,
}

/// A node whose `type` is not known to this crate, kept as raw JSON so it
/// survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnrecognizedContent(pub serde_json::Value);

impl UnrecognizedContent {
	/// The `type` tag of the raw node, when present.
	pub fn kind(&self) -> Option<&str> {
		self.0.get("type").and_then(serde_json::Value::as_str)
	}
}
