use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::*;

pub(crate) const GREETING_SOURCE: &str = r#"package samples

import com.example.Greeter
import kotlin.test.assertEquals

class GreeterSamples {
    fun greet() {
        val greeter = Greeter("World")
        assertEquals("Hello, World!", greeter.greet())
    }

    fun shout() = println(Greeter("you").greet().uppercase())
}
"#;

pub(crate) fn jvm() -> SourceSetId {
	SourceSetId::new("jvm")
}

pub(crate) fn js() -> SourceSetId {
	SourceSetId::new("js")
}

pub(crate) fn text_meta() -> NodeMeta {
	NodeMeta::new(ContentKind::Comment, [jvm()])
}

pub(crate) fn text(value: &str) -> ContentNode {
	ContentNode::Text(ContentText::new(value, text_meta()))
}

pub(crate) fn group(children: impl IntoIterator<Item = ContentNode>) -> ContentNode {
	ContentNode::Group(ContentGroup::new(children, text_meta()))
}

pub(crate) fn code_block(snippet: &str) -> ContentCodeBlock {
	ContentCodeBlock {
		children: vec![Arc::new(text(snippet))],
		language: "kotlin".to_string(),
		meta: NodeMeta::new(ContentKind::Sample, [jvm()]),
	}
}

pub(crate) fn sample_doc(source_set: SourceSetId, samples: &[&str]) -> (SourceSetId, DocumentationNode) {
	let tags = std::iter::once(TagWrapper::Description {
		text: "Says hello.".to_string(),
	})
	.chain(samples.iter().map(|name| {
		TagWrapper::Sample {
			name: (*name).to_string(),
		}
	}));
	(source_set, DocumentationNode::new(tags))
}

pub(crate) fn documentable(
	name: &str,
	docs: impl IntoIterator<Item = (SourceSetId, DocumentationNode)>,
) -> Arc<Documentable> {
	Arc::new(Documentable {
		dri: Dri::new(format!("com.example/Greeter/{name}/")),
		name: name.to_string(),
		documentation: docs.into_iter().collect(),
	})
}

pub(crate) fn content_page(
	name: &str,
	content: ContentNode,
	documentables: Vec<Arc<Documentable>>,
) -> ContentPage {
	ContentPage {
		name: name.to_string(),
		dri: [Dri::new(format!("com.example/Greeter/{name}/"))]
			.into_iter()
			.collect(),
		content: Arc::new(content),
		documentables,
		embedded_resources: vec!["styles/main.css".to_string()],
		children: Vec::new(),
	}
}

pub(crate) fn greeting_index() -> SourceIndex {
	let mut index = SourceIndex::new(jvm());
	index.add_file(&PathBuf::from("samples/GreeterSamples.kt"), GREETING_SOURCE);
	index
}

/// A page documenting `greet` with a marker for `sample` inside a paragraph.
pub(crate) fn greet_page(sample: &str) -> ContentPage {
	content_page(
		"greet",
		group([
			text("Says hello."),
			group([text(sample)]),
			ContentNode::BreakLine(ContentBreakLine::default()),
		]),
		vec![documentable("greet", [sample_doc(jvm(), &[sample])])],
	)
}

/// A facade that records how often it was disposed.
#[derive(Debug, Default, Clone)]
pub(crate) struct CountingFacade {
	pub(crate) disposed: Arc<AtomicUsize>,
	pub(crate) declaration: Option<SourceNode>,
}

impl CountingFacade {
	pub(crate) fn disposed(&self) -> usize {
		self.disposed.load(Ordering::SeqCst)
	}
}

impl ResolutionFacade for CountingFacade {
	fn resolve_package(&self, package: &str) -> Option<PackageContext> {
		Some(PackageContext {
			name: package.to_string(),
		})
	}

	fn resolve_link_target(&self, _package: &PackageContext, path: &[&str]) -> Vec<Symbol> {
		vec![Symbol {
			fq_name: path.join("."),
			index: 0,
		}]
	}

	fn declaration_of(&self, _symbol: &Symbol) -> Option<SourceNode> {
		self.declaration.clone()
	}

	fn dispose(&self) {
		self.disposed.fetch_add(1, Ordering::SeqCst);
	}
}

/// Opens a session holding a single facade.
pub(crate) struct StaticProvider {
	pub(crate) facade: CountingFacade,
}

impl AnalysisProvider for StaticProvider {
	async fn open(&self) -> SampleDocResult<AnalysisSession> {
		Ok(AnalysisSession::new().with_facade(jvm(), self.facade.clone()))
	}
}
