use crate::analysis::DeclarationBody;
use crate::analysis::SourceNode;

/// Marker placed before the sample body. Playground runners only highlight
/// the code between the two markers.
pub const SAMPLE_START: &str = "//sampleStart";
/// Marker placed after the sample body.
pub const SAMPLE_END: &str = "//sampleEnd";

/// Turns extracted imports and a sample body into the runnable snippet shown
/// on the page.
///
/// Any `Fn(&str, &str) -> String` closure is a template, so callers can swap
/// the wrapper without defining a type.
pub trait SampleTemplate: Send + Sync {
	fn build(&self, imports: &str, body: &str) -> String;
}

impl<F> SampleTemplate for F
where
	F: Fn(&str, &str) -> String + Send + Sync,
{
	fn build(&self, imports: &str, body: &str) -> String {
		self(imports, body)
	}
}

/// The default template: a `main` entry point around the sample body, as
/// expected by the Kotlin playground runner.
///
/// ```text
/// import com.example.Greeter
/// fun main() {
///    //sampleStart
///    println(Greeter().greet())
///    //sampleEnd
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaygroundTemplate;

impl SampleTemplate for PlaygroundTemplate {
	fn build(&self, imports: &str, body: &str) -> String {
		let mut snippet = String::with_capacity(imports.len() + body.len() + 64);
		if !imports.is_empty() {
			snippet.push_str(imports);
			snippet.push('\n');
		}
		snippet.push_str("fun main() {\n");
		snippet.push_str(&format!("   {SAMPLE_START}\n"));
		snippet.push_str(&format!("   {body}\n"));
		snippet.push_str(&format!("   {SAMPLE_END}\n"));
		snippet.push('}');
		snippet
	}
}

/// The import list of the file declaring the sample, or an empty string.
pub fn sample_imports(node: &SourceNode) -> String {
	node.import_list.clone().unwrap_or_default()
}

/// The sample body with its braces removed and its common indentation
/// stripped.
///
/// Declarations without a body fall back to their full text.
pub fn sample_body(node: &SourceNode) -> String {
	let raw = match &node.body {
		Some(DeclarationBody::Block(block)) => {
			block
				.strip_prefix('{')
				.and_then(|inner| inner.strip_suffix('}'))
				.unwrap_or(block)
		}
		Some(DeclarationBody::Expression(expression)) => expression.as_str(),
		None => node.text.as_str(),
	};

	let text = raw.trim_matches(|c: char| c == '\n' || c == '\r').trim_end();
	let lines: Vec<&str> = text.split('\n').collect();
	let indent = lines
		.iter()
		.filter(|line| !line.trim().is_empty())
		.map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
		.min()
		.unwrap_or(0);

	lines
		.iter()
		.map(|line| line.chars().skip(indent).collect::<String>())
		.collect::<Vec<_>>()
		.join("\n")
}
