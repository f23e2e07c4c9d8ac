use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::WalkBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use tokio::task::JoinSet;
use tracing::debug;
use tracing::info;

use crate::SampleDocError;
use crate::SampleDocResult;
use crate::SourceSetId;
use crate::analysis::AnalysisProvider;
use crate::analysis::AnalysisSession;
use crate::analysis::DeclarationBody;
use crate::analysis::PackageContext;
use crate::analysis::ResolutionFacade;
use crate::analysis::SourceNode;
use crate::analysis::Symbol;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::config::SampleDocConfig;
use crate::config::SourceSetConfig;

/// Options controlling which files are indexed for one source set.
#[derive(Debug, Clone)]
pub struct IndexOptions {
	/// Files are indexed only when their path relative to the root matches.
	pub include_set: GlobSet,
	/// Gitignore-style patterns to skip.
	pub exclude_patterns: Vec<String>,
	pub max_file_size: u64,
	pub disable_gitignore: bool,
}

impl Default for IndexOptions {
	fn default() -> Self {
		Self {
			include_set: GlobSet::empty(),
			exclude_patterns: Vec::new(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

impl IndexOptions {
	/// Construct [`IndexOptions`] from a source set entry of the config.
	pub fn from_source_set(source_set: &SourceSetConfig, max_file_size: u64) -> SampleDocResult<Self> {
		Ok(Self {
			include_set: build_glob_set(&source_set.include_patterns())?,
			exclude_patterns: source_set.exclude.clone(),
			max_file_size,
			disable_gitignore: source_set.disable_gitignore,
		})
	}
}

/// Build a `GlobSet` from a list of glob pattern strings.
pub fn build_glob_set(patterns: &[String]) -> SampleDocResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			SampleDocError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}
	builder.build().map_err(|e| {
		SampleDocError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from exclude patterns. These follow
/// `.gitignore` syntax.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> SampleDocResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			SampleDocError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}
	builder.build().map_err(|e| {
		SampleDocError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Normalize CRLF line endings to LF.
fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// An in-memory index of the function declarations found in the sample
/// sources of one source set. It answers resolution queries without a
/// compiler, by fully qualified name.
#[derive(Debug)]
pub struct SourceIndex {
	source_set: SourceSetId,
	files: usize,
	packages: BTreeSet<String>,
	declarations: Vec<SourceNode>,
	by_name: BTreeMap<String, Vec<usize>>,
}

impl SourceIndex {
	pub fn new(source_set: SourceSetId) -> Self {
		Self {
			source_set,
			files: 0,
			packages: BTreeSet::new(),
			declarations: Vec::new(),
			by_name: BTreeMap::new(),
		}
	}

	/// Walk `roots` and index every matching file.
	pub fn scan(
		source_set: SourceSetId,
		roots: &[PathBuf],
		options: &IndexOptions,
	) -> SampleDocResult<Self> {
		let mut index = Self::new(source_set);
		for root in roots {
			for file in collect_files(root, options)? {
				let content = std::fs::read_to_string(&file)?;
				index.add_file(&file, &content);
			}
		}

		info!(
			source_set = %index.source_set,
			files = index.files,
			declarations = index.declarations.len(),
			"indexed sample sources"
		);
		Ok(index)
	}

	/// Parse `content` and add its functions to the index.
	pub fn add_file(&mut self, path: &Path, content: &str) {
		let content = normalize_line_endings(content);
		let parsed = parse_kotlin_source(&content);
		let line_table = LineTable::new(&content);
		let import_list = parsed
			.imports
			.map(|(start, end)| content[start..end].to_string());

		self.files += 1;
		self.packages.insert(parsed.package.clone());

		for function in parsed.functions {
			let fq_name = parsed
				.package
				.split('.')
				.chain(function.scopes.iter().map(String::as_str))
				.chain(std::iter::once(function.name.as_str()))
				.filter(|segment| !segment.is_empty())
				.collect::<Vec<_>>()
				.join(".");

			debug!(fq_name = %fq_name, file = %path.display(), "indexed declaration");
			self.by_name
				.entry(fq_name.clone())
				.or_default()
				.push(self.declarations.len());
			self.declarations.push(SourceNode {
				fq_name,
				file: path.to_path_buf(),
				line: line_table.line_of(function.start),
				import_list: import_list.clone(),
				body: function.body,
				text: content[function.start..function.end].to_string(),
			});
		}
	}

	pub fn source_set(&self) -> &SourceSetId {
		&self.source_set
	}

	pub fn file_count(&self) -> usize {
		self.files
	}

	pub fn declaration_count(&self) -> usize {
		self.declarations.len()
	}

	pub fn packages(&self) -> impl Iterator<Item = &str> {
		self.packages.iter().map(String::as_str)
	}
}

impl ResolutionFacade for SourceIndex {
	fn resolve_package(&self, package: &str) -> Option<PackageContext> {
		let nested = format!("{package}.");
		let known = self
			.packages
			.iter()
			.chain(self.by_name.keys())
			.any(|name| name == package || name.starts_with(&nested));

		known.then(|| {
			PackageContext {
				name: package.to_string(),
			}
		})
	}

	fn resolve_link_target(&self, package: &PackageContext, path: &[&str]) -> Vec<Symbol> {
		let fq_name = path.join(".");
		if path.first() != Some(&package.name.as_str()) {
			return Vec::new();
		}

		self.by_name
			.get(&fq_name)
			.map(|indices| {
				indices
					.iter()
					.map(|&index| {
						Symbol {
							fq_name: fq_name.clone(),
							index,
						}
					})
					.collect()
			})
			.unwrap_or_default()
	}

	fn declaration_of(&self, symbol: &Symbol) -> Option<SourceNode> {
		self.declarations
			.get(symbol.index)
			.filter(|node| node.fq_name == symbol.fq_name)
			.cloned()
	}

	fn dispose(&self) {
		debug!(source_set = %self.source_set, "released sample source index");
	}
}

/// Collect indexable files below `root`, sorted for deterministic ordering.
fn collect_files(root: &Path, options: &IndexOptions) -> SampleDocResult<Vec<PathBuf>> {
	if root.is_file() {
		check_file_size(root, options.max_file_size)?;
		return Ok(vec![root.to_path_buf()]);
	}

	if !root.is_dir() {
		return Err(SampleDocError::Io(std::io::Error::new(
			std::io::ErrorKind::NotFound,
			format!("sample root `{}` does not exist", root.display()),
		)));
	}

	let exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let walker = WalkBuilder::new(root)
		.git_ignore(!options.disable_gitignore)
		.require_git(false)
		.sort_by_file_path(|a, b| a.cmp(b))
		.build();

	let mut files = Vec::new();
	for entry in walker {
		let entry = entry.map_err(|e| SampleDocError::Io(std::io::Error::other(e.to_string())))?;
		let path = entry.path();
		if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
			continue;
		}
		if exclude.matched_path_or_any_parents(path, false).is_ignore() {
			continue;
		}
		let Ok(relative) = path.strip_prefix(root) else {
			continue;
		};
		if !options.include_set.is_match(relative) {
			continue;
		}

		check_file_size(path, options.max_file_size)?;
		files.push(path.to_path_buf());
	}

	Ok(files)
}

fn check_file_size(path: &Path, limit: u64) -> SampleDocResult<()> {
	let size = std::fs::metadata(path)?.len();
	if size > limit {
		return Err(SampleDocError::FileTooLarge {
			path: path.display().to_string(),
			size,
			limit,
		});
	}
	Ok(())
}

/// [`AnalysisProvider`] that indexes the configured sample roots of every
/// source set.
#[derive(Debug, Clone)]
pub struct IndexedAnalysis {
	source_sets: Vec<(SourceSetId, Vec<PathBuf>, IndexOptions)>,
}

impl IndexedAnalysis {
	/// Prepare indexing for every source set in `config`, resolving roots
	/// against the project `root`.
	pub fn from_config(root: &Path, config: &SampleDocConfig) -> SampleDocResult<Self> {
		let source_sets = config
			.source_sets
			.iter()
			.map(|source_set| {
				let roots = source_set.roots.iter().map(|path| root.join(path)).collect();
				let options = IndexOptions::from_source_set(source_set, config.max_file_size)?;
				Ok((source_set.id.clone(), roots, options))
			})
			.collect::<SampleDocResult<Vec<_>>>()?;

		Ok(Self { source_sets })
	}
}

impl AnalysisProvider for IndexedAnalysis {
	/// Indexes all source sets concurrently on the blocking pool. Every scan
	/// is awaited even after one fails, so each index that was built ends up
	/// in the partial session and is released with it. The first failure is
	/// returned.
	async fn open(&self) -> SampleDocResult<AnalysisSession> {
		let mut tasks = JoinSet::new();
		for (source_set, roots, options) in self.source_sets.clone() {
			tasks.spawn_blocking(move || SourceIndex::scan(source_set, &roots, &options));
		}

		let mut session = AnalysisSession::new();
		let mut failure = None;
		while let Some(joined) = tasks.join_next().await {
			match joined.map_err(|e| SampleDocError::PhaseAborted(e.to_string())) {
				Ok(Ok(index)) => session.insert(index.source_set().clone(), Box::new(index)),
				Ok(Err(e)) | Err(e) => {
					if failure.is_none() {
						failure = Some(e);
					}
				}
			}
		}

		match failure {
			Some(e) => Err(e),
			None => Ok(session),
		}
	}
}

/// Pre-computed table of line-start byte offsets for offset-to-line
/// conversion.
pub(crate) struct LineTable {
	line_starts: Vec<usize>,
}

impl LineTable {
	pub(crate) fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}
		Self { line_starts }
	}

	/// 1-indexed line containing `offset`.
	pub(crate) fn line_of(&self, offset: usize) -> usize {
		match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact + 1,
			Err(insert) => insert,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind<'a> {
	/// Identifier, keyword or number.
	Word(&'a str),
	Punct(char),
	/// String or character literal.
	Literal,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
	kind: TokenKind<'a>,
	start: usize,
	end: usize,
	/// The token is the first on its line.
	newline_before: bool,
}

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// Split Kotlin source into tokens, dropping whitespace and comments.
fn tokenize(content: &str) -> Vec<Token<'_>> {
	let mut tokens = Vec::new();
	let mut index = 0;
	let mut newline_before = true;

	while let Some(ch) = content[index..].chars().next() {
		let rest = &content[index..];

		if ch == '\n' {
			newline_before = true;
			index += 1;
			continue;
		}
		if ch.is_whitespace() {
			index += ch.len_utf8();
			continue;
		}
		if rest.starts_with("//") {
			index += rest.find('\n').unwrap_or(rest.len());
			continue;
		}
		if rest.starts_with("/*") {
			let len = skip_block_comment(rest);
			newline_before |= rest[..len].contains('\n');
			index += len;
			continue;
		}

		let start = index;
		let kind = if rest.starts_with("\"\"\"") {
			index += skip_raw_string(rest);
			TokenKind::Literal
		} else if ch == '"' {
			index += skip_string(rest);
			TokenKind::Literal
		} else if ch == '\'' {
			index += skip_char_literal(rest);
			TokenKind::Literal
		} else if ch == '`' {
			match rest[1..].find('`') {
				Some(len) => {
					index += len + 2;
					TokenKind::Word(&rest[1..=len])
				}
				None => {
					index += rest.len();
					TokenKind::Word(&rest[1..])
				}
			}
		} else if is_word_char(ch) {
			let len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
			index += len;
			TokenKind::Word(&rest[..len])
		} else {
			index += ch.len_utf8();
			TokenKind::Punct(ch)
		};

		tokens.push(Token {
			kind,
			start,
			end: index,
			newline_before,
		});
		newline_before = false;
	}

	tokens
}

/// Length of a (possibly nested) block comment at the start of `rest`.
fn skip_block_comment(rest: &str) -> usize {
	let bytes = rest.as_bytes();
	let mut depth = 0usize;
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i..].starts_with(b"/*") {
			depth += 1;
			i += 2;
		} else if bytes[i..].starts_with(b"*/") {
			depth -= 1;
			i += 2;
			if depth == 0 {
				return i;
			}
		} else {
			i += 1;
		}
	}
	bytes.len()
}

/// Length of a `"""` raw string at the start of `rest`. Extra closing quotes
/// belong to the string.
fn skip_raw_string(rest: &str) -> usize {
	let Some(close) = rest[3..].find("\"\"\"") else {
		return rest.len();
	};
	let mut end = 3 + close + 3;
	while rest[end..].starts_with('"') {
		end += 1;
	}
	end
}

/// Length of a `"` string at the start of `rest`, including `${...}`
/// templates. Unterminated strings end at the line break.
fn skip_string(rest: &str) -> usize {
	let bytes = rest.as_bytes();
	let mut i = 1;
	while i < bytes.len() {
		match bytes[i] {
			b'\\' => i += 2,
			b'"' => return i + 1,
			b'\n' => return i,
			b'$' if bytes.get(i + 1) == Some(&b'{') => {
				i += 2;
				let mut depth = 1;
				while i < bytes.len() && depth > 0 {
					match bytes[i] {
						b'{' => {
							depth += 1;
							i += 1;
						}
						b'}' => {
							depth -= 1;
							i += 1;
						}
						b'"' => i += skip_string(&rest[i..]),
						_ => i += 1,
					}
				}
			}
			_ => i += 1,
		}
	}
	bytes.len()
}

/// Length of a character literal at the start of `rest`.
fn skip_char_literal(rest: &str) -> usize {
	let bytes = rest.as_bytes();
	let mut i = 1;
	while i < bytes.len() {
		match bytes[i] {
			b'\\' => i += 2,
			b'\'' => return i + 1,
			b'\n' => return i,
			_ => i += 1,
		}
	}
	bytes.len()
}

#[derive(Debug, Default)]
pub(crate) struct ParsedFile {
	pub(crate) package: String,
	/// Byte range from the first `import` to the end of the last one.
	pub(crate) imports: Option<(usize, usize)>,
	pub(crate) functions: Vec<ParsedFunction>,
}

#[derive(Debug)]
pub(crate) struct ParsedFunction {
	pub(crate) name: String,
	/// Enclosing classes and objects, outermost first.
	pub(crate) scopes: Vec<String>,
	/// Start of the line holding the `fun` keyword, so modifiers and
	/// annotations on that line are part of the text.
	pub(crate) start: usize,
	pub(crate) end: usize,
	pub(crate) body: Option<DeclarationBody>,
}

/// Extract the package, the import list and every non-local function of a
/// Kotlin source file.
pub(crate) fn parse_kotlin_source(content: &str) -> ParsedFile {
	let tokens = tokenize(content);
	let mut parsed = ParsedFile::default();
	// `Some(name)` for class-like scopes, `None` for any other block.
	let mut scopes: Vec<Option<String>> = Vec::new();
	let mut pending_scope: Option<String> = None;
	// Open `(` outside function headers, e.g. a primary constructor.
	let mut paren_depth = 0usize;
	let mut i = 0;

	while i < tokens.len() {
		let token = tokens[i];
		let next = tokens.get(i + 1).map(|token| token.kind);
		let previous = i.checked_sub(1).map(|index| tokens[index].kind);

		match token.kind {
			TokenKind::Word("package") if scopes.is_empty() && parsed.package.is_empty() => {
				let (name, after) = read_path(&tokens, i + 1);
				parsed.package = name;
				i = after;
			}
			TokenKind::Word("import") if scopes.is_empty() => {
				let (_, mut after) = read_path(&tokens, i + 1);
				if let (Some(TokenKind::Word("as")), Some(TokenKind::Word(_))) = (
					tokens.get(after).map(|token| token.kind),
					tokens.get(after + 1).map(|token| token.kind),
				) {
					after += 2;
				}
				let end = tokens[after - 1].end;
				let start = parsed.imports.map_or(token.start, |(start, _)| start);
				parsed.imports = Some((start, end));
				i = after;
			}
			TokenKind::Word("class" | "interface")
				if !matches!(previous, Some(TokenKind::Punct(':' | '.'))) =>
			{
				if let Some(TokenKind::Word(name)) = next {
					pending_scope = Some(name.to_string());
				}
				i += 1;
			}
			TokenKind::Word("object") => {
				pending_scope = match next {
					Some(TokenKind::Word(name)) => Some(name.to_string()),
					_ if previous == Some(TokenKind::Word("companion")) => {
						Some("Companion".to_string())
					}
					_ => None,
				};
				i += 1;
			}
			TokenKind::Word("fun") if next != Some(TokenKind::Word("interface")) => {
				pending_scope = None;
				match parse_function(content, &tokens, i) {
					Some((function, after)) => {
						parsed.functions.push(ParsedFunction {
							scopes: scopes.iter().flatten().cloned().collect(),
							..function
						});
						i = after;
					}
					None => i += 1,
				}
			}
			TokenKind::Word("val" | "var") if paren_depth > 0 => i += 1,
			TokenKind::Word("val" | "var" | "typealias") => {
				pending_scope = None;
				i += 1;
			}
			TokenKind::Punct('(') => {
				paren_depth += 1;
				i += 1;
			}
			TokenKind::Punct(')') => {
				paren_depth = paren_depth.saturating_sub(1);
				i += 1;
			}
			TokenKind::Punct('{') if paren_depth > 0 => {
				scopes.push(None);
				i += 1;
			}
			TokenKind::Punct('{') => {
				scopes.push(pending_scope.take());
				i += 1;
			}
			TokenKind::Punct('}') => {
				scopes.pop();
				i += 1;
			}
			_ => i += 1,
		}
	}

	parsed
}

/// Read a dotted path (`a.b.c`, `a.b.*`) starting at `from`. Returns the path
/// and the index of the first token after it.
fn read_path(tokens: &[Token<'_>], from: usize) -> (String, usize) {
	let Some(TokenKind::Word(first)) = tokens.get(from).map(|token| token.kind) else {
		return (String::new(), from);
	};

	let mut path = first.to_string();
	let mut i = from + 1;
	while let (Some(TokenKind::Punct('.')), Some(segment)) = (
		tokens.get(i).map(|token| token.kind),
		tokens.get(i + 1).map(|token| token.kind),
	) {
		match segment {
			TokenKind::Word(word) => path.push_str(&format!(".{word}")),
			TokenKind::Punct('*') => path.push_str(".*"),
			_ => break,
		}
		i += 2;
	}

	(path, i)
}

/// Index of the token closing the bracket opened at `open_index`.
fn matching_close(tokens: &[Token<'_>], open_index: usize, open: char, close: char) -> Option<usize> {
	let mut depth = 0usize;
	for (index, token) in tokens.iter().enumerate().skip(open_index) {
		match token.kind {
			TokenKind::Punct(c) if c == open => depth += 1,
			TokenKind::Punct(c) if c == close => {
				depth -= 1;
				if depth == 0 {
					return Some(index);
				}
			}
			_ => {}
		}
	}
	None
}

/// Parse the function whose `fun` keyword is at `fun_index`. Returns the
/// function and the index of the first token after it.
fn parse_function(
	content: &str,
	tokens: &[Token<'_>],
	fun_index: usize,
) -> Option<(ParsedFunction, usize)> {
	let mut name = None;
	let mut angle_depth = 0usize;
	let mut i = fun_index + 1;

	// Header up to the parameter list; the name is the last word outside type
	// parameters, which skips receiver types.
	loop {
		let token = tokens.get(i)?;
		match token.kind {
			TokenKind::Punct('<') => angle_depth += 1,
			TokenKind::Punct('>') => angle_depth = angle_depth.saturating_sub(1),
			TokenKind::Punct('(') if angle_depth == 0 => break,
			TokenKind::Word(word) if angle_depth == 0 => name = Some(word),
			TokenKind::Punct('{' | '}' | '=') => return None,
			_ => {}
		}
		i += 1;
	}

	let name = name?.to_string();
	let params_close = matching_close(tokens, i, '(', ')')?;
	let start = content[..tokens[fun_index].start]
		.rfind('\n')
		.map_or(0, |newline| newline + 1);

	let mut i = params_close + 1;
	let (body, end, after) = loop {
		let Some(token) = tokens.get(i) else {
			break (None, tokens[i - 1].end, i);
		};
		match token.kind {
			TokenKind::Punct('{') => {
				let close = matching_close(tokens, i, '{', '}')?;
				let end = tokens[close].end;
				let block = content[token.start..end].to_string();
				break (Some(DeclarationBody::Block(block)), end, close + 1);
			}
			TokenKind::Punct('=') => {
				let last = expression_end(tokens, i + 1)?;
				let end = tokens[last].end;
				let expression = content[tokens[i + 1].start..end].to_string();
				break (Some(DeclarationBody::Expression(expression)), end, last + 1);
			}
			TokenKind::Punct('}' | ';') => break (None, tokens[i - 1].end, i),
			TokenKind::Word("fun" | "val" | "var" | "class" | "object" | "interface" | "typealias")
			| TokenKind::Punct('@')
				if token.newline_before =>
			{
				break (None, tokens[i - 1].end, i);
			}
			_ => i += 1,
		}
	};

	Some((
		ParsedFunction {
			name,
			scopes: Vec::new(),
			start,
			end,
			body,
		},
		after,
	))
}

/// Index of the last token of the expression starting at `from`.
///
/// The expression ends before a line break at nesting depth zero unless the
/// line break sits inside an operator chain, before a closing bracket of an
/// enclosing scope, or before a `;`.
fn expression_end(tokens: &[Token<'_>], from: usize) -> Option<usize> {
	tokens.get(from)?;

	let mut depth = 0usize;
	let mut last = from;
	for (index, token) in tokens.iter().enumerate().skip(from) {
		if depth == 0 && index > from {
			let closes_enclosing = matches!(token.kind, TokenKind::Punct(')' | ']' | '}' | ';'));
			let continues = continues_expression(tokens[index - 1].kind, token.kind);
			if closes_enclosing || (token.newline_before && !continues) {
				break;
			}
		}

		match token.kind {
			TokenKind::Punct('(' | '[' | '{') => depth += 1,
			TokenKind::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
			_ => {}
		}
		last = index;
	}

	Some(last)
}

fn continues_expression(previous: TokenKind<'_>, next: TokenKind<'_>) -> bool {
	const OPERATORS: &str = ".,(=+-*/%&|<>!?:";
	let trailing_operator = matches!(previous, TokenKind::Punct(c) if OPERATORS.contains(c));
	let leading_operator = matches!(next, TokenKind::Punct(c) if ".?:&|".contains(c))
		|| matches!(next, TokenKind::Word("else" | "catch" | "finally"));
	trailing_operator || leading_operator
}
