//! Markdown/MDX rendering with syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

lazy_static! {
    /// ESM statement at the start of a line
    static ref MDX_ESM: Regex = Regex::new(r"^(?:import|export)\s").unwrap();
    /// Opening fence of a code block
    static ref FENCE: Regex = Regex::new(r"^(`{3,}|~{3,})").unwrap();
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(highlight: &HighlightConfig) -> Self {
        let theme_set = ThemeSet::load_defaults();
        if !theme_set.themes.contains_key(&highlight.theme) {
            tracing::warn!(
                "Unknown highlight theme '{}', falling back to the first bundled theme",
                highlight.theme
            );
        }
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme_name: highlight.theme.clone(),
            line_numbers: highlight.line_number,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Render an MDX body: ESM statements are dropped, JSX passes through
    /// as raw HTML. Returns the HTML and the text that remains for reading.
    pub fn render_mdx(&self, source: &str) -> (String, String) {
        let text = strip_mdx_esm(source);
        (self.render(&text), text)
    }

    /// Highlight a code block and wrap it with a copy button
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let inner = match self
            .theme()
            .and_then(|theme| highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok())
        {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => highlighted,
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        };

        format!(
            r#"<figure class="code-block highlight {}"><button class="copy-button" type="button" aria-label="Copy code" data-copy>Copy</button>{}</figure>"#,
            html_escape(lang),
            inner
        )
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<table class="{}"><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table>"#,
            html_escape(lang),
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove top-level `import`/`export` statements from an MDX document.
///
/// A statement may span several lines: it runs until its brackets balance
/// and, for imports, the module string has been seen.
pub fn strip_mdx_esm(source: &str) -> String {
    let mut output = String::with_capacity(source.len());
    let mut fence: Option<String> = None;
    let mut statement: Option<EsmStatement> = None;

    for line in source.split_inclusive('\n') {
        if let Some(current) = statement.as_mut() {
            if current.push(line) {
                statement = None;
            }
            continue;
        }

        let trimmed = line.trim_start();
        match &fence {
            Some(marker) => {
                if trimmed.starts_with(marker.as_str()) {
                    fence = None;
                }
            }
            None => {
                if let Some(m) = FENCE.find(trimmed) {
                    fence = Some(m.as_str().to_string());
                } else if MDX_ESM.is_match(line) {
                    let mut current = EsmStatement::new(line.starts_with("import"));
                    if !current.push(line) {
                        statement = Some(current);
                    }
                    continue;
                }
            }
        }
        output.push_str(line);
    }

    output
}

/// Tracks an ESM statement being skipped
struct EsmStatement {
    is_import: bool,
    depth: i32,
    has_module: bool,
}

impl EsmStatement {
    fn new(is_import: bool) -> Self {
        Self {
            is_import,
            depth: 0,
            has_module: false,
        }
    }

    /// Consume one line; returns true once the statement is complete
    fn push(&mut self, line: &str) -> bool {
        for c in line.chars() {
            match c {
                '{' | '(' | '[' => self.depth += 1,
                '}' | ')' | ']' => self.depth -= 1,
                '\'' | '"' | '`' => self.has_module = true,
                _ => {}
            }
        }

        let trimmed = line.trim_end();
        if self.depth > 0 || trimmed.ends_with([',', '=']) {
            return false;
        }
        !self.is_import || self.has_module || trimmed.ends_with(';')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block_has_copy_button() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains("code-block highlight rust"));
        assert!(html.contains("copy-button"));
        assert!(html.contains("main"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_indented_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Intro\n\n    let x = 1;\n\nOutro");
        assert!(html.contains("copy-button"));
        assert!(html.contains("<p>Outro</p>"));
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_options(&HighlightConfig {
            line_number: true,
            ..Default::default()
        });
        let html = renderer.render("```text\na\nb\n```");
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
    }

    #[test]
    fn test_strip_mdx_esm() {
        let source = "import Chart from './chart'\nexport const meta = {}\n\n# Title\n\nSee the important export below.\n";
        let stripped = strip_mdx_esm(source);
        assert!(!stripped.contains("import Chart"));
        assert!(!stripped.contains("export const"));
        assert!(stripped.contains("# Title"));
        assert!(stripped.contains("important export below"));
    }

    #[test]
    fn test_strip_mdx_esm_leaves_code_blocks_alone() {
        let source = "```python\nimport os\n```\nimport Foo from './foo'\n";
        let stripped = strip_mdx_esm(source);
        assert!(stripped.contains("import os"));
        assert!(!stripped.contains("import Foo"));
    }

    #[test]
    fn test_render_mdx_keeps_jsx() {
        let renderer = MarkdownRenderer::new();
        let (html, text) =
            renderer.render_mdx("import X from 'y'\n\n<Image src=\"/a.png\" alt=\"a\" />\n");
        assert!(html.contains("<Image"));
        assert!(!html.contains("import X"));
        assert!(!text.contains("import X"));
    }

    #[test]
    fn test_strip_multiline_mdx_import() {
        let source = "import {\n  Chart,\n  Table,\n} from './c'\n\n# T\n";
        assert_eq!(strip_mdx_esm(source), "\n# T\n");
    }

    #[test]
    fn test_strip_multiline_mdx_export() {
        let source = "export const meta = {\n  title: 'Numbers',\n  draft: false,\n}\n\nBody text\n";
        assert_eq!(strip_mdx_esm(source), "\nBody text\n");
    }

    #[test]
    fn test_import_with_module_on_next_line() {
        let source = "import Chart\n  from './chart'\nexport default Layout\n\nBody\n";
        assert_eq!(strip_mdx_esm(source), "\nBody\n");
    }
}
