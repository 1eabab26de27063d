//! Markdown to HTML conversion.
//!
//! Uses pulldown-cmark with the extended syntax set enabled: tables,
//! footnotes, strikethrough, task lists, definition lists and heading
//! attributes. Fenced code blocks are highlighted with syntect using CSS
//! classes rather than inline styles, so a site stylesheet picks the theme:
//!
//! ~~~text
//! ```rust                      <div class="codehilite"><pre><code class="language-rust">
//! fn main() {}          →      <span class="source rust">...</span>
//! ```                          </code></pre></div>
//! ~~~
//!
//! Unknown or missing languages fall back to plain text, still wrapped in the
//! same markup.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Parser options for content pages.
pub fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render a Markdown body to an HTML fragment.
pub fn render(body: &str) -> String {
    let parser = Parser::new_ext(body, options());
    let mut out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut out, Highlighter::new(parser));
    out
}

/// Event adapter that replaces fenced/indented code blocks with highlighted HTML.
struct Highlighter<I> {
    inner: I,
    block: Option<CodeBlock>,
}

struct CodeBlock {
    lang: Option<String>,
    syntax: &'static SyntaxReference,
    code: String,
}

impl<I> Highlighter<I> {
    fn new(inner: I) -> Self {
        Self { inner, block: None }
    }
}

/// First word of a fence info string: ```` ```rust,ignore ```` → `rust`.
fn fence_language(info: &str) -> Option<&str> {
    info.split([',', ' ', '{'])
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
}

fn find_syntax(lang: Option<&str>) -> &'static SyntaxReference {
    let set: &'static SyntaxSet = &SYNTAX_SET;
    lang.and_then(|l| set.find_syntax_by_token(l))
        .unwrap_or_else(|| set.find_syntax_plain_text())
}

/// Classed HTML for the block, or `None` if syntect fails on any line.
fn highlighted(block: &CodeBlock) -> Option<String> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(block.syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(&block.code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .ok()?;
    }
    Some(generator.finalize())
}

fn highlight(block: &CodeBlock) -> String {
    // A failed line would be missing from the generator output, so the
    // whole block is emitted unhighlighted instead.
    let code = highlighted(block).unwrap_or_else(|| escape_html(&block.code));
    wrap_code(block.lang.as_deref(), &code)
}

fn wrap_code(lang: Option<&str>, code: &str) -> String {
    let class = lang
        .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
        .unwrap_or_default();
    format!("<div class=\"codehilite\"><pre><code{class}>{code}</code></pre></div>\n")
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl<'e, I> Iterator for Highlighter<I>
where
    I: Iterator<Item = Event<'e>>,
{
    type Item = Event<'e>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match &kind {
                        CodeBlockKind::Fenced(info) => fence_language(info).map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    self.block = Some(CodeBlock {
                        syntax: find_syntax(lang.as_deref()),
                        lang,
                        code: String::new(),
                    });
                }
                Event::Text(text) if self.block.is_some() => {
                    if let Some(block) = self.block.as_mut() {
                        block.code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) if self.block.is_some() => {
                    if let Some(block) = self.block.take() {
                        return Some(Event::Html(highlight(&block).into()));
                    }
                }
                event => return Some(event),
            }
        }
    }
}
