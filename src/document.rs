//! Pre-parsed view of a rendered HTML page.
//!
//! `DocumentContext` performs one structural scan over the page text and
//! records, with byte offsets, every code block matching the styling
//! convention `.highlight.line-numbers pre code`: a wrapper element whose
//! class-token set carries both the wrapper class and the line-numbers
//! marking class, holding a `pre` container, holding a `code` content node
//! with the raw text payload. Anything not matching this exact nested
//! shape is left alone.
//!
//! This is a convention-driven scan over generator output, not a general
//! HTML parser: tags are matched with regular expressions and element
//! extents are tracked by same-name tag depth.

use crate::annotator::AnnotatorConfig;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static WRAPPER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#).unwrap()
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b[^>]*>").unwrap());

static PRE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<pre\b[^>]*>").unwrap());
static PRE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)</pre\s*>").unwrap());
static CODE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<code\b[^>]*>").unwrap());
static CODE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)</code\s*>").unwrap());

static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

static TAG_STRIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// A container/content pairing holding displayed source text.
///
/// All ranges are byte offsets into the original document.
#[derive(Debug, Clone)]
pub struct CodeBlock {
    /// The `pre` start tag (the container that is tagged and receives the gutter)
    pub container_tag: Range<usize>,
    /// Current value of the container's `class` attribute, if any
    pub container_class: Option<String>,
    /// Byte range of the class attribute value (between the quotes)
    pub container_class_range: Option<Range<usize>>,
    /// Byte offset of the container's end tag, where a gutter is appended
    /// as the last child
    pub container_close: usize,
    /// Inner markup of the `code` content node
    pub content_range: Range<usize>,
    /// Decoded text payload of the content node (tags stripped, entities
    /// decoded). Empty means the block must be skipped.
    pub text: String,
}

/// One parsed page, scanned once at construction.
pub struct DocumentContext<'a> {
    pub content: &'a str,
    /// Eligible code blocks in document order
    pub code_blocks: Vec<CodeBlock>,
}

impl<'a> DocumentContext<'a> {
    pub fn new(content: &'a str, config: &AnnotatorConfig) -> Self {
        let mut code_blocks = Vec::new();
        // Wrapper regions already consumed; nested wrappers must not yield
        // the same block twice.
        let mut cursor = 0;

        for cap in WRAPPER_TAG.captures_iter(content) {
            let tag = cap.get(0).unwrap();
            if tag.start() < cursor {
                continue;
            }

            let class_value = cap.get(2).or(cap.get(3)).map(|m| m.as_str()).unwrap_or("");
            if !has_class(class_value, &config.wrapper_class) || !has_class(class_value, &config.marker_class) {
                continue;
            }

            let tag_name = cap.get(1).unwrap().as_str();
            let region_end = element_end(content, tag_name, tag.end());
            Self::collect_blocks(content, tag.end(), region_end, &mut code_blocks);
            cursor = region_end;
        }

        Self { content, code_blocks }
    }

    /// Collect every `pre > code` pairing between `start` and `end`.
    fn collect_blocks(content: &str, start: usize, end: usize, out: &mut Vec<CodeBlock>) {
        let mut pos = start;
        while let Some(pre_open) = find_within(&PRE_OPEN, content, pos, end) {
            let Some(pre_close) = find_within(&PRE_CLOSE, content, pre_open.end(), end) else {
                break;
            };

            if let Some(code_open) = find_within(&CODE_OPEN, content, pre_open.end(), pre_close.start())
                && let Some(code_close) = find_within(&CODE_CLOSE, content, code_open.end(), pre_close.start())
            {
                let content_range = code_open.end()..code_close.start();
                let pre_tag_text = &content[pre_open.range()];
                let (container_class, container_class_range) = match CLASS_ATTR.captures(pre_tag_text) {
                    Some(attr) => {
                        let value = attr.get(1).or(attr.get(2)).unwrap();
                        (
                            Some(value.as_str().to_string()),
                            Some(pre_open.start() + value.start()..pre_open.start() + value.end()),
                        )
                    }
                    None => (None, None),
                };

                out.push(CodeBlock {
                    container_tag: pre_open.range(),
                    container_class,
                    container_class_range,
                    container_close: pre_close.start(),
                    text: text_content(&content[content_range.clone()]),
                    content_range,
                });
            }

            pos = pre_close.end();
        }
    }
}

/// Exact class-token membership, as the styling layer's selector sees it:
/// the attribute value is split on whitespace and compared token-for-token.
pub fn has_class(class_attr: &str, token: &str) -> bool {
    class_attr.split_whitespace().any(|t| t == token)
}

/// Text payload of a content node: inner markup with tags removed, then
/// character references decoded. Order matters so `&lt;b&gt;` never turns
/// into a tag that would be stripped.
pub fn text_content(inner_html: &str) -> String {
    let stripped = TAG_STRIP.replace_all(inner_html, "");
    html_escape::decode_html_entities(stripped.as_ref()).into_owned()
}

/// Byte offset of the end tag closing the element whose start tag ends at
/// `from`, tracked by same-name tag depth. Unbalanced markup degrades to
/// the end of the document.
fn element_end(content: &str, tag_name: &str, from: usize) -> usize {
    let mut depth = 1usize;
    let mut pos = from;
    while let Some(cap) = ANY_TAG.captures_at(content, pos) {
        let m = cap.get(0).unwrap();
        if cap.get(2).unwrap().as_str().eq_ignore_ascii_case(tag_name) {
            if cap.get(1).unwrap().as_str().is_empty() {
                depth += 1;
            } else {
                depth -= 1;
                if depth == 0 {
                    return m.start();
                }
            }
        }
        pos = m.end();
    }
    content.len()
}

/// First match of `re` starting at or after `start` and before `end`.
fn find_within<'t>(re: &Regex, content: &'t str, start: usize, end: usize) -> Option<regex::Match<'t>> {
    re.find_at(content, start).filter(|m| m.start() < end)
}
