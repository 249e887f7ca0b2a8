//! The line-number annotator.
//!
//! For every eligible code block in a page, ensures the container is
//! tagged with the line-numbers class and carries a trailing gutter of
//! empty placeholder rows, one per visual line. A companion stylesheet
//! renders the placeholders as a numbered gutter via counter styling;
//! this component only injects the markup.
//!
//! The annotator is intended to run once per page, invoked by the host
//! after the page content is fully generated. Re-running it is safe but
//! appends a second gutter to already-annotated blocks: only the class
//! token is de-duplicated, never the gutter marker.

use crate::document::{CodeBlock, DocumentContext};
use crate::edit::Edit;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Newlines that start another visual line: every `\n` except one in final
// position. A single trailing newline does not open a new row, but blank
// lines in the middle of a block do.
static EMBEDDED_NEWLINE: LazyLock<fancy_regex::Regex> =
    LazyLock::new(|| fancy_regex::Regex::new(r"\n(?!$)").unwrap());

/// Class-token names used for selection and injected markup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnnotatorConfig {
    /// Class token identifying a highlighted-code wrapper element
    pub wrapper_class: String,
    /// Class token requesting (and then marking) line numbers
    pub marker_class: String,
    /// Class token placed on the injected gutter node
    pub rows_class: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            wrapper_class: "highlight".to_string(),
            marker_class: "line-numbers".to_string(),
            rows_class: "line-numbers-rows".to_string(),
        }
    }
}

/// Annotates eligible code blocks with line-number gutters.
#[derive(Debug, Clone)]
pub struct LineNumberAnnotator {
    config: AnnotatorConfig,
    marker_token: Regex,
}

impl Default for LineNumberAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl LineNumberAnnotator {
    pub fn new() -> Self {
        Self::from_config_struct(AnnotatorConfig::default())
    }

    pub fn from_config_struct(config: AnnotatorConfig) -> Self {
        // Word-boundary match on the container's class attribute, so the
        // idempotence guard is not fooled by tokens like "xline-numbersx".
        let marker_token = Regex::new(&format!(r"\b{}\b", regex::escape(&config.marker_class)))
            .expect("escaped class token is a valid pattern");
        Self { config, marker_token }
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Compute the edits annotating every eligible block of `ctx`, in
    /// document order. Blocks with an empty text payload are skipped with
    /// no side effects; no input ever produces an error.
    pub fn annotate(&self, ctx: &DocumentContext) -> Vec<Edit> {
        let mut edits = Vec::new();

        for block in &ctx.code_blocks {
            if block.text.is_empty() {
                log::debug!("skipping code block with empty text payload");
                continue;
            }

            if let Some(edit) = self.class_token_edit(block) {
                edits.push(edit);
            }

            let text = strip_leading_newline(&block.text);
            let count = visual_line_count(text);
            edits.push(Edit::insert(block.container_close, self.gutter_markup(count)));
        }

        edits
    }

    /// Edit adding the marker class to the container, unless the token is
    /// already present in its class attribute.
    fn class_token_edit(&self, block: &CodeBlock) -> Option<Edit> {
        match (&block.container_class, &block.container_class_range) {
            (Some(value), Some(range)) => {
                if self.marker_token.is_match(value) {
                    None
                } else {
                    Some(Edit::insert(range.end, format!(" {}", self.config.marker_class)))
                }
            }
            // No class attribute at all: grow one on the start tag
            _ => Some(Edit::insert(
                block.container_tag.end - 1,
                format!(r#" class="{}""#, self.config.marker_class),
            )),
        }
    }

    /// Gutter marker markup: a single node holding exactly `count` empty
    /// placeholder rows, no separators, no content.
    fn gutter_markup(&self, count: usize) -> String {
        const OPEN: &str = "<span class=\"";
        const MID: &str = "\">";
        const PLACEHOLDER: &str = "<span></span>";
        const CLOSE: &str = "</span>";

        let capacity = OPEN.len() + self.config.rows_class.len() + MID.len() + count * PLACEHOLDER.len() + CLOSE.len();
        let mut markup = String::with_capacity(capacity);
        markup.push_str(OPEN);
        markup.push_str(&self.config.rows_class);
        markup.push_str(MID);
        for _ in 0..count {
            markup.push_str(PLACEHOLDER);
        }
        markup.push_str(CLOSE);
        markup
    }
}

/// Strip exactly one leading line break, if present. Never more than one:
/// generators commonly emit a single newline between `<code>` and the
/// first source line, and only that one is presentational.
pub fn strip_leading_newline(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("\r\n") {
        rest
    } else if let Some(rest) = text.strip_prefix('\n') {
        rest
    } else if let Some(rest) = text.strip_prefix('\r') {
        rest
    } else {
        text
    }
}

/// Number of rendered lines in a text block: newlines not in final
/// position, plus one. Text without any newline is a single line, never
/// an error.
pub fn visual_line_count(text: &str) -> usize {
    EMBEDDED_NEWLINE.find_iter(text).flatten().count() + 1
}
