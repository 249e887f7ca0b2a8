//! gutterpress annotates highlighted code blocks in rendered HTML pages
//! with line-number gutters.
//!
//! The library runs as one synchronous pass per document, invoked
//! explicitly by the host once the page content is fully generated. A
//! host that never calls [`annotate`] leaves every document untouched.

pub mod annotator;
pub mod config;
pub mod document;
pub mod edit;
pub mod exit_codes;

pub use annotator::{AnnotatorConfig, LineNumberAnnotator, strip_leading_newline, visual_line_count};
pub use document::{CodeBlock, DocumentContext};
pub use edit::{Edit, apply_edits};

/// Cheap content probes for skipping the structural scan on pages that
/// cannot contain an eligible block.
#[derive(Debug, Default)]
struct DocumentCharacteristics {
    has_pre: bool,
    has_wrapper_class: bool,
}

impl DocumentCharacteristics {
    fn analyze(content: &str, config: &AnnotatorConfig) -> Self {
        Self {
            has_pre: content.contains("<pre"),
            has_wrapper_class: content.contains(config.wrapper_class.as_str()),
        }
    }

    fn can_skip(&self) -> bool {
        !self.has_pre || !self.has_wrapper_class
    }
}

/// Annotate a rendered page with default class tokens.
///
/// Returns the rewritten document, or `None` when the page has no
/// eligible non-empty code block and is left byte-identical.
pub fn annotate(content: &str) -> Option<String> {
    annotate_with_config(content, &AnnotatorConfig::default())
}

/// Annotate a rendered page using the given class tokens.
pub fn annotate_with_config(content: &str, config: &AnnotatorConfig) -> Option<String> {
    if content.is_empty() {
        return None;
    }

    let characteristics = DocumentCharacteristics::analyze(content, config);
    if characteristics.can_skip() {
        log::debug!("document has no highlighted code wrappers, skipping scan");
        return None;
    }

    let ctx = DocumentContext::new(content, config);
    if ctx.code_blocks.is_empty() {
        return None;
    }

    let annotator = LineNumberAnnotator::from_config_struct(config.clone());
    let edits = annotator.annotate(&ctx);
    if edits.is_empty() {
        return None;
    }

    Some(apply_edits(content, &edits))
}
