use gutterpress_lib::{AnnotatorConfig, DocumentContext, LineNumberAnnotator, annotate, apply_edits};
use pretty_assertions::assert_eq;

#[test]
fn test_three_line_block() {
    let html = "<div class=\"highlight line-numbers\"><pre><code>a\nb\nc</code></pre></div>";
    let result = annotate(html).unwrap();
    assert_eq!(
        result,
        "<div class=\"highlight line-numbers\"><pre class=\"line-numbers\"><code>a\nb\nc</code>\
         <span class=\"line-numbers-rows\"><span></span><span></span><span></span></span></pre></div>"
    );
}

#[test]
fn test_trailing_newline_not_counted() {
    let html = "<div class=\"highlight line-numbers\"><pre><code>a\nb\nc\n</code></pre></div>";
    let result = annotate(html).unwrap();
    assert_eq!(result.matches("<span></span>").count(), 3);
}

#[test]
fn test_leading_newline_stripped_before_counting() {
    let html = "<div class=\"highlight line-numbers\"><pre><code>\na\nb</code></pre></div>";
    let result = annotate(html).unwrap();
    assert_eq!(result.matches("<span></span>").count(), 2);
}

#[test]
fn test_empty_block_skipped_with_no_side_effects() {
    let html = r#"<div class="highlight line-numbers"><pre><code></code></pre></div>"#;
    assert_eq!(annotate(html), None);
}

#[test]
fn test_single_line_block() {
    let html = r#"<div class="highlight line-numbers"><pre><code>single line, no newline</code></pre></div>"#;
    let result = annotate(html).unwrap();
    assert_eq!(result.matches("<span></span>").count(), 1);
}

#[test]
fn test_class_token_idempotence() {
    let html = "<div class=\"highlight line-numbers\"><pre><code>a\nb</code></pre></div>";
    let once = annotate(html).unwrap();
    let twice = annotate(&once).unwrap();
    // Never more than one marker token in the container's class set
    let pre_tag = twice
        .split("<pre ")
        .nth(1)
        .and_then(|rest| rest.split('>').next())
        .unwrap();
    assert_eq!(pre_tag.matches("line-numbers").count(), 1);
}

#[test]
fn test_gutter_marker_non_idempotence() {
    // Documented limitation: re-running appends a second gutter marker
    let html = "<div class=\"highlight line-numbers\"><pre><code>a\nb</code></pre></div>";
    let once = annotate(html).unwrap();
    let twice = annotate(&once).unwrap();
    assert_eq!(once.matches("line-numbers-rows").count(), 1);
    assert_eq!(twice.matches("line-numbers-rows").count(), 2);
}

#[test]
fn test_blank_lines_count_as_rows() {
    let html = "<div class=\"highlight line-numbers\"><pre><code>a\n\nb</code></pre></div>";
    let result = annotate(html).unwrap();
    assert_eq!(result.matches("<span></span>").count(), 3);
}

#[test]
fn test_windows_line_breaks() {
    // Leading CRLF is stripped as one break; embedded \n still counts
    let html = "<div class=\"highlight line-numbers\"><pre><code>\r\na\r\nb</code></pre></div>";
    let result = annotate(html).unwrap();
    assert_eq!(result.matches("<span></span>").count(), 2);
}

#[test]
fn test_highlighted_markup_inside_code() {
    let html = concat!(
        r#"<div class="highlight line-numbers"><pre><code>"#,
        "<span class=\"k\">fn</span> main() {\n",
        "    <span class=\"m\">println!</span>(<span class=\"s\">&quot;hi&quot;</span>);\n",
        "}",
        r#"</code></pre></div>"#
    );
    let result = annotate(html).unwrap();
    assert_eq!(result.matches("<span></span>").count(), 3);
    // The original highlighted markup is untouched
    assert!(result.contains("<span class=\"k\">fn</span>"));
}

#[test]
fn test_multiple_blocks_annotated_in_document_order() {
    let html = concat!(
        "<div class=\"highlight line-numbers\"><pre><code>a\nb</code></pre></div>",
        "<div class=\"highlight\"><pre><code>not eligible</code></pre></div>",
        "<div class=\"highlight line-numbers\"><pre><code>x\ny\nz</code></pre></div>"
    );
    let result = annotate(html).unwrap();
    assert_eq!(result.matches("line-numbers-rows").count(), 2);
    let first = result.find("<span class=\"line-numbers-rows\"><span></span><span></span></span>");
    let second = result.find("<span class=\"line-numbers-rows\"><span></span><span></span><span></span></span>");
    assert!(first.unwrap() < second.unwrap());
    // The ineligible middle block is untouched
    assert!(result.contains("<div class=\"highlight\"><pre><code>not eligible</code></pre></div>"));
}

#[test]
fn test_page_without_eligible_blocks_is_untouched() {
    let html = "<html><body><p>no code</p><pre><code>bare</code></pre></body></html>";
    assert_eq!(annotate(html), None);
}

#[test]
fn test_mixed_empty_and_real_blocks() {
    let html = concat!(
        r#"<div class="highlight line-numbers"><pre><code></code></pre></div>"#,
        r#"<div class="highlight line-numbers"><pre><code>real</code></pre></div>"#
    );
    let result = annotate(html).unwrap();
    // Only the non-empty block is annotated; the empty one keeps its bare pre
    assert_eq!(result.matches("line-numbers-rows").count(), 1);
    assert!(result.contains(r#"<pre><code></code></pre>"#));
}

#[test]
fn test_edits_reported_against_original_offsets() {
    let annotator = LineNumberAnnotator::new();
    let html = "<div class=\"highlight line-numbers\"><pre><code>a\nb</code></pre></div>";
    let ctx = DocumentContext::new(html, annotator.config());
    let edits = annotator.annotate(&ctx);
    // One class-token edit and one gutter edit for a single block
    assert_eq!(edits.len(), 2);
    assert_eq!(apply_edits(html, &edits), annotate(html).unwrap());
}

#[test]
fn test_counting_rule_reference_cases() {
    use gutterpress_lib::{strip_leading_newline, visual_line_count};

    assert_eq!(visual_line_count("a\nb\nc"), 3);
    assert_eq!(visual_line_count("a\nb\nc\n"), 3);
    assert_eq!(visual_line_count(strip_leading_newline("\na\nb")), 2);
    assert_eq!(visual_line_count("single line, no newline"), 1);
}

mod line_count_properties {
    use gutterpress_lib::visual_line_count;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn visual_line_count_matches_embedded_newlines(text in "[a-z \\n]{1,60}") {
            let bytes = text.as_bytes();
            let expected = bytes
                .iter()
                .enumerate()
                .filter(|(i, b)| **b == b'\n' && *i != bytes.len() - 1)
                .count()
                + 1;
            prop_assert_eq!(visual_line_count(&text), expected);
        }

        #[test]
        fn count_is_at_least_one(text in ".{0,40}") {
            prop_assert!(visual_line_count(&text) >= 1);
        }
    }
}

mod custom_tokens {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_custom_config_end_to_end() {
        let config = AnnotatorConfig {
            wrapper_class: "codehilite".to_string(),
            marker_class: "linenos".to_string(),
            rows_class: "linenos-rows".to_string(),
        };
        let html = "<div class=\"codehilite linenos\"><pre><code>a\nb</code></pre></div>";
        let result = gutterpress_lib::annotate_with_config(html, &config).unwrap();
        assert!(result.contains("<pre class=\"linenos\">"));
        assert!(result.contains("<span class=\"linenos-rows\"><span></span><span></span></span>"));
        // Default tokens do not match this page
        assert_eq!(annotate(html), None);
    }
}
