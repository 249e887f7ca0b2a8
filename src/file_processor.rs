//! HTML file discovery and per-file processing for the CLI.

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use gutterpress_lib::{DocumentContext, LineNumberAnnotator, apply_edits};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::RunMode;

/// Per-file result reported by `check` and `apply`.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub blocks: usize,
}

/// Outcome of processing one file.
#[derive(Debug)]
pub struct ProcessOutcome {
    /// Eligible, non-empty code blocks found in the file
    pub blocks: usize,
    /// Whether the file was rewritten on disk
    pub written: bool,
}

/// Expands directory-style patterns to also match files within them.
/// Pattern "dir/path" becomes ["dir/path", "dir/path/**"] so excluding a
/// directory excludes its contents too. Patterns containing glob
/// characters are returned unchanged.
fn expand_directory_pattern(pattern: &str) -> Vec<String> {
    if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
        return vec![pattern.to_string()];
    }
    let base = pattern.trim_end_matches('/');
    vec![base.to_string(), format!("{base}/**")]
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        for expanded in expand_directory_pattern(pattern) {
            let glob = Glob::new(&expanded).with_context(|| format!("Invalid glob pattern: {pattern}"))?;
            builder.add(glob);
        }
    }
    builder.build().context("Failed to build glob set")
}

fn is_html_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
    )
}

fn clean_path(path: &str) -> String {
    path.strip_prefix("./").unwrap_or(path).to_string()
}

/// Discover HTML files under the given paths.
///
/// Explicitly listed files are trusted and taken as-is (they must exist);
/// directories are walked with gitignore support and include/exclude
/// filtering.
pub fn find_html_files(
    paths: &[String],
    include: &[String],
    exclude: &[String],
    respect_gitignore: bool,
) -> Result<Vec<String>> {
    let include_set = build_globset(include)?;
    let exclude_set = build_globset(exclude)?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    let mut explicit = Vec::new();

    for path_str in paths {
        let path = Path::new(path_str);
        if !path.exists() {
            bail!("File not found: {path_str}");
        }
        if path.is_file() {
            // Trust the user's explicit intent, but still honor excludes
            let cleaned = clean_path(path_str);
            if !exclude.is_empty() && exclude_set.is_match(&cleaned) {
                log::warn!("{cleaned} ignored because of exclude pattern");
            } else {
                explicit.push(cleaned.clone());
                files.push(cleaned);
            }
        } else {
            dirs.push(path_str.clone());
        }
    }

    if let Some((first, rest)) = dirs.split_first() {
        let mut walk_builder = WalkBuilder::new(first);
        for dir in rest {
            walk_builder.add(dir);
        }

        if !include.is_empty() {
            let mut override_builder = OverrideBuilder::new(".");
            for pattern in include {
                for expanded in expand_directory_pattern(pattern) {
                    override_builder
                        .add(&expanded)
                        .with_context(|| format!("Invalid include pattern: {pattern}"))?;
                }
            }
            walk_builder.overrides(override_builder.build().context("Failed to build include overrides")?);
        }

        walk_builder.ignore(respect_gitignore);
        walk_builder.git_ignore(respect_gitignore);
        walk_builder.git_global(respect_gitignore);
        walk_builder.git_exclude(respect_gitignore);
        walk_builder.parents(respect_gitignore);
        walk_builder.hidden(false);
        walk_builder.require_git(false);

        for result in walk_builder.build() {
            match result {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_html_file(path) {
                        files.push(clean_path(&path.to_string_lossy()));
                    }
                }
                Err(err) => {
                    log::warn!("error walking directory: {err}");
                }
            }
        }
    }

    files.sort();
    files.dedup();

    if !exclude.is_empty() {
        files.retain(|f| !exclude_set.is_match(f));
    }
    if !include.is_empty() {
        // The walker's overrides cover discovered files; explicitly
        // listed files stay regardless of include patterns.
        files.retain(|f| include_set.is_match(f) || explicit.contains(f));
    }

    Ok(files)
}

/// Process a single file: count eligible non-empty blocks and, in apply
/// mode, rewrite the file in place with gutters injected.
pub fn process_file(path: &str, annotator: &LineNumberAnnotator, mode: RunMode) -> Result<ProcessOutcome> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;

    let ctx = DocumentContext::new(&content, annotator.config());
    let blocks = ctx.code_blocks.iter().filter(|b| !b.text.is_empty()).count();
    if blocks == 0 {
        return Ok(ProcessOutcome { blocks: 0, written: false });
    }

    if mode == RunMode::Apply {
        let edits = annotator.annotate(&ctx);
        let rewritten = apply_edits(&content, &edits);
        fs::write(path, rewritten).with_context(|| format!("Failed to write {path}"))?;
        log::debug!("annotated {blocks} block(s) in {path}");
        return Ok(ProcessOutcome { blocks, written: true });
    }

    Ok(ProcessOutcome { blocks, written: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_directory_pattern() {
        assert_eq!(expand_directory_pattern("build"), vec!["build", "build/**"]);
        assert_eq!(expand_directory_pattern("build/"), vec!["build", "build/**"]);
        assert_eq!(expand_directory_pattern("**/*.html"), vec!["**/*.html"]);
    }

    #[test]
    fn test_is_html_file() {
        assert!(is_html_file(Path::new("index.html")));
        assert!(is_html_file(Path::new("page.HTM")));
        assert!(!is_html_file(Path::new("style.css")));
        assert!(!is_html_file(Path::new("html")));
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("./docs/index.html"), "docs/index.html");
        assert_eq!(clean_path("docs/index.html"), "docs/index.html");
    }
}
