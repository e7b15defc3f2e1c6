//! Structured parsing: categorised content blocks as the last-resort parser.
//!
//! Splits the text layer into blank-line separated blocks and assigns each a
//! category (`Title`, `ListItem`, `NarrativeText`) from cheap layout cues.
//! The rules are deliberately deterministic pure functions over text — each
//! independently testable without a PDF — in the same spirit as the rest of
//! the text heuristics in this crate.
//!
//! Category names follow the vocabulary downstream ingestion pipelines
//! already key on, so `[Title] …` / `[NarrativeText] …` lines in the
//! structured artifact stay machine-matchable.

use crate::engines::{PdfiumTextExtractor, StructuredParser, TextLayerExtractor};
use crate::error::EngineError;
use crate::model::TextBlock;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Default [`StructuredParser`]: blank-line segmentation + layout cues.
#[derive(Debug, Default)]
pub struct LayoutStructuredParser;

impl LayoutStructuredParser {
    pub fn new() -> Self {
        LayoutStructuredParser
    }
}

impl StructuredParser for LayoutStructuredParser {
    fn parse(&self, path: &Path) -> Result<Vec<TextBlock>, EngineError> {
        let pages = PdfiumTextExtractor::new()
            .extract_text(path)
            .map_err(|e| EngineError::Failed {
                engine: "structured",
                detail: e.to_string(),
            })?;

        let text = pages.join("\n");
        let blocks = categorize_blocks(&text);
        debug!("structured parse: {} blocks", blocks.len());
        Ok(blocks)
    }
}

// Bullet or enumerated list markers: -, *, •, ‣, "1." / "1)".
static RE_LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•‣]|\d{1,3}[.)])\s+").unwrap());

/// Split text into blank-line separated blocks and categorise each one.
///
/// Blocks with no visible text are dropped, so the result is exactly the
/// sequence rendered into the structured artifact.
pub(crate) fn categorize_blocks(text: &str) -> Vec<TextBlock> {
    text.split("\n\n")
        .flat_map(split_list_items)
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let category = categorize(&block);
            TextBlock::new(collapse_lines(&block), Some(category.to_string()))
        })
        .collect()
}

/// A block whose every line is a list marker becomes one block per item, so
/// each bullet is reported as its own `ListItem`.
fn split_list_items(block: &str) -> Vec<String> {
    let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() > 1 && lines.iter().all(|l| RE_LIST_MARKER.is_match(l)) {
        lines.into_iter().map(|l| l.to_string()).collect()
    } else {
        vec![block.to_string()]
    }
}

fn categorize(block: &str) -> &'static str {
    let trimmed = block.trim();

    if RE_LIST_MARKER.is_match(trimmed) {
        return "ListItem";
    }
    if looks_like_title(trimmed) {
        return "Title";
    }
    "NarrativeText"
}

/// A title is one short line without terminal sentence punctuation, or a
/// line set entirely in capitals.
fn looks_like_title(text: &str) -> bool {
    if text.lines().count() != 1 || text.len() > 80 {
        return false;
    }
    let has_letters = text.chars().any(|c| c.is_alphabetic());
    if !has_letters {
        return false;
    }
    let all_caps = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_uppercase());
    let ends_like_sentence = text.ends_with(['.', ':', ';', ',']);

    all_caps || !ends_like_sentence
}

/// Join a block's lines into one logical run of text.
fn collapse_lines(block: &str) -> String {
    block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
