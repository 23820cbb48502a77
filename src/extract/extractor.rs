// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section extraction from raw document pages.
//!
//! Segments page text into coherent sections using several additive
//! structural cues: heading-like lines start a new section, labeled
//! key-value components ("Ingredients: ...") and step-marker runs each
//! yield their own sections, repeated header/footer lines are
//! stripped, and pages where no strategy fires fall back to
//! sentence-grouped content blocks. Strategies may overlap on the same
//! text; the downstream filter's dedup resolves duplicates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::document::Document;

/// Target word count for fallback content blocks.
const BLOCK_TARGET_WORDS: usize = 150;

/// Maximum title length taken from a leading sentence.
const BLOCK_TITLE_CHARS: usize = 50;

/// Lines longer than this are never treated as boilerplate candidates.
const BOILERPLATE_MAX_CHARS: usize = 80;

static HEADING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // ALL CAPS headings
        Regex::new(r"^([A-Z][A-Z\s&]{3,}):?\s*$").unwrap(),
        // Numbered headings
        Regex::new(r"^(\d+\.?\d*\s+[A-Z][A-Za-z\s]{3,}):?\s*$").unwrap(),
        // Step headings
        Regex::new(r"^(Step\s+\d+[:\-]?\s*[A-Z][A-Za-z\s]+)$").unwrap(),
        // Title Case headings, bounded to avoid swallowing prose lines
        Regex::new(r"^([A-Z][a-z]+(?:\s+(?:[A-Z][a-z]+|of|and|the|for|a|an|in|to|with)){0,7}):?\s*$").unwrap(),
    ]
});

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

// Labeled key-value component lines ("Ingredients: two eggs").
static LABELED_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(ingredients?|instructions?|directions?|method|preparation|serves?|servings?|materials|equipment|notes?)\s*:\s*(.+)$",
    )
    .unwrap()
});

// Step-marker lines ("Step 3: ..." / "3. ..." / "3) ...").
static STEP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(step\s+\d+[:\-]?|\d+[.)])\s+(.+)$").unwrap());

/// Minimum accumulated body for a labeled component.
const COMPONENT_MIN_CHARS: usize = 20;

/// Minimum accumulated body for a procedural step.
const STEP_MIN_CHARS: usize = 30;

/// How a section was detected. Carried through to the output for
/// downstream consumers that care about provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Started by a heading-like line.
    Heading,
    /// Labeled key-value component ("Ingredients: ...").
    LabeledComponent,
    /// Run of step-marker lines ("Step 1: ...", "1. ...").
    Procedural,
    /// Fallback sentence-grouped block.
    ContentBlock,
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Heading => write!(f, "heading"),
            SectionKind::LabeledComponent => write!(f, "labeled_component"),
            SectionKind::Procedural => write!(f, "procedural"),
            SectionKind::ContentBlock => write!(f, "content_block"),
        }
    }
}

/// A contiguous span of document text treated as one ranking unit.
///
/// Read-only downstream of extraction. Always references exactly one
/// source document and one position within it.
#[derive(Debug, Clone)]
pub struct Section {
    /// Source document identifier.
    pub document: String,
    /// Page number (1-indexed).
    pub page: u32,
    /// Extraction order within the document (0-indexed).
    pub position: usize,
    /// Heading or leading text.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Detection provenance.
    pub kind: SectionKind,
}

impl Section {
    /// Text span handed to the embedding engine. The title is repeated
    /// so it carries extra weight relative to the body.
    pub fn embedding_text(&self) -> String {
        format!("{} {} {}", self.title, self.title, self.body).to_lowercase()
    }

    /// Stable identifier derived from document, page and title.
    pub fn id(&self) -> String {
        let input = format!("{}:{}:{}", self.document, self.page, self.title);
        let hash = blake3::hash(input.as_bytes());
        hash.to_hex()[..16].to_string()
    }
}

/// Turns a document's raw pages into ordered section candidates.
pub struct SectionExtractor;

impl SectionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts section candidates in original page order.
    ///
    /// A document with no extractable text yields an empty vector.
    pub fn extract(&self, document: &Document) -> Vec<Section> {
        let boilerplate = detect_boilerplate(&document.pages);
        let mut sections = Vec::new();
        let mut position = 0;

        for (page_idx, page) in document.pages.iter().enumerate() {
            let page_num = (page_idx + 1) as u32;
            let lines: Vec<String> = page
                .lines()
                .map(normalize_line)
                .filter(|line| !line.is_empty())
                .filter(|line| !boilerplate.contains_key(line.as_str()))
                .collect();

            if lines.is_empty() {
                continue;
            }

            let mut page_sections = detect_heading_sections(&lines);
            page_sections.extend(detect_labeled_components(&lines));
            page_sections.extend(detect_procedural_steps(&lines));
            if page_sections.is_empty() {
                page_sections = content_blocks(&lines);
            }

            for (title, body, kind) in page_sections {
                sections.push(Section {
                    document: document.name.clone(),
                    page: page_num,
                    position,
                    title,
                    body,
                    kind,
                });
                position += 1;
            }
        }

        tracing::debug!(
            document = %document.name,
            sections = sections.len(),
            "extracted section candidates"
        );
        sections
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Cleans up a raw line without destroying line structure.
///
/// Collapses runs of whitespace and fixes common extraction artifacts
/// (missing spaces at camelCase and digit/letter boundaries).
fn normalize_line(line: &str) -> String {
    static INNER_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    static CAMEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
    static NUM_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)([A-Za-z])").unwrap());
    static ALPHA_NUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z])(\d)").unwrap());
    static MULTI_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());

    let line = INNER_WS.replace_all(line.trim(), " ");
    let line = CAMEL.replace_all(&line, "$1 $2");
    let line = NUM_ALPHA.replace_all(&line, "$1 $2");
    let line = ALPHA_NUM.replace_all(&line, "$1 $2");
    let line = MULTI_DOT.replace_all(&line, ".");
    line.into_owned()
}

/// Finds short lines repeated across pages (headers, footers, page
/// numbers). A line is boilerplate when it appears on at least half the
/// pages of a multi-page document, with a floor of two occurrences.
fn detect_boilerplate(pages: &[String]) -> HashMap<String, usize> {
    if pages.len() < 2 {
        return HashMap::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for page in pages {
        let mut seen_on_page: Vec<String> = Vec::new();
        for line in page.lines() {
            let norm = normalize_line(line);
            if norm.is_empty() || norm.len() > BOILERPLATE_MAX_CHARS {
                continue;
            }
            if !seen_on_page.contains(&norm) {
                seen_on_page.push(norm);
            }
        }
        for line in seen_on_page {
            *counts.entry(line).or_insert(0) += 1;
        }
    }

    let threshold = (pages.len() / 2).max(2);
    counts.retain(|_, count| *count >= threshold);
    counts
}

fn match_heading(line: &str) -> Option<String> {
    for pattern in HEADING_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(line) {
            return Some(caps.get(1)?.as_str().trim().to_string());
        }
    }
    None
}

/// Walks lines accumulating (title, body) pairs; a heading-like line
/// closes the previous section and starts a new one.
fn detect_heading_sections(lines: &[String]) -> Vec<(String, String, SectionKind)> {
    let mut sections = Vec::new();
    let mut current: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in lines {
        if let Some(heading) = match_heading(line) {
            if let Some(title) = current.take() {
                if !buffer.is_empty() {
                    sections.push((title, buffer.join(" "), SectionKind::Heading));
                }
            }
            current = Some(heading);
            buffer.clear();
        } else if current.is_some() {
            buffer.push(line);
        }
    }

    if let Some(title) = current {
        if !buffer.is_empty() {
            sections.push((title, buffer.join(" "), SectionKind::Heading));
        }
    }

    sections
}

/// Walks lines collecting labeled key-value components: a label line
/// starts a component, continuation lines accumulate until the next
/// label, heading or step marker.
fn detect_labeled_components(lines: &[String]) -> Vec<(String, String, SectionKind)> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    let flush = |current: &mut Option<(String, Vec<String>)>,
                 sections: &mut Vec<(String, String, SectionKind)>| {
        if let Some((label, parts)) = current.take() {
            let body = parts.join(" ");
            if body.len() >= COMPONENT_MIN_CHARS {
                sections.push((label, body, SectionKind::LabeledComponent));
            }
        }
    };

    for line in lines {
        if let Some(caps) = LABELED_COMPONENT.captures(line) {
            flush(&mut current, &mut sections);
            let label = label_title(&caps[1]);
            current = Some((label, vec![caps[2].trim().to_string()]));
        } else if match_heading(line).is_some() || STEP_LINE.is_match(line) {
            flush(&mut current, &mut sections);
        } else if let Some((_, parts)) = current.as_mut() {
            parts.push(line.clone());
        }
    }
    flush(&mut current, &mut sections);

    sections
}

/// Walks lines collecting procedural steps: each step-marker line
/// starts a section, continuation lines accumulate until the next
/// marker, heading or label.
fn detect_procedural_steps(lines: &[String]) -> Vec<(String, String, SectionKind)> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    let flush = |current: &mut Option<(String, Vec<String>)>,
                 sections: &mut Vec<(String, String, SectionKind)>| {
        if let Some((title, parts)) = current.take() {
            let body = parts.join(" ");
            if body.len() >= STEP_MIN_CHARS {
                sections.push((title, body, SectionKind::Procedural));
            }
        }
    };

    for line in lines {
        if let Some(caps) = STEP_LINE.captures(line) {
            flush(&mut current, &mut sections);
            let marker = caps[1].trim_end_matches([':', '-', '.', ')']).trim();
            current = Some((
                format!("Procedure: {}", marker),
                vec![caps[2].trim().to_string()],
            ));
        } else if match_heading(line).is_some() || LABELED_COMPONENT.is_match(line) {
            flush(&mut current, &mut sections);
        } else if let Some((_, parts)) = current.as_mut() {
            parts.push(line.clone());
        }
    }
    flush(&mut current, &mut sections);

    sections
}

/// First letter uppercased, rest lowercased, for component labels.
fn label_title(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Groups sentences into blocks of roughly `BLOCK_TARGET_WORDS` words
/// when no headings were found on a page.
fn content_blocks(lines: &[String]) -> Vec<(String, String, SectionKind)> {
    let text = lines.join(" ");
    let sentences: Vec<&str> = SENTENCE_SPLIT
        .split(&text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let flush = |current: &mut Vec<&str>, blocks: &mut Vec<(String, String, SectionKind)>| {
        if current.is_empty() {
            return;
        }
        let body = format!("{}.", current.join(". "));
        let title = block_title(current[0]);
        blocks.push((title, body, SectionKind::ContentBlock));
        current.clear();
    };

    for sentence in sentences {
        current.push(sentence);
        let words: usize = current.iter().map(|s| s.split_whitespace().count()).sum();
        if words >= BLOCK_TARGET_WORDS {
            flush(&mut current, &mut blocks);
        }
    }
    flush(&mut current, &mut blocks);

    blocks
}

fn block_title(first_sentence: &str) -> String {
    if first_sentence.chars().count() > BLOCK_TITLE_CHARS {
        let cut: String = first_sentence.chars().take(BLOCK_TITLE_CHARS).collect();
        format!("{}...", cut)
    } else {
        first_sentence.to_string()
    }
}
