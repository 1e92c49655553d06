//! Keyword injection into HTML documents.
//!
//! The [`Mutator`] applies a fixed sequence of structural edits to each
//! document:
//!
//! 1. append `" | keyword"` to the head title, or create a title holding the keyword;
//! 2. append `" keyword"` to the first `<h1>`, or prepend an `<h1>` to the body;
//! 3. splice `" keyword "` into the middle of up to five randomly drawn
//!    `p`/`span`/`li` elements (drawn with replacement);
//! 4. append the keyword to the `alt` of the first five images.
//!
//! The pass is not idempotent: mutating a document twice appends twice.
//!
//! # Example
//!
//! ```rust
//! use sitegraft_core::Mutator;
//!
//! let mut rng = rand::rng();
//! let (html, report) = Mutator::new()
//!     .mutate_html("<title>Home</title>", "bar", &mut rng)
//!     .unwrap();
//!
//! assert!(html.contains("<title>Home | bar</title>"));
//! assert_eq!(report.text_insertions, 0);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ego_tree::NodeId;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::parse::{Document, NewElement, Position};
use crate::walk::find_html_files;
use crate::{Result, SitegraftError};

const UTF8_BOM: &str = "\u{feff}";

/// Elements eligible for body-text splicing.
const TEXT_CANDIDATES: &str = "p, span, li";

/// Tunables for the injection pass.
#[derive(Debug, Clone)]
pub struct KeywordConfig {
    /// Separator placed between an existing title and the keyword.
    pub title_separator: String,
    /// Upper bound on body-text draws per document.
    pub max_text_insertions: usize,
    /// Number of leading images whose alt text is extended.
    pub max_images: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self { title_separator: " | ".to_string(), max_text_insertions: 5, max_images: 5 }
    }
}

/// How the keyword reached a title or heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Injection {
    /// An existing element's text was extended.
    Appended,
    /// The element did not exist and was created holding only the keyword.
    Created,
}

/// What the mutator did to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub title: Injection,
    pub heading: Injection,
    /// Draws that landed on a non-empty element (0 to `max_text_insertions`).
    pub text_insertions: usize,
    /// Images whose alt attribute was rewritten.
    pub alt_updates: usize,
}

/// Outcome of mutating every HTML file under a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    /// Mutated files, relative to the directory that was walked.
    pub files: Vec<PathBuf>,
    pub text_insertions: usize,
    pub alt_updates: usize,
}

/// Applies the keyword injection pass.
#[derive(Debug, Clone, Default)]
pub struct Mutator {
    config: KeywordConfig,
}

impl Mutator {
    /// Creates a mutator with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mutator with custom limits.
    pub fn with_config(config: KeywordConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    /// Mutates an HTML string and returns the serialized result.
    ///
    /// `keyword` is inserted as text and attribute content only; it is never
    /// parsed as markup.
    pub fn mutate_html<R: Rng + ?Sized>(
        &self, html: &str, keyword: &str, rng: &mut R,
    ) -> Result<(String, MutationReport)> {
        let mut doc = Document::parse(html);
        let report = self.mutate_document(&mut doc, keyword, rng)?;
        Ok((doc.as_string(), report))
    }

    /// Mutates a parsed document in place.
    pub fn mutate_document<R: Rng + ?Sized>(
        &self, doc: &mut Document, keyword: &str, rng: &mut R,
    ) -> Result<MutationReport> {
        let title = self.inject_title(doc, keyword)?;
        let heading = inject_heading(doc, keyword)?;
        let text_insertions = inject_body_text(doc, keyword, self.config.max_text_insertions, rng)?;
        let alt_updates = inject_alt(doc, keyword, self.config.max_images)?;

        Ok(MutationReport { title, heading, text_insertions, alt_updates })
    }

    /// Rewrites the file at `path` in place.
    ///
    /// # Errors
    ///
    /// Returns [`SitegraftError::ParseError`] when the file cannot be read or
    /// is not valid UTF-8, and [`SitegraftError::IoError`] when writing fails.
    pub fn mutate_file<R: Rng + ?Sized>(&self, path: &Path, keyword: &str, rng: &mut R) -> Result<MutationReport> {
        let bytes = fs::read(path)
            .map_err(|e| SitegraftError::ParseError { path: path.to_path_buf(), reason: e.to_string() })?;
        let source = String::from_utf8(bytes)
            .map_err(|e| SitegraftError::ParseError { path: path.to_path_buf(), reason: e.to_string() })?;

        let (bom, markup) = match source.strip_prefix(UTF8_BOM) {
            Some(rest) => (UTF8_BOM, rest),
            None => ("", source.as_str()),
        };

        let (mutated, report) = self.mutate_html(markup, keyword, rng)?;
        fs::write(path, format!("{}{}", bom, mutated))?;

        debug!(
            path = %path.display(),
            text_insertions = report.text_insertions,
            alt_updates = report.alt_updates,
            "mutated html file"
        );
        Ok(report)
    }

    /// Mutates every `.html`/`.htm` file below `dir`.
    ///
    /// Stops at the first file that cannot be read as text, leaving files
    /// processed so far already rewritten.
    pub fn mutate_tree<R: Rng + ?Sized>(&self, dir: &Path, keyword: &str, rng: &mut R) -> Result<TreeReport> {
        let mut report = TreeReport::default();
        for file in find_html_files(dir)? {
            let file_report = self.mutate_file(&file, keyword, rng)?;
            report.text_insertions += file_report.text_insertions;
            report.alt_updates += file_report.alt_updates;
            report.files.push(file.strip_prefix(dir).unwrap_or(&file).to_path_buf());
        }
        Ok(report)
    }

    fn inject_title(&self, doc: &mut Document, keyword: &str) -> Result<Injection> {
        if let Some(title) = doc.first_id("head title")? {
            let text = format!("{}{}{}", doc.text(title), self.config.title_separator, keyword);
            doc.set_text(title, &text);
            return Ok(Injection::Appended);
        }

        let head = match doc.first_id("head")? {
            Some(head) => head,
            None => synthesize(doc, NewElement::Head, Position::First)?,
        };
        doc.insert_element(head, NewElement::Title, Position::Last, Some(keyword))?;
        Ok(Injection::Created)
    }
}

/// Mutates an HTML string with the default limits and a thread-local RNG.
pub fn mutate_html(html: &str, keyword: &str) -> Result<String> {
    Mutator::new().mutate_html(html, keyword, &mut rand::rng()).map(|(html, _)| html)
}

/// Rewrites one file in place with the default limits and a thread-local RNG.
pub fn mutate_file(path: &Path, keyword: &str) -> Result<MutationReport> {
    Mutator::new().mutate_file(path, keyword, &mut rand::rng())
}

fn inject_heading(doc: &mut Document, keyword: &str) -> Result<Injection> {
    if let Some(h1) = doc.first_id("h1")? {
        let text = format!("{} {}", doc.text(h1), keyword);
        doc.set_text(h1, &text);
        return Ok(Injection::Appended);
    }

    let body = match doc.first_id("body")? {
        Some(body) => body,
        None => synthesize(doc, NewElement::Body, Position::Last)?,
    };
    doc.insert_element(body, NewElement::H1, Position::First, Some(keyword))?;
    Ok(Injection::Created)
}

fn inject_body_text<R: Rng + ?Sized>(doc: &mut Document, keyword: &str, max: usize, rng: &mut R) -> Result<usize> {
    let pool = doc.select_ids(TEXT_CANDIDATES)?;
    let draws = max.min(pool.len());
    let mut inserted = 0;

    for _ in 0..draws {
        let id = pool[rng.random_range(0..pool.len())];
        let text = doc.text(id);
        if text.trim().is_empty() {
            continue;
        }
        doc.set_text(id, &splice_midpoint(&text, keyword));
        inserted += 1;
    }

    Ok(inserted)
}

fn inject_alt(doc: &mut Document, keyword: &str, max: usize) -> Result<usize> {
    let images = doc.select_ids("img")?;
    let mut updated = 0;

    for img in images.into_iter().take(max) {
        let previous = doc.attr(img, "alt").unwrap_or_default();
        let next = format!("{} {}", previous, keyword);
        doc.set_alt(img, next.trim())?;
        updated += 1;
    }

    Ok(updated)
}

/// Creates a missing top-level container under `<html>`.
fn synthesize(doc: &mut Document, kind: NewElement, position: Position) -> Result<NodeId> {
    let root = doc.root_id();
    doc.insert_element(root, kind, position, None)?
        .ok_or_else(|| SitegraftError::HtmlParseError(format!("cannot create {:?} container", kind)))
}

/// Inserts `" keyword "` at the character midpoint of `text`.
fn splice_midpoint(text: &str, keyword: &str) -> String {
    let mid = text.chars().count() / 2;
    let at = text.char_indices().nth(mid).map_or(text.len(), |(i, _)| i);
    format!("{} {} {}", &text[..at], keyword, &text[at..])
}
