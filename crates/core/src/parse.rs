//! HTML parsing and in-place tree editing.
//!
//! This module provides [`Document`], a parsed HTML page that can be queried
//! with CSS selectors in document order and edited through text and attribute
//! setters. Parsing is delegated to html5ever (through `scraper`), which is
//! tolerant of arbitrary real-world markup: missing `<head>`/`<body>` are
//! synthesized, unclosed tags are balanced, and nothing is ever rejected.
//!
//! Edits go through the parse tree, never through string replacement, so
//! inserted text always lands inside text nodes and attribute values and is
//! escaped by the serializer.
//!
//! # Example
//!
//! ```rust
//! use sitegraft_core::parse::Document;
//!
//! let mut doc = Document::parse("<html><body><p>Hello</p></body></html>");
//! let p = doc.select_ids("p").unwrap()[0];
//! doc.set_text(p, "Hello <world>");
//!
//! assert!(doc.as_string().contains("<p>Hello &lt;world&gt;</p>"));
//! ```

use ego_tree::NodeId;
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node, Selector};

use crate::{Result, SitegraftError};

/// Markup the element templates are cloned from.
///
/// New elements are produced by cloning nodes out of this parsed document,
/// which keeps their names and namespaces exactly as the parser builds them.
const TEMPLATE_HTML: &str = "<html><head><title></title></head><body><h1></h1><img alt></body></html>";

/// Elements that [`Document::insert_element`] can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewElement {
    Head,
    Title,
    Body,
    H1,
}

impl NewElement {
    fn tag(self) -> &'static str {
        match self {
            NewElement::Head => "head",
            NewElement::Title => "title",
            NewElement::Body => "body",
            NewElement::H1 => "h1",
        }
    }
}

/// Where a new child goes relative to its parent's existing children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Last,
}

/// A parsed, editable HTML document.
///
/// # Example
///
/// ```rust
/// use sitegraft_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html);
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Never fails: malformed markup is repaired the way browsers repair it.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Serializes the whole document, including its doctype.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Returns the ids of elements matching `selector`, in document order.
    ///
    /// Only elements attached to the document are returned; nodes detached by
    /// earlier edits are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SitegraftError::HtmlParseError`] if the selector is invalid.
    pub fn select_ids(&self, selector: &str) -> Result<Vec<NodeId>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.root_element().select(&sel).map(|el| el.id()).collect())
    }

    /// Returns the first element matching `selector`, in document order.
    pub fn first_id(&self, selector: &str) -> Result<Option<NodeId>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.root_element().select(&sel).next().map(|el| el.id()))
    }

    /// Id of the root `<html>` element.
    pub fn root_id(&self) -> NodeId {
        self.html.root_element().id()
    }

    /// Gets the title of the document.
    pub fn title(&self) -> Option<String> {
        let id = self.first_id("head title").ok()??;
        Some(self.text(id))
    }

    /// Concatenated text of an element and all its descendants.
    ///
    /// Works on detached elements too. Returns an empty string for ids that
    /// do not refer to an element.
    pub fn text(&self, id: NodeId) -> String {
        self.html
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }

    /// Replaces every child of the element with a single text node.
    ///
    /// `text` is stored verbatim and escaped on serialization.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let children: Vec<NodeId> = match self.html.tree.get(id) {
            Some(node) => node.children().map(|child| child.id()).collect(),
            None => return,
        };

        for child in children {
            if let Some(mut child) = self.html.tree.get_mut(child) {
                child.detach();
            }
        }

        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.append(Node::Text(Text { text: text.into() }));
        }
    }

    /// Gets the value of an attribute on the element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        let node = self.html.tree.get(id)?;
        let element = node.value().as_element()?;
        element
            .attrs
            .iter()
            .find(|(qualname, _)| &*qualname.local == name)
            .map(|(_, value)| value.to_string())
    }

    /// Sets the `alt` attribute on the element, adding it after the existing
    /// attributes when absent.
    pub fn set_alt(&mut self, id: NodeId, value: &str) -> Result<()> {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return Ok(());
        };
        let Node::Element(element) = node.value() else {
            return Ok(());
        };

        if let Some((_, existing)) = element.attrs.iter_mut().find(|(qualname, _)| &*qualname.local == "alt") {
            *existing = value.into();
            return Ok(());
        }

        let template = template_element("img")?;
        let (name, _) = template
            .attrs
            .first()
            .cloned()
            .ok_or_else(|| SitegraftError::HtmlParseError("template <img> has no alt attribute".into()))?;
        element.attrs.push((name, value.into()));
        Ok(())
    }

    /// Inserts a new element under `parent`, optionally holding `text`.
    ///
    /// Returns the id of the new element.
    pub fn insert_element(
        &mut self, parent: NodeId, kind: NewElement, position: Position, text: Option<&str>,
    ) -> Result<Option<NodeId>> {
        let element = template_element(kind.tag())?;
        let Some(mut parent) = self.html.tree.get_mut(parent) else {
            return Ok(None);
        };

        let mut child = match position {
            Position::First => parent.prepend(Node::Element(element)),
            Position::Last => parent.append(Node::Element(element)),
        };
        if let Some(text) = text {
            child.append(Node::Text(Text { text: text.into() }));
        }

        Ok(Some(child.id()))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| SitegraftError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Clones an empty element out of the template document.
fn template_element(tag: &str) -> Result<Element> {
    let template = Html::parse_document(TEMPLATE_HTML);
    let sel = parse_selector(tag)?;
    template
        .select(&sel)
        .next()
        .map(|el| el.value().clone())
        .ok_or_else(|| SitegraftError::HtmlParseError(format!("template has no <{}> element", tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <h1>Heading</h1>
            <p class="content">Paragraph <b>1</b></p>
            <p class="content">Paragraph 2</p>
            <img src="a.png">
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_in_document_order() {
        let doc = Document::parse(SAMPLE_HTML);
        let ids = doc.select_ids("p.content").unwrap();

        assert_eq!(ids.len(), 2);
        assert_eq!(doc.text(ids[0]), "Paragraph 1");
        assert_eq!(doc.text(ids[1]), "Paragraph 2");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select_ids("[[invalid");

        assert!(matches!(result, Err(SitegraftError::HtmlParseError(_))));
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut doc = Document::parse(SAMPLE_HTML);
        let p = doc.select_ids("p").unwrap()[0];
        doc.set_text(p, "Replaced & <escaped>");

        let out = doc.as_string();
        assert!(out.contains("<p class=\"content\">Replaced &amp; &lt;escaped&gt;</p>"));
        assert!(!out.contains("<b>1</b>"));
    }

    #[test]
    fn test_set_alt_adds_and_updates() {
        let mut doc = Document::parse(SAMPLE_HTML);
        let img = doc.first_id("img").unwrap().unwrap();

        doc.set_alt(img, "first").unwrap();
        assert!(doc.as_string().contains(r#"<img src="a.png" alt="first">"#));

        doc.set_alt(img, "say \"hi\"").unwrap();
        assert_eq!(doc.attr(img, "alt"), Some("say \"hi\"".to_string()));
        assert!(doc.as_string().contains("alt=\"say &quot;hi&quot;\""));
    }

    #[test]
    fn test_insert_element() {
        let mut doc = Document::parse("<p>body text</p>");
        let body = doc.first_id("body").unwrap().unwrap();
        doc.insert_element(body, NewElement::H1, Position::First, Some("<kw>"))
            .unwrap();

        let out = doc.as_string();
        assert!(out.contains("<body><h1>&lt;kw&gt;</h1><p>body text</p></body>"));
    }

    #[test]
    fn test_malformed_markup_is_repaired() {
        let doc = Document::parse("<div><p>unclosed <span>nested</div><li>stray");
        assert!(doc.first_id("head").unwrap().is_some());
        assert!(doc.first_id("body").unwrap().is_some());
        assert_eq!(doc.select_ids("p, span, li").unwrap().len(), 3);
    }
}
