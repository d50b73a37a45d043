//! The Notion export transform session.
//!
//! Owns one parsed HTML tree and exposes the rewriting steps the pipeline
//! runs before the document is rendered to pages: CSS injection, callout and
//! property-table stripping, heading numbering, and table-of-contents
//! relocation. Each operation mutates the tree in place; [`NotionDocument::serialize`]
//! takes the final snapshot exactly once at the end of the transform phase.

use crate::error::{Error, Result};
use kuchikikiki::traits::TendrilSink;
use kuchikikiki::NodeRef;
use std::collections::HashMap;

/// A heading recorded while numbering, keyed by its anchor id.
///
/// Consumed after rendering to rebuild the PDF outline from the page links
/// that survived the HTML-to-pages conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    /// Heading level, 1-based (`h1` = 1).
    pub level: u32,
    /// Display text including the dotted numbering prefix.
    pub text: String,
}

/// Anchor id → heading, for one document-to-artifact render cycle.
pub type AnchorMap = HashMap<String, Anchor>;

/// One parsed Notion export, with its content root and optional TOC located.
pub struct NotionDocument {
    document: NodeRef,
    body: NodeRef,
    toc: Option<NodeRef>,
}

impl NotionDocument {
    /// Parse an export's markup and locate its structure.
    ///
    /// Fails when the content root (`div.page-body`) is missing, which means
    /// the input is not a Notion page export.
    pub fn parse(html: &str) -> Result<NotionDocument> {
        let document = kuchikikiki::parse_html().one(html);

        let body = document
            .select_first("div.page-body")
            .map_err(|_| {
                Error::InvalidInput(
                    "page body not found; this does not appear to be a Notion export".to_string(),
                )
            })?
            .as_node()
            .clone();

        let toc = document
            .select_first("nav")
            .ok()
            .map(|nav| nav.as_node().clone());

        Ok(NotionDocument {
            document,
            body,
            toc,
        })
    }

    /// The document's own title: the first `h1` inside the export header.
    pub fn title(&self) -> Option<String> {
        self.document
            .select_first("header h1")
            .ok()
            .map(|h1| h1.text_contents().trim().to_string())
    }

    /// Append an inline style block to the document head.
    pub fn inject_css(&mut self, css: &str) {
        let style = parse_fragment("<style type=\"text/css\"></style>")
            .into_iter()
            .next()
            .expect("style fragment parses to one element");
        style.append(NodeRef::new_text(css));

        if let Ok(head) = self.document.select_first("head") {
            head.as_node().append(style);
        } else {
            self.document.prepend(style);
        }
    }

    /// Replace the export header's contents with a pre-rendered title block.
    pub fn inject_title_block(&mut self, block_html: &str) {
        for header in self.collect("header") {
            for child in header.children().collect::<Vec<_>>() {
                child.detach();
            }
            for node in parse_fragment(block_html) {
                header.append(node);
            }
        }
    }

    /// Remove the export header entirely (used when a cover page replaces it).
    pub fn remove_header(&mut self) {
        for header in self.collect("header") {
            header.detach();
        }
    }

    /// Remove every callout whose marked text begins with "internal"
    /// (case-insensitive). Non-matching callouts stay.
    pub fn strip_internal_callouts(&mut self) {
        for callout in collect_in(&self.body, "figure.callout") {
            let internal = callout
                .select("div")
                .map(|divs| {
                    divs.map(|div| div.text_contents())
                        .any(|text| text.trim().to_lowercase().starts_with("internal"))
                })
                .unwrap_or(false);
            if internal {
                callout.detach();
            }
        }
    }

    /// Remove Notion's database property tables from the export header.
    pub fn strip_header_tables(&mut self) {
        for header in self.collect("header") {
            for table in collect_in(&header, "table") {
                table.detach();
            }
        }
    }

    /// Number `h1`..`h3` headings with a dotted prefix and record each
    /// heading's anchor.
    ///
    /// Heading text is rewritten as a numbering span plus a text span so the
    /// two can be styled independently; a level-2 heading that is the 3rd
    /// top-level section's 1st subsection gets `"3.1. "`. Encountering a
    /// shallower-or-equal heading resets all deeper counters. TOC entries
    /// linking to a numbered heading get the same prefix on their label.
    pub fn number_headings(&mut self) -> AnchorMap {
        let mut counters = [0u32; 3];
        let mut anchors = AnchorMap::new();

        for heading in collect_in(&self.body, "h1, h2, h3") {
            let level = match heading_level(&heading) {
                Some(level) => level,
                None => continue,
            };

            counters[level] += 1;
            for deeper in counters.iter_mut().skip(level + 1) {
                *deeper = 0;
            }

            let numbering = counters[..=level]
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
                + ". ";

            let text = heading.text_contents();
            let id = element_attribute(&heading, "id");

            for child in heading.children().collect::<Vec<_>>() {
                child.detach();
            }

            let number_span = parse_fragment(&format!(
                "<span class=\"heading-number\">{}</span>",
                numbering
            ))
            .into_iter()
            .next()
            .expect("span fragment parses to one element");
            let text_span = parse_fragment("<span class=\"heading-text\"></span>")
                .into_iter()
                .next()
                .expect("span fragment parses to one element");
            text_span.append(NodeRef::new_text(text.clone()));
            heading.append(number_span);
            heading.append(text_span);

            if let Some(id) = id {
                // keep TOC labels in sync with the renumbered heading
                if let Ok(link) = self
                    .document
                    .select_first(&format!("a[href=\"#{}\"]", id))
                {
                    let label = link.text_contents();
                    let link = link.as_node();
                    for child in link.children().collect::<Vec<_>>() {
                        child.detach();
                    }
                    link.append(NodeRef::new_text(format!("{}{}", numbering, label)));
                }

                anchors.insert(
                    id,
                    Anchor {
                        level: level as u32 + 1,
                        text: format!("{}{}", numbering, text),
                    },
                );
            }
        }

        anchors
    }

    /// Hoist the table of contents out of its column wrapper, or drop it.
    ///
    /// With `keep`, the `nav` replaces its topmost ancestor below the content
    /// root and gains a "Table of Contents" heading; without, that whole
    /// wrapper is removed. A document without a `nav` is left untouched.
    pub fn relocate_toc(&mut self, keep: bool) {
        let toc = match &self.toc {
            Some(toc) => toc.clone(),
            None => return,
        };

        // topmost ancestor of the nav that is a direct child of the body
        let mut wrapper = None;
        for ancestor in toc.ancestors() {
            if ancestor
                .parent()
                .is_some_and(|parent| parent == self.body)
            {
                wrapper = Some(ancestor);
                break;
            }
        }

        if keep {
            if let Some(wrapper) = wrapper {
                wrapper.insert_after(toc.clone());
                wrapper.detach();
            }
            let heading = parse_fragment("<h1>Table of Contents</h1>")
                .into_iter()
                .next()
                .expect("heading fragment parses to one element");
            toc.insert_before(heading);
        } else {
            match wrapper {
                Some(wrapper) => wrapper.detach(),
                None => toc.detach(),
            }
            self.toc = None;
        }
    }

    /// The final markup snapshot. Called once at the end of the transform
    /// phase.
    pub fn serialize(&self) -> Result<String> {
        let mut out = Vec::new();
        self.document.serialize(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn collect(&self, selector: &str) -> Vec<NodeRef> {
        collect_in(&self.document, selector)
    }
}

/// Parse an HTML fragment and return its top-level nodes, detached and ready
/// to insert elsewhere.
fn parse_fragment(html: &str) -> Vec<NodeRef> {
    let document = kuchikikiki::parse_html().one(format!("<html><body>{}</body></html>", html));
    let body = document
        .select_first("body")
        .expect("parsed document always has a body");
    let children: Vec<NodeRef> = body.as_node().children().collect();
    for child in &children {
        child.detach();
    }
    children
}

/// Matching element nodes under `root`, collected up front so the tree can be
/// mutated while iterating.
fn collect_in(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
    root.select(selector)
        .map(|matches| matches.map(|m| m.as_node().clone()).collect())
        .unwrap_or_default()
}

fn heading_level(node: &NodeRef) -> Option<usize> {
    let element = node.as_element()?;
    match &*element.name.local {
        "h1" => Some(0),
        "h2" => Some(1),
        "h3" => Some(2),
        _ => None,
    }
}

fn element_attribute(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    attributes.get(name).map(str::to_string)
}
