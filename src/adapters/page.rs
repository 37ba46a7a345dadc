//! HTML page with id-addressable containers.
//!
//! A [`Document`] keeps its source markup untouched and remembers, for every
//! non-void element carrying an `id`, the byte offset of that element's closing
//! tag. Appended nodes are spliced in before those offsets when the page is
//! rendered, so existing content is never reordered or removed.
//!
//! Comments and the bodies of raw-text elements (`script`, `style`, `textarea`,
//! `title`) are blanked out before scanning, so markup inside them is never
//! taken for an element.

use crate::domain::model::DisplayNode;
use crate::domain::ports::Page;
use crate::utils::error::{ComicError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub const DEFAULT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Comic of the day</title>
</head>
<body>
<main id="comic-page"></main>
</body>
</html>
"#;

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone)]
struct Slot {
    id: String,
    insert_at: usize,
}

#[derive(Debug)]
pub struct Document {
    source: String,
    slots: Vec<Slot>,
    children: Mutex<HashMap<String, Vec<DisplayNode>>>,
}

impl Document {
    pub fn from_html(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let slots = locate_slots(&source)?;
        tracing::debug!("Page exposes {} addressable elements", slots.len());
        Ok(Self {
            source,
            slots,
            children: Mutex::new(HashMap::new()),
        })
    }

    /// A bare page holding a single empty `<div>` with the given id.
    pub fn with_container(id: &str) -> Self {
        let source = format!("<div id=\"{}\"></div>", escape_html(id));
        let insert_at = source.len() - "</div>".len();
        Self {
            source,
            slots: vec![Slot {
                id: id.to_string(),
                insert_at,
            }],
            children: Mutex::new(HashMap::new()),
        }
    }

    pub fn element_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.id.as_str()).collect()
    }

    /// Nodes appended to `id` so far, or `None` if the page has no such element.
    pub fn children(&self, id: &str) -> Option<Vec<DisplayNode>> {
        if !self.has_element(id) {
            return None;
        }
        Some(self.lock_children().get(id).cloned().unwrap_or_default())
    }

    /// Source markup with every appended node spliced into its container.
    pub fn render(&self) -> String {
        let children = self.lock_children();
        let mut slots: Vec<&Slot> = self.slots.iter().collect();
        slots.sort_by_key(|slot| slot.insert_at);

        let mut output = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for slot in slots {
            output.push_str(&self.source[cursor..slot.insert_at]);
            if let Some(nodes) = children.get(&slot.id) {
                for node in nodes {
                    output.push_str(&node_html(node));
                }
            }
            cursor = slot.insert_at;
        }
        output.push_str(&self.source[cursor..]);
        output
    }

    fn lock_children(&self) -> MutexGuard<'_, HashMap<String, Vec<DisplayNode>>> {
        self.children
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::with_container(crate::core::loader::DEFAULT_CONTAINER_ID)
    }
}

impl Page for Document {
    fn has_element(&self, id: &str) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    fn append_children(&self, id: &str, nodes: Vec<DisplayNode>) -> Result<usize> {
        if !self.has_element(id) {
            return Err(ComicError::MissingContainer { id: id.to_string() });
        }
        let count = nodes.len();
        self.lock_children()
            .entry(id.to_string())
            .or_default()
            .extend(nodes);
        Ok(count)
    }
}

fn locate_slots(source: &str) -> Result<Vec<Slot>> {
    // Same byte length as `source`, so offsets found here index the original.
    let scan = mask_inert_regions(source)?;
    let open_tag = Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)([^>]*)>").map_err(regex_error)?;
    let id_attr = Regex::new(r#"(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).map_err(regex_error)?;

    let mut slots: Vec<Slot> = Vec::new();
    for caps in open_tag.captures_iter(&scan) {
        let (Some(whole), Some(tag), Some(attrs)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let tag = tag.as_str().to_ascii_lowercase();
        if VOID_ELEMENTS.contains(&tag.as_str()) || attrs.as_str().trim_end().ends_with('/') {
            continue;
        }
        let Some(id) = id_attr
            .captures(attrs.as_str())
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };
        if slots.iter().any(|slot| slot.id == id) {
            tracing::warn!("Duplicate element id '{}' ignored", id);
            continue;
        }
        match closing_tag_offset(&scan, &tag, whole.end())? {
            Some(insert_at) => slots.push(Slot { id, insert_at }),
            None => tracing::warn!("Element '{}' has no closing </{}> tag", id, tag),
        }
    }
    Ok(slots)
}

/// Replaces every byte of comments and raw-text elements with a space.
fn mask_inert_regions(source: &str) -> Result<String> {
    let comment = Regex::new(r"(?s)<!--.*?(?:-->|\z)").map_err(regex_error)?;
    let mut bytes = source.as_bytes().to_vec();
    for m in comment.find_iter(source) {
        bytes[m.range()].fill(b' ');
    }
    let mut masked = String::from_utf8(bytes).map_err(|e| ComicError::Config {
        message: format!("page masking produced invalid UTF-8: {}", e),
    })?;

    for tag in RAW_TEXT_ELEMENTS {
        let raw_text = Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?(?:</{tag}\s*>|\z)"))
            .map_err(regex_error)?;
        let ranges: Vec<_> = raw_text.find_iter(&masked).map(|m| m.range()).collect();
        if ranges.is_empty() {
            continue;
        }
        let mut bytes = masked.into_bytes();
        for range in ranges {
            bytes[range].fill(b' ');
        }
        masked = String::from_utf8(bytes).map_err(|e| ComicError::Config {
            message: format!("page masking produced invalid UTF-8: {}", e),
        })?;
    }
    Ok(masked)
}

fn closing_tag_offset(source: &str, tag: &str, from: usize) -> Result<Option<usize>> {
    let pattern = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag)))
        .map_err(regex_error)?;

    let mut depth = 0usize;
    for caps in pattern.captures_iter(&source[from..]) {
        let (Some(whole), Some(slash)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if slash.as_str().is_empty() {
            if !whole.as_str().ends_with("/>") {
                depth += 1;
            }
        } else if depth == 0 {
            return Ok(Some(from + whole.start()));
        } else {
            depth -= 1;
        }
    }
    Ok(None)
}

fn regex_error(e: regex::Error) -> ComicError {
    ComicError::Config {
        message: format!("page pattern failed to compile: {}", e),
    }
}

fn node_html(node: &DisplayNode) -> String {
    match node {
        DisplayNode::Paragraph(text) => format!("<p>{}</p>", escape_html(text)),
        DisplayNode::Image { src, alt } => {
            format!("<img src=\"{}\" alt=\"{}\">", escape_html(src), escape_html(alt))
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
