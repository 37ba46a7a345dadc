use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of the comic picked by the selection endpoint.
///
/// The endpoint may answer with a JSON string or a JSON number; both are kept
/// in textual form since the value only travels back out as a query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComicSelection(String);

impl ComicSelection {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComicSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for ComicSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = match RawSelection::deserialize(deserializer)? {
            RawSelection::Text(text) => text,
            RawSelection::Integer(n) => n.to_string(),
            RawSelection::Float(n) => n.to_string(),
        };
        Ok(Self(id))
    }
}

/// Lookup endpoint record. Extra fields on the wire are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicMetadata {
    #[serde(rename = "img")]
    pub image_url: String,
    #[serde(rename = "alt")]
    pub alt_text: String,
    #[serde(rename = "safe_title")]
    pub title: String,
    pub year: i32,
    /// 1-based.
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayNode {
    Paragraph(String),
    Image { src: String, alt: String },
}

impl DisplayNode {
    pub fn text(&self) -> Option<&str> {
        match self {
            DisplayNode::Paragraph(text) => Some(text),
            DisplayNode::Image { .. } => None,
        }
    }
}

/// The four nodes rendered for one comic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFragment {
    pub title: String,
    pub image_url: String,
    pub alt_text: String,
    pub date: String,
    pub relative: String,
}

impl DisplayFragment {
    /// Nodes in append order: title, image, date, relative time.
    pub fn into_nodes(self) -> Vec<DisplayNode> {
        vec![
            DisplayNode::Paragraph(self.title),
            DisplayNode::Image {
                src: self.image_url,
                alt: self.alt_text,
            },
            DisplayNode::Paragraph(self.date),
            DisplayNode::Paragraph(self.relative),
        ]
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub selection: ComicSelection,
    pub metadata: ComicMetadata,
    pub published: NaiveDate,
    pub nodes_appended: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_accepts_string_and_number() {
        let text: ComicSelection = serde_json::from_str("\"1234\"").unwrap();
        let number: ComicSelection = serde_json::from_str("1234").unwrap();
        assert_eq!(text, number);
        assert_eq!(number.as_str(), "1234");
    }

    #[test]
    fn test_selection_rejects_objects() {
        assert!(serde_json::from_str::<ComicSelection>("{\"id\": 1}").is_err());
        assert!(serde_json::from_str::<ComicSelection>("null").is_err());
    }

    #[test]
    fn test_metadata_uses_wire_names_and_ignores_extras() {
        let metadata: ComicMetadata = serde_json::from_value(serde_json::json!({
            "img": "https://imgs.example.com/comics/barrel.png",
            "alt": "Don't we all.",
            "safe_title": "Barrel - Part 1",
            "title": "Barrel - Part 1",
            "num": 1,
            "year": 2006,
            "month": 1,
            "day": 1
        }))
        .unwrap();

        assert_eq!(metadata.title, "Barrel - Part 1");
        assert_eq!(metadata.image_url, "https://imgs.example.com/comics/barrel.png");
        assert_eq!(metadata.alt_text, "Don't we all.");
        assert_eq!((metadata.year, metadata.month, metadata.day), (2006, 1, 1));
    }

    #[test]
    fn test_metadata_requires_image() {
        let result = serde_json::from_value::<ComicMetadata>(serde_json::json!({
            "alt": "a",
            "safe_title": "t",
            "year": 2024,
            "month": 1,
            "day": 10
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_fragment_node_order() {
        let nodes = DisplayFragment {
            title: "Title".to_string(),
            image_url: "https://example.com/c.png".to_string(),
            alt_text: "Alt".to_string(),
            date: "1/10/2024".to_string(),
            relative: "2 days ago".to_string(),
        }
        .into_nodes();

        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].text(), Some("Title"));
        assert_eq!(
            nodes[1],
            DisplayNode::Image {
                src: "https://example.com/c.png".to_string(),
                alt: "Alt".to_string()
            }
        );
        assert_eq!(nodes[2].text(), Some("1/10/2024"));
        assert_eq!(nodes[3].text(), Some("2 days ago"));
    }
}
