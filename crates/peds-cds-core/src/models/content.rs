//! Reference content (textbook passage) models.

use serde::{Deserialize, Serialize};

use super::AgeGroup;

/// Structured passage metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContentMetadata {
    pub topic: Option<String>,
    pub age_group: Option<AgeGroup>,
    /// Medical specialty (e.g., "infectious disease")
    pub specialty: Option<String>,
    pub keywords: Vec<String>,
}

/// A passage of pediatric reference text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceContent {
    /// Store identifier (UUID)
    pub id: String,
    pub chapter: String,
    pub section: String,
    pub page_number: Option<u32>,
    /// Passage body, searched by relevance
    pub body: String,
    pub metadata: Option<ContentMetadata>,
    /// Creation timestamp
    pub created_at: String,
}

impl ReferenceContent {
    /// Create a new passage with required fields.
    pub fn new(chapter: String, section: String, body: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chapter,
            section,
            page_number: None,
            body,
            metadata: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Short excerpt of the body, at most `max_chars` characters plus an ellipsis.
    ///
    /// Cuts at the last word boundary inside the limit when there is one.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let body = self.body.trim();
        let cut = match body.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => return body.to_string(),
        };

        let head = &body[..cut];
        let head = if body[cut..].starts_with(char::is_whitespace) {
            head
        } else {
            match head.rfind(char::is_whitespace) {
                Some(space) if space > 0 => &head[..space],
                _ => head,
            }
        };
        format!("{}...", head.trim_end())
    }

    /// Citation record for this passage.
    pub fn citation(&self, source: &str, excerpt_chars: usize, rank: u32) -> Citation {
        Citation {
            source: source.to_string(),
            chapter: self.chapter.clone(),
            section: self.section.clone(),
            page: self.page_number,
            content_snippet: self.excerpt(excerpt_chars),
            rank,
        }
    }
}

/// A passage with its relevance score (larger is more relevant).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredContent {
    pub content: ReferenceContent,
    pub score: f64,
}

/// Supporting-passage citation for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// Knowledge source (e.g., "Nelson Textbook of Pediatrics")
    pub source: String,
    pub chapter: String,
    pub section: String,
    pub page: Option<u32>,
    pub content_snippet: String,
    /// 1-based position in the ranked results
    pub rank: u32,
}
