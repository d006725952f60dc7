use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};

/// Metadata extracted from one visited resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub id: ResourceId,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dislike_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl MetadataRecord {
    pub fn new(id: ResourceId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            view_count: 0,
            like_count: 0,
            dislike_count: None,
            category: None,
        }
    }

    pub fn with_counts(mut self, views: u64, likes: u64, dislikes: Option<u64>) -> Self {
        self.view_count = views;
        self.like_count = likes;
        self.dislike_count = dislikes;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }

    /// Records without a title carry no usable data and are never collected.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// What a fetcher returns for one resource: its record plus the related
/// identifiers in the order the source listed them.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub record: MetadataRecord,
    pub related: Vec<ResourceId>,
}

impl FetchedResource {
    pub fn new(record: MetadataRecord, related: Vec<ResourceId>) -> Self {
        Self { record, related }
    }
}

/// Parses a display counter such as "1,234,567 views" by keeping only ASCII
/// digits. Empty or overflowing input counts as zero.
pub fn parse_count(text: &str) -> u64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
