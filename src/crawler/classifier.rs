//! Region classifier.

use crate::catalog::Region;
use crate::crawler::types::RawFeedItem;

/// Tags text with the regions whose keywords it mentions.
///
/// Matching is case-insensitive substring containment. Each region is
/// reported at most once, in the order the regions were supplied.
#[derive(Debug, Clone, Default)]
pub struct RegionClassifier {
    regions: Vec<(String, Vec<String>)>,
}

impl RegionClassifier {
    pub fn new(regions: &[Region]) -> Self {
        let regions = regions
            .iter()
            .map(|region| {
                let keywords = region
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (region.name.clone(), keywords)
            })
            .collect();
        Self { regions }
    }

    /// Names of every region with at least one keyword in `text`.
    pub fn classify(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        self.regions
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Classify an item by its title and description.
    pub fn classify_item(&self, item: &RawFeedItem) -> Vec<String> {
        let text = format!(
            "{} {}",
            item.title,
            item.description.as_deref().unwrap_or_default()
        );
        self.classify(&text)
    }
}
