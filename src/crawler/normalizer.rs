//! Article normalizer.

use crate::catalog::{NewArticle, Source};
use crate::crawler::types::RawFeedItem;
use crate::datetime::parse_feed_date;

/// Map a raw feed item onto an article payload.
///
/// The category is inherited from the source, an unparseable date
/// becomes `None`, and the link is kept verbatim as the dedup key.
pub fn normalize(item: &RawFeedItem, source: &Source, detected_regions: Vec<String>) -> NewArticle {
    NewArticle {
        source_id: source.id.clone(),
        title: item.title.clone(),
        description: item.description.clone(),
        url: item.link.clone(),
        image_url: item.image_url.clone().filter(|url| !url.is_empty()),
        published_at: item.pub_date.as_deref().and_then(parse_feed_date),
        category: source.category,
        detected_regions,
        is_breaking: false,
    }
}
