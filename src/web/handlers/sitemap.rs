//! Sitemap handler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};

use tracing::warn;

use super::AppState;
use crate::sitemap::SitemapGenerator;
use crate::web::error::ApiResult;

/// GET /sitemap.xml - Regenerate and return the sitemap.
///
/// Falls back to the last cached document when regeneration fails.
pub async fn sitemap_xml(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let generator = SitemapGenerator::new(state.db.pool(), &state.site_base_url);
    let xml = match generator.generate().await {
        Ok(xml) => xml,
        Err(e) => match generator.cached().await.ok().flatten() {
            Some(xml) => {
                warn!("Sitemap generation failed, serving cached copy: {}", e);
                xml
            }
            None => return Err(e.into()),
        },
    };

    Ok((
        [
            (CONTENT_TYPE, "application/xml"),
            (CACHE_CONTROL, "public, max-age=600"),
        ],
        xml,
    ))
}
