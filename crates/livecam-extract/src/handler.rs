//! Extraction endpoints.
//!
//! ```text
//! GET <embed_path>?url=<page-url>     -> { id?, fullUrl? } | 404 text
//! GET <manifest_path>?url=<page-url>  -> { url } | 404 text
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use livecam_protocols::{EmbedPayload, ManifestPayload};
use serde::Deserialize;

use crate::error::ExtractError;
use crate::extractor::Extractor;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub url: String,
}

/// Mount the embed and manifest endpoints.
pub fn routes(extractor: Arc<Extractor>, embed_path: &str, manifest_path: &str) -> Router {
    Router::new()
        .route(embed_path, get(extract_embed))
        .route(manifest_path, get(extract_manifest))
        .with_state(extractor)
}

async fn extract_embed(
    State(extractor): State<Arc<Extractor>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<EmbedPayload>, ExtractError> {
    extractor.embed(&query.url).await.map(Json)
}

async fn extract_manifest(
    State(extractor): State<Arc<Extractor>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ManifestPayload>, ExtractError> {
    extractor.manifest(&query.url).await.map(Json)
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
